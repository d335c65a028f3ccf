//! Narrow interfaces to the services the enemy simulation depends on.
//!
//! The simulation never talks to Rapier, the audio engine or the room
//! loader directly. It sees these traits, implemented once for the running
//! game and once headless for tests.

use bevy::math::Vec3;
use std::ops::BitOr;

use super::effects::CombatCue;
use crate::enemies::EnemyId;
use crate::rewards::PickupSpawn;

/// Collision layer bits used to filter physics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    /// Walls, props and everything else that blocks shots.
    pub const OBSTACLE: Self = Self(1);
    pub const PLAYER: Self = Self(1 << 1);
    pub const ENEMY: Self = Self(1 << 2);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when both masks share at least one layer.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Result of a single raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Surface normal at the hit point, unit length.
    pub normal: Vec3,
    pub distance: f32,
    /// Layer of the collider that was hit.
    pub layer: LayerMask,
}

/// A collider found by an overlap query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub layer: LayerMask,
}

/// Read-only world queries. Implementations must be free of side effects.
pub trait PhysicsQuery {
    /// First hit along `direction` within `max_distance` on the layers in `mask`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask)
        -> Option<RayHit>;

    /// Every collider on `mask` touching the sphere.
    fn sphere_overlap(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Overlap>;
}

/// Walkable-area queries shared by every agent in a room.
pub trait NavigationArea {
    /// Closest walkable point within `max_distance` of `point`, if any.
    fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// A single entity's navigation handle.
///
/// Each enemy owns its agent, so destination requests from different
/// enemies never interfere with each other.
pub trait NavigationAgent {
    fn set_destination(&mut self, point: Vec3);

    /// Halt in place. The destination is kept until a new one is set.
    fn stop(&mut self);

    fn destination(&self) -> Option<Vec3>;

    fn velocity(&self) -> Vec3;

    /// True once the agent is within its stopping distance of the destination.
    fn is_at_destination(&self) -> bool;

    fn set_speed(&mut self, speed: f32);

    fn speed(&self) -> f32;

    fn set_stopping_distance(&mut self, distance: f32);

    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Move from `position` toward the destination and return the new position.
    fn advance(&mut self, position: Vec3, dt: f32) -> Vec3;
}

/// Audio, VFX and UI feedback sink.
pub trait EffectsSink {
    fn emit(&mut self, cue: CombatCue);
}

/// Callbacks from the simulation to the room lifecycle manager.
pub trait RoomEvents {
    fn on_enemy_killed(&mut self, enemy: EnemyId, position: Vec3);

    fn on_all_enemies_dead(&mut self);

    fn spawn_pickup(&mut self, pickup: PickupSpawn);
}

/// What happened in the room during a tick, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomNotice {
    EnemyKilled { enemy: EnemyId, position: Vec3 },
    AllEnemiesDead,
    Pickup(PickupSpawn),
}

/// [`RoomEvents`] implementation that records notices for later forwarding.
#[derive(Debug, Default, Clone)]
pub struct RoomLog {
    pub notices: Vec<RoomNotice>,
}

impl RoomLog {
    pub fn drain(&mut self) -> std::vec::Drain<'_, RoomNotice> {
        self.notices.drain(..)
    }

    pub fn kills(&self) -> usize {
        self.notices
            .iter()
            .filter(|n| matches!(n, RoomNotice::EnemyKilled { .. }))
            .count()
    }

    pub fn pickups(&self) -> impl Iterator<Item = &PickupSpawn> {
        self.notices.iter().filter_map(|n| match n {
            RoomNotice::Pickup(p) => Some(p),
            _ => None,
        })
    }
}

impl RoomEvents for RoomLog {
    fn on_enemy_killed(&mut self, enemy: EnemyId, position: Vec3) {
        self.notices.push(RoomNotice::EnemyKilled { enemy, position });
    }

    fn on_all_enemies_dead(&mut self) {
        self.notices.push(RoomNotice::AllEnemiesDead);
    }

    fn spawn_pickup(&mut self, pickup: PickupSpawn) {
        self.notices.push(RoomNotice::Pickup(pickup));
    }
}

/// The player as seen by enemies. Held weakly: enemies read it and report
/// hits, they never own it.
pub trait PlayerTarget {
    fn position(&self) -> Vec3;

    fn is_alive(&self) -> bool;

    fn apply_damage(&mut self, amount: f32, source: EnemyId);
}

/// A hit an enemy landed on the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerHit {
    pub source: EnemyId,
    pub amount: f32,
}

/// Player state captured for one tick. Hits are collected and applied by
/// the host afterwards.
#[derive(Debug, Clone, Default)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    pub alive: bool,
    pub hits: Vec<PlayerHit>,
}

impl PlayerSnapshot {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            alive: true,
            hits: Vec::new(),
        }
    }

    pub fn total_damage(&self) -> f32 {
        self.hits.iter().map(|h| h.amount).sum()
    }
}

impl PlayerTarget for PlayerSnapshot {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn apply_damage(&mut self, amount: f32, source: EnemyId) {
        if self.alive && amount > 0.0 {
            self.hits.push(PlayerHit { source, amount });
        }
    }
}

/// Shared services lent to the simulation for one call.
pub struct Services<'a> {
    pub physics: &'a dyn PhysicsQuery,
    pub navigation: &'a dyn NavigationArea,
    pub effects: &'a mut dyn EffectsSink,
    pub room: &'a mut dyn RoomEvents,
    pub player: &'a mut dyn PlayerTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_masks_combine() {
        let mask = LayerMask::OBSTACLE | LayerMask::PLAYER;

        assert!(mask.intersects(LayerMask::PLAYER));
        assert!(!mask.intersects(LayerMask::ENEMY));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }
}
