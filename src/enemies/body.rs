//! Mutable runtime state of one enemy.

use bevy::math::{Quat, Vec3};
use rand::Rng;
use std::sync::Arc;

use super::animation::AttackCallback;
use super::channels::EnemyChannels;
use super::components::{EnemyId, EnemyTier};
use super::data::{ArchetypeDefinition, CombatStats};
use crate::core::{Scheduler, TimerHandle};
use crate::rewards::{DropData, PickupSpawn};

/// Payloads of the per-enemy scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyTimer {
    /// Owned by a state, which polls for its handle.
    State,
    Attack(AttackCallback),
    StunOver,
    RagdollCleanup,
    Pickup(PickupSpawn),
}

/// Everything about an enemy that states and attacks read or change.
#[derive(Debug, Clone)]
pub struct EnemyBody {
    pub id: EnemyId,
    pub archetype: Arc<ArchetypeDefinition>,
    pub tier: EnemyTier,
    pub position: Vec3,
    pub rotation: Quat,
    /// Fixed at spawn.
    pub patrol_points: Vec<Vec3>,
    /// Set from outside to make the enemy move at patrolling speed.
    pub walking: bool,
    /// Movement animation speed, for the presentation layer.
    pub anim_speed: f32,
    pub channels: EnemyChannels,
    /// Nodes of the last computed laser, used by the boss bullet.
    pub laser_path: Vec<Vec3>,
    pub shoot_count: u32,
    pub(super) health: f32,
    pub(super) dead: bool,
    pub(super) stunned: bool,
    pub(super) chase_mode: bool,
    pub(super) collider_enabled: bool,
    pub(super) released: bool,
    pub(super) hit_offset_mult: f32,
    pub(super) last_damage_at: Option<f32>,
    pub(super) last_flash_at: Option<f32>,
    pub(super) last_text_at: Option<f32>,
    pub(super) last_projectile_position: Vec3,
    pub(super) drops: Vec<DropData>,
    pub(super) heal_drop_chance: f32,
    pub(super) timers: Scheduler<BodyTimer>,
    pub(super) fired: Vec<TimerHandle>,
    pub(super) attack_timers: Vec<TimerHandle>,
    pub(super) stun_timer: Option<TimerHandle>,
    pub(super) ragdoll_timer: Option<TimerHandle>,
}

impl EnemyBody {
    pub fn new(
        id: EnemyId,
        archetype: Arc<ArchetypeDefinition>,
        elite: bool,
        position: Vec3,
        rotation: Quat,
        patrol_points: Vec<Vec3>,
    ) -> Self {
        let tier = match archetype.tier {
            EnemyTier::Regular if elite => EnemyTier::Elite,
            tier => tier,
        };

        let mut body = Self {
            id,
            archetype,
            tier,
            position,
            rotation,
            patrol_points,
            walking: false,
            anim_speed: 0.0,
            channels: EnemyChannels::default(),
            laser_path: Vec::new(),
            shoot_count: 0,
            health: 0.0,
            dead: false,
            stunned: false,
            chase_mode: false,
            collider_enabled: true,
            released: false,
            hit_offset_mult: 1.0,
            last_damage_at: None,
            last_flash_at: None,
            last_text_at: None,
            last_projectile_position: position,
            drops: Vec::new(),
            heal_drop_chance: 0.0,
            timers: Scheduler::new(),
            fired: Vec::new(),
            attack_timers: Vec::new(),
            stun_timer: None,
            ragdoll_timer: None,
        };
        body.health = body.max_health();
        body
    }

    pub fn stats(&self) -> &CombatStats {
        &self.archetype.stats
    }

    pub fn is_elite(&self) -> bool {
        self.tier == EnemyTier::Elite
    }

    pub fn max_health(&self) -> f32 {
        let stats = self.stats();
        if self.is_elite() {
            stats.hp * stats.elite_health_mult
        } else {
            stats.hp
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn health_fraction(&self) -> f32 {
        let max = self.max_health();
        if max <= 0.0 {
            0.0
        } else {
            self.health / max
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_stunned(&self) -> bool {
        self.stunned
    }

    pub fn is_chasing(&self) -> bool {
        self.chase_mode
    }

    pub fn collider_enabled(&self) -> bool {
        self.collider_enabled
    }

    /// True once the ragdoll was handed back after death.
    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn hit_offset_multiplier(&self) -> f32 {
        self.hit_offset_mult
    }

    pub fn drops(&self) -> &[DropData] {
        &self.drops
    }

    pub fn add_drop(&mut self, drop: DropData) {
        self.drops.push(drop);
    }

    pub fn reset_drops(&mut self) {
        self.drops.clear();
    }

    pub fn set_heal_drop_chance(&mut self, chance: f32) {
        self.heal_drop_chance = chance.clamp(0.0, 1.0);
    }

    /// Vision range, unbounded once chase mode is on.
    pub fn vision_range(&self) -> f32 {
        if self.chase_mode {
            f32::INFINITY
        } else {
            self.stats().vision_range
        }
    }

    /// Make the enemy chase its target from now on.
    pub fn start_chasing(&mut self) {
        self.chase_mode = true;
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Where shots leave the gun.
    pub fn muzzle(&self) -> Vec3 {
        self.position
            + Vec3::Y * self.archetype.muzzle_height
            + self.forward() * self.archetype.body_radius
    }

    /// Damage of the next attack, rolled from the archetype range.
    pub fn roll_damage(&self, rng: &mut impl Rng) -> f32 {
        let stats = self.stats();
        let mult = if self.is_elite() {
            stats.elite_damage_mult
        } else {
            1.0
        };
        (stats.damage.random(rng) * mult).trunc()
    }

    /// Seconds since the enemy was spawned.
    pub fn now(&self) -> f32 {
        self.timers.now()
    }

    /// Schedule a call owned by the active state.
    pub fn schedule_state(&mut self, delay: f32) -> TimerHandle {
        self.timers.schedule(delay, BodyTimer::State)
    }

    pub fn cancel_timer(&mut self, slot: &mut Option<TimerHandle>) {
        self.timers.cancel_slot(slot);
    }

    /// True if the call in `slot` fired this tick. Clears the slot when it did.
    pub fn take_fired(&mut self, slot: &mut Option<TimerHandle>) -> bool {
        match *slot {
            Some(handle) if self.fired.contains(&handle) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Start the attack clip. Ignored while one is already playing.
    pub fn begin_attack(&mut self) -> bool {
        if !self.attack_timers.is_empty() || self.dead {
            return false;
        }

        for (delay, callback) in self.archetype.timeline.callbacks() {
            let handle = self.timers.schedule(delay, BodyTimer::Attack(callback));
            self.attack_timers.push(handle);
        }
        true
    }

    pub fn is_attacking(&self) -> bool {
        !self.attack_timers.is_empty()
    }

    /// Drop every pending attack callback.
    pub fn cancel_attack(&mut self) {
        for handle in self.attack_timers.drain(..) {
            self.timers.cancel(handle);
        }
    }

    pub(super) fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::animation::AttackTimeline;
    use crate::enemies::data::Span;
    use crate::enemies::profiles::AttackProfile;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn archetype() -> Arc<ArchetypeDefinition> {
        Arc::new(ArchetypeDefinition {
            name: "Brute".to_string(),
            tier: EnemyTier::Regular,
            stats: CombatStats {
                hp: 100.0,
                move_speed: 4.0,
                patrolling_speed: 2.0,
                patrolling_multiplier: 1.0,
                angular_speed: 360.0,
                preferred_distance: 1.0,
                attack_distance: 2.0,
                vision_range: 10.0,
                flee_distance: 0.0,
                aim_duration: 0.0,
                patrolling_idle_duration: 0.0,
                damage: Span { min: 10.0, max: 10.5 },
                hp_for_player: Span::fixed(10.0),
                elite_health_mult: 2.0,
                elite_damage_mult: 1.5,
                hit_text_height: 2.0,
            },
            profile: AttackProfile::Melee {
                hit_radius: 1.0,
                hit_reach: 1.0,
            },
            timeline: AttackTimeline {
                hit: 0.2,
                finish: 0.5,
                reload: None,
            },
            body_radius: 0.5,
            muzzle_height: 1.0,
        })
    }

    fn body(elite: bool) -> EnemyBody {
        EnemyBody::new(EnemyId(1), archetype(), elite, Vec3::ZERO, Quat::IDENTITY, Vec::new())
    }

    #[test]
    fn elite_flag_scales_health_and_damage() {
        let mut rng = StdRng::seed_from_u64(5);
        let regular = body(false);
        let elite = body(true);

        assert_eq!(regular.max_health(), 100.0);
        assert_eq!(elite.max_health(), 200.0);
        assert_eq!(elite.health(), 200.0);
        assert_eq!(elite.tier, EnemyTier::Elite);

        assert_eq!(regular.roll_damage(&mut rng), 10.0);
        assert_eq!(elite.roll_damage(&mut rng), 15.0);
    }

    #[test]
    fn chase_mode_unbounds_vision() {
        let mut body = body(false);
        assert_eq!(body.vision_range(), 10.0);

        body.start_chasing();
        assert!(body.vision_range().is_infinite());
    }

    #[test]
    fn attack_cannot_restart_while_playing() {
        let mut body = body(false);

        assert!(body.begin_attack());
        assert!(!body.begin_attack());
        assert_eq!(body.pending_timers(), 2);

        body.cancel_attack();
        assert!(!body.is_attacking());
        assert_eq!(body.pending_timers(), 0);
    }
}
