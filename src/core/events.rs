//! Global events used for cross-system communication.
//!
//! The enemy simulation itself reports through plain return values and
//! service traits. These events are how the Bevy layer around it talks to
//! the rest of the app: weapons raise `DamageEvent`s, the enemy plugin
//! turns simulation results into kills, pickups and player hits.

use bevy::prelude::*;

use crate::enemies::EnemyId;
use crate::rewards::PickupSpawn;

/// Sent when an entity takes damage.
///
/// Damage aimed at an enemy is routed into the enemy simulation; damage
/// aimed at the player is applied to its `Health`.
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Entity that caused the damage, if it still exists
    pub source: Option<Entity>,
    /// Damage amount
    pub amount: f32,
    /// Where the damage came from (projectile position)
    pub point: Vec3,
    /// Direction the damage travelled in
    pub direction: Vec3,
}

/// Sent when the player dies (health reaches 0).
#[derive(Event, Debug, Clone)]
pub struct PlayerDiedEvent {
    pub player: Entity,
}

/// Sent once per enemy death.
#[derive(Event, Debug, Clone)]
pub struct EnemyKilledEvent {
    pub enemy: EnemyId,
    pub position: Vec3,
}

/// Sent when the last living enemy of the active room died.
#[derive(Event, Debug, Clone, Default)]
pub struct AllEnemiesDeadEvent;

/// Sent when a drop pickup should appear in the world.
#[derive(Event, Debug, Clone)]
pub struct PickupSpawnEvent(pub PickupSpawn);

/// Sent when an enemy attack lands on the player.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlayerHitEvent {
    pub source: EnemyId,
    pub amount: f32,
}
