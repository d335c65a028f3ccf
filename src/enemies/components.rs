//! Identifiers and ECS components that tie enemies to the simulation.

use bevy::prelude::*;
use serde::Deserialize;
use std::fmt;

/// Stable handle of a simulated enemy, unique within one [`EnemyManager`](super::EnemyManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u32);

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Health and damage class of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum EnemyTier {
    #[default]
    Regular,
    Elite,
    Boss,
}

/// Links an ECS entity to the enemy it displays.
#[derive(Component, Debug, Clone, Copy)]
pub struct EnemyLink(pub EnemyId);

/// Links an ECS entity to a projectile in flight.
#[derive(Component, Debug, Clone, Copy)]
pub struct ProjectileLink(pub u32);
