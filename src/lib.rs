//! Squad Shooter - enemy AI and combat core of a top-down squad shooter in Bevy.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, global events, delayed calls, combat tuning
//! - **Fsm**: Generic state machine driving every enemy
//! - **Enemies**: Archetypes, states, attacks, projectiles and the enemy manager
//! - **Combat**: The player's health, incoming damage and death
//! - **Rewards**: Reward splitting, drops, chests and the currency ledger
//! - **World**: Room data, room lifecycle and the services enemies query
//!
//! The enemy simulation itself is plain data ticked once per frame by
//! [`enemies::EnemyManager`]. It only sees the world through the traits in
//! [`world`], so it runs headless in tests.

pub mod combat;
pub mod core;
pub mod enemies;
pub mod fsm;
pub mod rewards;
pub mod world;

use bevy::prelude::*;

/// Main game plugin that adds all sub-plugins.
pub struct SquadShooterPlugin;

impl Plugin for SquadShooterPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Player health and damage
            .add_plugins(combat::CombatPlugin)

            // Enemy simulation
            .add_plugins(enemies::EnemyPlugin)

            // Pickups, chests and ledger
            .add_plugins(rewards::RewardsPlugin)

            // Rooms
            .add_plugins(world::WorldPlugin);
    }
}
