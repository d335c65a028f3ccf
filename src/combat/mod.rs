//! Combat module - the player's health, incoming damage and death.

mod components;
mod plugin;
mod systems;

pub use components::*;
pub use plugin::CombatPlugin;
pub use systems::spawn_player;
