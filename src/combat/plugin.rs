//! Combat plugin - player health, incoming damage and death.

use bevy::prelude::*;

use super::systems;
use crate::core::GameState;

/// Combat plugin - handles the player's side of combat.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                systems::apply_player_hits,
                systems::apply_damage,
                systems::check_player_death,
            )
                .chain()
                .run_if(in_state(GameState::InGame)),
        );
    }
}
