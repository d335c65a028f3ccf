//! Core plugin that sets up game states, events, and tuning.

use bevy::prelude::*;

use super::config::{load_combat_tuning, CombatTuning};
use super::events::*;
use super::states::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, InGame, GameOver)
/// - Global events (DamageEvent, EnemyKilledEvent, etc.)
/// - Combat tuning loaded from data
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Initialize game states
            .init_state::<GameState>()

            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<PlayerDiedEvent>()
            .add_event::<PlayerHitEvent>()
            .add_event::<EnemyKilledEvent>()
            .add_event::<AllEnemiesDeadEvent>()
            .add_event::<PickupSpawnEvent>()

            // Tuning is read before any data that depends on it
            .init_resource::<CombatTuning>()
            .add_systems(Startup, load_combat_tuning)

            // Everything else loads on Startup, so gameplay can begin right after
            .add_systems(PostStartup, transition_to_in_game)
            .add_systems(OnEnter(GameState::GameOver), log_game_over);
    }
}

/// Leave the loading state once startup data has been read.
fn transition_to_in_game(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

fn log_game_over() {
    info!("Player died, combat stopped");
}
