//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. Enemy AI and
//! damage routing only run while `InGame`.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` while archetype, room and tuning data is read
/// - `InGame` runs the combat simulation for the active room
/// - `GameOver` when the player dies; enemies freeze where they stand
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files
    #[default]
    Loading,
    /// Active gameplay
    InGame,
    /// Player has died
    GameOver,
}
