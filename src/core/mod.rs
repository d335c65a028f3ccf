//! Core game module - states, events, scheduling and tuning.
//!
//! This module provides the foundation that all other game systems build upon.

mod config;
mod events;
mod plugin;
mod scheduler;
mod states;

pub use config::{load_ron, CombatTuning, COMBAT_TUNING_PATH};
pub use events::*;
pub use plugin::CorePlugin;
pub use scheduler::{Scheduler, TimerHandle};
pub use states::*;
