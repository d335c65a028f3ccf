//! Errors raised while putting an enemy into play.

use thiserror::Error;

use super::components::EnemyId;
use crate::fsm::FsmError;

/// Setup failures. An enemy that hits one of these never enters play.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpawnError {
    #[error("Unknown enemy archetype '{0}'")]
    UnknownArchetype(String),

    #[error("Archetype '{archetype}' needs at least {required} patrol point(s), got {given}")]
    MissingPatrolPoints {
        archetype: String,
        required: usize,
        given: usize,
    },

    #[error("No enemy with id {0}")]
    UnknownEnemy(EnemyId),

    #[error("State machine wiring for '{archetype}' is broken: {source}")]
    StateMachine {
        archetype: String,
        #[source]
        source: FsmError,
    },
}
