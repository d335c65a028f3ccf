//! Error types for state machine wiring.

use thiserror::Error;

/// Configuration errors detected while building or starting a machine.
///
/// These are fatal to setup: an entity whose machine fails to build never
/// enters play.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsmError {
    /// A state was referenced that was never registered.
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// The same state id was registered twice.
    #[error("State registered twice: {0}")]
    DuplicateState(String),

    /// A transition points at a state that was never registered.
    #[error("Transition from '{from}' targets unregistered state '{to}'")]
    UnknownTransitionTarget { from: String, to: String },

    /// `start` was called while the machine was already running.
    #[error("State machine is already running in state '{0}'")]
    AlreadyRunning(String),
}
