//! Finite-state-machine framework used to drive enemy behaviour.
//!
//! A [`StateMachine`] owns a set of named states. Each state is a
//! [`StateBehavior`] plus an ordered list of [`Transition`]s that are
//! evaluated once per tick. The framework knows nothing about enemies:
//! it is generic over the [`Controlled`] entity type whose per-tick
//! context gets lent to behaviours and transition predicates.

mod behavior;
mod error;
mod machine;

pub use behavior::{Controlled, FinishSignal, StateBehavior};
pub use error::FsmError;
pub use machine::{StateId, StateMachine, StateMachineBuilder, Transition, TransitionKind};
