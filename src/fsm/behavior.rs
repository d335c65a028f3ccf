//! Behaviour units bound to a controlled entity.

/// An entity type that can be driven by a [`StateMachine`](super::StateMachine).
///
/// Behaviours never store a reference to their entity. Instead the machine
/// lends them a `Context` on every lifecycle call, which bundles the
/// entity's mutable state with the services it may use during that tick.
pub trait Controlled {
    type Context<'a>;
}

/// Completion flag of the active state.
///
/// Behaviours call [`FinishSignal::invoke`] when they are done. Only
/// `OnFinish` transitions look at it, and the machine resets it every time
/// a state starts, including when a state re-enters itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FinishSignal {
    finished: bool,
}

impl FinishSignal {
    /// Mark the active state as finished.
    pub fn invoke(&mut self) {
        self.finished = true;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn reset(&mut self) {
        self.finished = false;
    }
}

/// A single behaviour unit with a start/update/end lifecycle.
///
/// `on_end` is called whenever the state is left, including when the
/// machine is stopped, and must cancel every timer and channel
/// subscription the state registered.
pub trait StateBehavior<E: Controlled> {
    fn on_start(&mut self, _cx: &mut E::Context<'_>, _signal: &mut FinishSignal) {}

    fn on_update(&mut self, cx: &mut E::Context<'_>, signal: &mut FinishSignal, dt: f32);

    fn on_end(&mut self, _cx: &mut E::Context<'_>) {}
}
