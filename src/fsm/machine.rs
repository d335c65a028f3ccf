//! State machine container and transition evaluation.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use super::behavior::{Controlled, FinishSignal, StateBehavior};
use super::error::FsmError;

/// Identifier of a state, usually a field-less enum.
pub trait StateId: Copy + Eq + Hash + Debug + 'static {}

impl<T: Copy + Eq + Hash + Debug + 'static> StateId for T {}

/// When a transition is allowed to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Evaluated every tick.
    Always,
    /// Evaluated only once the active behaviour has invoked its finish signal.
    OnFinish,
}

type Predicate<S, E> =
    Box<dyn FnMut(&mut <E as Controlled>::Context<'_>) -> Option<S> + Send + Sync>;

/// A guarded edge out of a state.
///
/// The predicate returns the next state id when it wants to fire. Every id it
/// may return has to be declared up front so wiring mistakes surface when the
/// machine is built rather than in the middle of play.
pub struct Transition<S, E: Controlled> {
    kind: TransitionKind,
    targets: Vec<S>,
    predicate: Predicate<S, E>,
}

impl<S: StateId, E: Controlled> Transition<S, E> {
    /// Conditional transition that may pick any of `targets`.
    pub fn new<F>(kind: TransitionKind, targets: &[S], predicate: F) -> Self
    where
        F: FnMut(&mut E::Context<'_>) -> Option<S> + Send + Sync + 'static,
    {
        Self {
            kind,
            targets: targets.to_vec(),
            predicate: Box::new(predicate),
        }
    }

    /// Unconditional transition taken as soon as the state finishes.
    pub fn on_finish(target: S) -> Self {
        Self::new(TransitionKind::OnFinish, &[target], move |_| Some(target))
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }
}

struct StateCase<S, E: Controlled> {
    behavior: Box<dyn StateBehavior<E> + Send + Sync>,
    transitions: Vec<Transition<S, E>>,
}

/// Collects states and validates their wiring.
pub struct StateMachineBuilder<S, E: Controlled> {
    cases: Vec<(S, StateCase<S, E>)>,
}

impl<S: StateId, E: Controlled> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self { cases: Vec::new() }
    }
}

impl<S: StateId, E: Controlled> StateMachineBuilder<S, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state with its transitions in priority order.
    pub fn state<B>(mut self, id: S, behavior: B, transitions: Vec<Transition<S, E>>) -> Self
    where
        B: StateBehavior<E> + Send + Sync + 'static,
    {
        self.cases.push((
            id,
            StateCase {
                behavior: Box::new(behavior),
                transitions,
            },
        ));
        self
    }

    /// Build the machine, rejecting duplicate states and dangling transitions.
    pub fn build(self) -> Result<StateMachine<S, E>, FsmError> {
        let mut cases = HashMap::with_capacity(self.cases.len());
        for (id, case) in self.cases {
            if cases.insert(id, case).is_some() {
                return Err(FsmError::DuplicateState(format!("{id:?}")));
            }
        }

        for (from, case) in &cases {
            for transition in &case.transitions {
                if let Some(to) = transition.targets.iter().find(|t| !cases.contains_key(*t)) {
                    return Err(FsmError::UnknownTransitionTarget {
                        from: format!("{from:?}"),
                        to: format!("{to:?}"),
                    });
                }
            }
        }

        Ok(StateMachine {
            cases,
            active: None,
            running: false,
            signal: FinishSignal::default(),
        })
    }
}

/// Runs exactly one active state at a time.
///
/// # Tick policy
///
/// A tick updates the active behaviour, then walks its transitions in
/// declaration order. `OnFinish` transitions are skipped unless the finish
/// signal is set. The first predicate that returns a state wins and at most
/// one state switch happens per tick, even if the freshly started state
/// could transition straight away. Its transitions are looked at on the next
/// tick, after its first update.
pub struct StateMachine<S, E: Controlled> {
    cases: HashMap<S, StateCase<S, E>>,
    active: Option<S>,
    running: bool,
    signal: FinishSignal,
}

impl<S: StateId, E: Controlled> StateMachine<S, E> {
    pub fn builder() -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new()
    }

    /// Enter `initial` and start ticking.
    pub fn start(&mut self, initial: S, cx: &mut E::Context<'_>) -> Result<(), FsmError> {
        if self.running {
            let active = self.active.map(|s| format!("{s:?}")).unwrap_or_default();
            return Err(FsmError::AlreadyRunning(active));
        }

        let Some(case) = self.cases.get_mut(&initial) else {
            return Err(FsmError::UnknownState(format!("{initial:?}")));
        };

        self.active = Some(initial);
        self.running = true;
        self.signal.reset();
        case.behavior.on_start(cx, &mut self.signal);

        Ok(())
    }

    /// Leave the active state and stop ticking. No-op when already stopped.
    pub fn stop(&mut self, cx: &mut E::Context<'_>) {
        if !self.running {
            return;
        }

        self.running = false;
        if let Some(case) = self.active.and_then(|id| self.cases.get_mut(&id)) {
            case.behavior.on_end(cx);
        }
    }

    /// Advance the active state and apply at most one transition.
    ///
    /// Returns the state that was entered, if any.
    pub fn tick(&mut self, cx: &mut E::Context<'_>, dt: f32) -> Option<S> {
        if !self.running {
            return None;
        }

        let current = self.active?;
        let case = self.cases.get_mut(&current)?;

        case.behavior.on_update(cx, &mut self.signal, dt);

        let finished = self.signal.is_finished();
        let mut next = None;
        for transition in case.transitions.iter_mut() {
            if transition.kind == TransitionKind::OnFinish && !finished {
                continue;
            }

            if let Some(target) = (transition.predicate)(cx) {
                if transition.targets.contains(&target) {
                    next = Some(target);
                    break;
                }
                bevy::log::error!(
                    "Transition from {:?} returned undeclared state {:?}, ignoring",
                    current,
                    target
                );
            }
        }

        let next = next?;
        case.behavior.on_end(cx);

        // Targets were validated at build time.
        let case = self.cases.get_mut(&next)?;
        self.active = Some(next);
        self.signal.reset();
        case.behavior.on_start(cx, &mut self.signal);

        Some(next)
    }

    pub fn active_state(&self) -> Option<S> {
        self.active
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.signal.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    #[derive(Default)]
    struct ProbeCx {
        log: Vec<String>,
        open: bool,
    }

    impl Controlled for Probe {
        type Context<'a> = ProbeCx;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Id {
        A,
        B,
        C,
    }

    struct Recorder {
        name: &'static str,
        finish_after: Option<u32>,
        updates: u32,
    }

    impl Recorder {
        fn idle(name: &'static str) -> Self {
            Self {
                name,
                finish_after: None,
                updates: 0,
            }
        }

        fn finishing(name: &'static str, after: u32) -> Self {
            Self {
                name,
                finish_after: Some(after),
                updates: 0,
            }
        }
    }

    impl StateBehavior<Probe> for Recorder {
        fn on_start(&mut self, cx: &mut ProbeCx, _signal: &mut FinishSignal) {
            self.updates = 0;
            cx.log.push(format!("{}:start", self.name));
        }

        fn on_update(&mut self, cx: &mut ProbeCx, signal: &mut FinishSignal, _dt: f32) {
            self.updates += 1;
            cx.log.push(format!("{}:update", self.name));
            if self.finish_after.is_some_and(|n| self.updates >= n) {
                signal.invoke();
            }
        }

        fn on_end(&mut self, cx: &mut ProbeCx) {
            cx.log.push(format!("{}:end", self.name));
        }
    }

    fn always(target: Id) -> Transition<Id, Probe> {
        Transition::new(TransitionKind::Always, &[target], move |_: &mut ProbeCx| Some(target))
    }

    #[test]
    fn build_rejects_unregistered_target() {
        let result = StateMachine::<Id, Probe>::builder()
            .state(Id::A, Recorder::idle("a"), vec![always(Id::C)])
            .state(Id::B, Recorder::idle("b"), vec![])
            .build();

        assert!(matches!(result, Err(FsmError::UnknownTransitionTarget { .. })));
    }

    #[test]
    fn build_rejects_duplicate_state() {
        let result = StateMachine::<Id, Probe>::builder()
            .state(Id::A, Recorder::idle("a"), vec![])
            .state(Id::A, Recorder::idle("a2"), vec![])
            .build();

        assert_eq!(result.err(), Some(FsmError::DuplicateState("A".to_string())));
    }

    #[test]
    fn start_with_unknown_state_fails() {
        let mut machine = StateMachine::<Id, Probe>::builder()
            .state(Id::A, Recorder::idle("a"), vec![])
            .build()
            .unwrap();
        let mut cx = ProbeCx::default();

        assert!(matches!(machine.start(Id::B, &mut cx), Err(FsmError::UnknownState(_))));
        assert!(!machine.is_running());
    }

    #[test]
    fn one_transition_per_tick() {
        let mut machine = StateMachine::<Id, Probe>::builder()
            .state(Id::A, Recorder::idle("a"), vec![always(Id::B)])
            .state(Id::B, Recorder::idle("b"), vec![always(Id::C)])
            .state(Id::C, Recorder::idle("c"), vec![])
            .build()
            .unwrap();
        let mut cx = ProbeCx::default();
        machine.start(Id::A, &mut cx).unwrap();

        assert_eq!(machine.tick(&mut cx, 0.016), Some(Id::B));
        assert_eq!(machine.active_state(), Some(Id::B));
        assert_eq!(cx.log, ["a:start", "a:update", "a:end", "b:start"]);

        assert_eq!(machine.tick(&mut cx, 0.016), Some(Id::C));
    }

    #[test]
    fn first_satisfied_transition_wins() {
        let mut machine = StateMachine::<Id, Probe>::builder()
            .state(
                Id::A,
                Recorder::idle("a"),
                vec![
                    Transition::new(TransitionKind::Always, &[Id::B], |cx: &mut ProbeCx| {
                        cx.open.then_some(Id::B)
                    }),
                    always(Id::C),
                ],
            )
            .state(Id::B, Recorder::idle("b"), vec![])
            .state(Id::C, Recorder::idle("c"), vec![])
            .build()
            .unwrap();
        let mut cx = ProbeCx {
            open: true,
            ..default_cx()
        };
        machine.start(Id::A, &mut cx).unwrap();

        assert_eq!(machine.tick(&mut cx, 0.016), Some(Id::B));
    }

    #[test]
    fn on_finish_waits_for_signal() {
        let mut machine = StateMachine::<Id, Probe>::builder()
            .state(Id::A, Recorder::finishing("a", 3), vec![Transition::on_finish(Id::B)])
            .state(Id::B, Recorder::idle("b"), vec![])
            .build()
            .unwrap();
        let mut cx = ProbeCx::default();
        machine.start(Id::A, &mut cx).unwrap();

        assert_eq!(machine.tick(&mut cx, 0.016), None);
        assert_eq!(machine.tick(&mut cx, 0.016), None);
        assert_eq!(machine.tick(&mut cx, 0.016), Some(Id::B));
    }

    #[test]
    fn finish_flag_resets_on_reentry() {
        let mut machine = StateMachine::<Id, Probe>::builder()
            .state(Id::A, Recorder::finishing("a", 2), vec![Transition::on_finish(Id::A)])
            .build()
            .unwrap();
        let mut cx = ProbeCx::default();
        machine.start(Id::A, &mut cx).unwrap();

        assert_eq!(machine.tick(&mut cx, 0.016), None);
        assert_eq!(machine.tick(&mut cx, 0.016), Some(Id::A));
        assert!(!machine.is_finished());
        // The re-entered state has to finish again on its own.
        assert_eq!(machine.tick(&mut cx, 0.016), None);
        assert_eq!(machine.tick(&mut cx, 0.016), Some(Id::A));
    }

    #[test]
    fn stop_ends_active_state_and_freezes() {
        let mut machine = StateMachine::<Id, Probe>::builder()
            .state(Id::A, Recorder::idle("a"), vec![always(Id::B)])
            .state(Id::B, Recorder::idle("b"), vec![])
            .build()
            .unwrap();
        let mut cx = ProbeCx::default();
        machine.start(Id::A, &mut cx).unwrap();
        machine.stop(&mut cx);
        machine.stop(&mut cx);

        assert_eq!(machine.tick(&mut cx, 0.016), None);
        assert_eq!(cx.log, ["a:start", "a:end"]);
        assert!(matches!(machine.start(Id::A, &mut cx), Ok(())));
        assert!(matches!(machine.start(Id::A, &mut cx), Err(FsmError::AlreadyRunning(_))));
    }

    fn default_cx() -> ProbeCx {
        ProbeCx::default()
    }
}
