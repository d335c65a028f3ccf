//! Delayed calls keyed by elapsed time.
//!
//! Nothing in the simulation blocks or sleeps. Anything that has to happen
//! "in N seconds" is scheduled here as a payload and handed back by
//! [`Scheduler::advance`] once enough time has passed. Owners poll the
//! returned payloads every tick and cancel handles they no longer want.

/// Handle to a scheduled call, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Scheduled<T> {
    handle: TimerHandle,
    due: f32,
    payload: T,
}

/// A queue of payloads waiting for their due time.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f32,
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the scheduler was created.
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Schedule `payload` to fire `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            handle,
            due: self.now + delay.max(0.0),
            payload,
        });
        handle
    }

    /// Drop a pending call. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.handle != handle);
        self.pending.len() != before
    }

    /// Cancel the handle stored in `slot`, if any, and clear the slot.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|s| s.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending call.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Move time forward and return the calls that became due, earliest first.
    /// Calls due at the same instant keep their scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<(TimerHandle, T)> {
        self.now += dt.max(0.0);

        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.cmp(&b.handle)));
        due.into_iter().map(|s| (s.handle, s.payload)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_delay_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0.3, "late");
        scheduler.schedule(0.1, "early");

        assert!(scheduler.advance(0.05).is_empty());

        let fired: Vec<_> = scheduler.advance(0.3).into_iter().map(|(_, p)| p).collect();
        assert_eq!(fired, ["early", "late"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancelled_calls_never_fire() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(0.1, 1);
        let mut slot = Some(scheduler.schedule(0.1, 2));

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        scheduler.cancel_slot(&mut slot);

        assert!(slot.is_none());
        assert!(scheduler.advance(1.0).is_empty());
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(0.0, ());

        assert!(scheduler.is_pending(handle));
        assert_eq!(scheduler.advance(0.0).len(), 1);
    }
}
