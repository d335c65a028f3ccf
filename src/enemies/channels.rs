//! Typed event channels.
//!
//! States subscribe when they start and must unsubscribe when they end.
//! An emitted value is delivered to every subscription alive at emit time
//! and waits in that subscription's queue until the owner polls it.

/// Handle of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Debug, Clone)]
struct Subscriber<T> {
    id: Subscription,
    queue: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct Channel<T> {
    next_id: u64,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<T: Clone> Channel<T> {
    pub fn subscribe(&mut self) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            queue: Vec::new(),
        });
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != subscription);
        self.subscribers.len() != before
    }

    /// Unsubscribe whatever is stored in `slot` and clear it.
    pub fn unsubscribe_slot(&mut self, slot: &mut Option<Subscription>) {
        if let Some(subscription) = slot.take() {
            self.unsubscribe(subscription);
        }
    }

    /// Deliver `value` to every current subscriber. Returns how many got it.
    pub fn emit(&mut self, value: T) -> usize {
        for subscriber in &mut self.subscribers {
            subscriber.queue.push(value.clone());
        }
        self.subscribers.len()
    }

    /// Take everything delivered to `subscription` since the last poll.
    pub fn drain(&mut self, subscription: Subscription) -> Vec<T> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == subscription)
            .map(|s| std::mem::take(&mut s.queue))
            .unwrap_or_default()
    }

    /// True if anything was delivered to the subscription in `slot`.
    /// Pending values are consumed.
    pub fn poll_slot(&mut self, slot: &Option<Subscription>) -> bool {
        slot.is_some_and(|s| !self.drain(s).is_empty())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

/// The channels every enemy exposes.
#[derive(Debug, Clone, Default)]
pub struct EnemyChannels {
    pub attack_finished: Channel<()>,
    pub reload_finished: Channel<()>,
    /// Damage amount of every hit taken.
    pub taken_damage: Channel<f32>,
    /// `true` when a stun starts, `false` when it wears off.
    pub stunned: Channel<bool>,
}

impl EnemyChannels {
    pub fn clear(&mut self) {
        self.attack_finished.clear();
        self.reload_finished.clear();
        self.taken_damage.clear();
        self.stunned.clear();
    }
}
