//! Attack animation timeline.
//!
//! Animation playback itself lives outside the simulation. What the
//! simulation needs from it are the callbacks an attack clip raises, at the
//! times the archetype data says they happen.

use serde::Deserialize;

/// Callbacks raised by an attack clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackCallback {
    /// The frame the attack connects or the gun fires.
    Hit,
    /// The attack clip is over.
    HitFinish,
    /// The reload clip after the attack is over.
    ReloadFinished,
}

/// Callback times in seconds from the start of an attack.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct AttackTimeline {
    pub hit: f32,
    pub finish: f32,
    /// Only archetypes that reload raise `ReloadFinished`.
    #[serde(default)]
    pub reload: Option<f32>,
}

impl AttackTimeline {
    /// The callbacks one attack raises, in time order.
    pub fn callbacks(&self) -> Vec<(f32, AttackCallback)> {
        let mut callbacks = vec![
            (self.hit, AttackCallback::Hit),
            (self.finish.max(self.hit), AttackCallback::HitFinish),
        ];
        if let Some(reload) = self.reload {
            callbacks.push((reload.max(self.finish), AttackCallback::ReloadFinished));
        }
        callbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_never_run_backwards() {
        let timeline = AttackTimeline {
            hit: 0.5,
            finish: 0.2,
            reload: Some(0.1),
        };

        let times: Vec<f32> = timeline.callbacks().iter().map(|(t, _)| *t).collect();

        assert_eq!(times, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn reload_only_when_configured() {
        let timeline = AttackTimeline {
            hit: 0.2,
            finish: 0.6,
            reload: None,
        };

        let kinds: Vec<_> = timeline.callbacks().into_iter().map(|(_, c)| c).collect();

        assert_eq!(kinds, [AttackCallback::Hit, AttackCallback::HitFinish]);
    }
}
