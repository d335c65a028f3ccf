//! Melee attack state: chase the target and swing whenever it is in reach.

use bevy::math::Vec3;

use crate::enemies::channels::Subscription;
use crate::enemies::context::{Enemy, EnemyCx};
use crate::fsm::{FinishSignal, StateBehavior};

#[derive(Debug, Default)]
pub struct MeleeChase {
    last_target: Option<Vec3>,
    swing: Option<Subscription>,
}

impl StateBehavior<Enemy> for MeleeChase {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        let preferred = cx.body.stats().preferred_distance;
        cx.agent.set_stopping_distance(preferred);
        cx.apply_movement_speed();

        let target = cx.target_position();
        cx.move_to(target);
        self.last_target = Some(target);
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal, dt: f32) {
        cx.apply_movement_speed();

        let target = cx.target_position();
        let threshold = cx.tuning.melee_repath_threshold;
        if self.last_target.map_or(true, |last| last.distance(target) > threshold) {
            cx.move_to(target);
            self.last_target = Some(target);
        }

        if self.swing.is_some() {
            cx.turn_toward_target(dt);
            if cx.body.channels.attack_finished.poll_slot(&self.swing) {
                cx.body.channels.attack_finished.unsubscribe_slot(&mut self.swing);
            }
        } else if cx.is_target_in_attack_range() && !cx.body.is_attacking() {
            self.swing = Some(cx.body.channels.attack_finished.subscribe());
            cx.attack();
        }

        cx.update_anim_speed(1.0);
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        if self.swing.is_some() {
            cx.body.cancel_attack();
        }
        cx.body.channels.attack_finished.unsubscribe_slot(&mut self.swing);
        self.last_target = None;
        cx.stop_moving();
        cx.agent.set_stopping_distance(0.0);
    }
}
