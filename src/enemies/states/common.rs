//! States shared by the regular archetypes.

use bevy::log::debug;
use bevy::math::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

use crate::core::TimerHandle;
use crate::enemies::channels::Subscription;
use crate::enemies::context::{Enemy, EnemyCx};
use crate::enemies::motion::flat_distance;
use crate::fsm::{FinishSignal, StateBehavior};
use crate::world::CombatCue;

/// How far a patrol point may sit from walkable ground and still count.
const PATROL_SAMPLE_DISTANCE: f32 = 1.0;
/// A lone patrol point this close means the enemy is already on its post.
const POST_DISTANCE: f32 = 1.0;
const FLEE_SAMPLE_DISTANCE: f32 = 1.0;
/// Fraction of the remaining turn applied per second while aiming.
const AIM_TURN_RATE: f32 = 10.0;

/// Walks the patrol route, pausing at every point.
#[derive(Debug, Default)]
pub struct Patrolling {
    points: Vec<Vec3>,
    index: usize,
    stationary: bool,
    idle: Option<TimerHandle>,
}

impl Patrolling {
    fn current_point(&self) -> Option<Vec3> {
        self.points.get(self.index).copied()
    }

    pub fn is_stationary(&self) -> bool {
        self.stationary
    }
}

impl StateBehavior<Enemy> for Patrolling {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        self.points = cx
            .body
            .patrol_points
            .iter()
            .copied()
            .filter(|p| cx.navigation.sample_position(*p, PATROL_SAMPLE_DISTANCE).is_some())
            .collect();
        self.index %= self.points.len().max(1);
        self.stationary = match self.points.as_slice() {
            [] => true,
            [only] => flat_distance(*only, cx.body.position) <= POST_DISTANCE,
            _ => false,
        };

        if self.stationary {
            cx.stop_moving();
            return;
        }

        let stats = cx.body.stats();
        let speed = stats.patrolling_speed * stats.patrolling_multiplier;
        cx.agent.set_speed(speed);
        cx.agent.set_stopping_distance(0.0);
        if let Some(point) = self.current_point() {
            cx.move_to(point);
        }
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal, _dt: f32) {
        cx.update_anim_speed(1.0);
        if self.stationary {
            return;
        }

        if self.idle.is_some() {
            if cx.body.take_fired(&mut self.idle) {
                if let Some(point) = self.current_point() {
                    cx.move_to(point);
                }
            }
            return;
        }

        let Some(point) = self.current_point() else {
            return;
        };
        if flat_distance(cx.body.position, point) > cx.tuning.waypoint_tolerance {
            return;
        }

        if self.points.len() == 1 {
            self.stationary = true;
            cx.stop_moving();
            return;
        }

        self.index = (self.index + 1) % self.points.len();
        let idle = cx.body.stats().patrolling_idle_duration;
        if idle > 0.0 {
            cx.stop_moving();
            self.idle = Some(cx.body.schedule_state(idle));
        } else if let Some(next) = self.current_point() {
            cx.move_to(next);
        }
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        cx.body.cancel_timer(&mut self.idle);
        cx.stop_moving();
    }
}

/// Closes in on the target, keeping the preferred distance.
#[derive(Debug, Default)]
pub struct Following {
    last_target: Option<Vec3>,
}

impl StateBehavior<Enemy> for Following {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        let preferred = cx.body.stats().preferred_distance;
        cx.agent.set_stopping_distance(preferred);
        cx.apply_movement_speed();

        let target = cx.target_position();
        cx.move_to(target);
        self.last_target = Some(target);
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal, _dt: f32) {
        cx.apply_movement_speed();

        let target = cx.target_position();
        let moved = self
            .last_target
            .map_or(true, |last| last.distance(target) > cx.tuning.follow_repath_threshold);
        if moved {
            cx.move_to(target);
            self.last_target = Some(target);
        }
        cx.update_anim_speed(1.0);
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        self.last_target = None;
        cx.stop_moving();
        cx.agent.set_stopping_distance(0.0);
    }
}

/// Runs to a random walkable point out of the target's attack reach.
#[derive(Debug, Default)]
pub struct Fleeing {
    point: Option<Vec3>,
}

impl Fleeing {
    /// Sample random points until one is walkable and far enough from the
    /// target. Falls back to the current position when none turns up.
    pub fn pick_point(cx: &mut EnemyCx<'_>) -> Vec3 {
        let origin = cx.body.position;
        let target = cx.target_position();
        let keep_away = cx.body.stats().attack_distance;
        let min_radius = cx.tuning.flee_min_radius;
        let max_radius = cx.tuning.flee_max_radius.max(min_radius);

        for _ in 0..cx.tuning.flee_max_attempts {
            let angle = cx.rng.gen_range(0.0..TAU);
            let radius = cx.rng.gen_range(min_radius..=max_radius);
            let candidate = origin + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;

            if let Some(point) = cx.navigation.sample_position(candidate, FLEE_SAMPLE_DISTANCE) {
                if flat_distance(point, target) > keep_away {
                    return point;
                }
            }
        }

        debug!(
            "{} found no flee point after {} attempts, holding position",
            cx.body.id, cx.tuning.flee_max_attempts
        );
        origin
    }

    fn repick(&mut self, cx: &mut EnemyCx<'_>) {
        let point = Self::pick_point(cx);
        cx.move_to(point);
        self.point = Some(point);
    }
}

impl StateBehavior<Enemy> for Fleeing {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        cx.agent.set_stopping_distance(0.0);
        cx.apply_movement_speed();
        self.repick(cx);
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal, _dt: f32) {
        cx.apply_movement_speed();
        let Some(point) = self.point else {
            self.repick(cx);
            return;
        };

        let arrived = flat_distance(cx.body.position, point) <= cx.tuning.flee_arrive_distance;
        let caught_up = flat_distance(cx.target_position(), point) < cx.body.stats().flee_distance;
        if arrived || caught_up {
            self.repick(cx);
        }
        cx.update_anim_speed(1.0);
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        self.point = None;
        cx.stop_moving();
    }
}

/// Stand, face the target and play one attack.
#[derive(Debug, Default)]
pub struct Attacking {
    finished: Option<Subscription>,
}

impl StateBehavior<Enemy> for Attacking {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        self.finished = Some(cx.body.channels.attack_finished.subscribe());
        cx.stop_moving();
        cx.attack();
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, signal: &mut FinishSignal, dt: f32) {
        cx.turn_toward_target(dt);
        if cx.body.channels.attack_finished.poll_slot(&self.finished) {
            signal.invoke();
        }
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        cx.body.channels.attack_finished.unsubscribe_slot(&mut self.finished);
    }
}

/// Stand still, aim for the archetype's aim duration, fire once, then wait
/// for the attack or reload to finish.
#[derive(Debug, Default)]
pub struct AimAndAttack {
    aim: Option<TimerHandle>,
    aiming: bool,
    attack_finished: Option<Subscription>,
    reload_finished: Option<Subscription>,
}

impl AimAndAttack {
    fn set_aiming(&mut self, cx: &mut EnemyCx<'_>, aiming: bool) {
        if self.aiming != aiming {
            self.aiming = aiming;
            cx.effects.emit(CombatCue::AimChanged {
                enemy: cx.body.id,
                aiming,
            });
        }
    }
}

impl StateBehavior<Enemy> for AimAndAttack {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        cx.stop_moving();
        let duration = cx.body.stats().aim_duration;
        self.aim = Some(cx.body.schedule_state(duration));
        self.set_aiming(cx, true);
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, signal: &mut FinishSignal, dt: f32) {
        if self.aiming {
            cx.face_target(dt * AIM_TURN_RATE);
            if !cx.body.take_fired(&mut self.aim) {
                return;
            }

            self.set_aiming(cx, false);
            if cx.body.archetype.profile.reloads() {
                self.reload_finished = Some(cx.body.channels.reload_finished.subscribe());
            } else {
                self.attack_finished = Some(cx.body.channels.attack_finished.subscribe());
            }
            cx.attack();
            return;
        }

        let channels = &mut cx.body.channels;
        if channels.attack_finished.poll_slot(&self.attack_finished)
            || channels.reload_finished.poll_slot(&self.reload_finished)
        {
            signal.invoke();
        }
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        cx.body.cancel_timer(&mut self.aim);
        cx.body.channels.attack_finished.unsubscribe_slot(&mut self.attack_finished);
        cx.body.channels.reload_finished.unsubscribe_slot(&mut self.reload_finished);
        self.set_aiming(cx, false);
    }
}
