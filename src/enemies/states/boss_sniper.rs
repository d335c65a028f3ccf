//! Sniper boss: reposition, aim a reflecting laser, fire along it.

use bevy::math::Vec3;

use crate::core::TimerHandle;
use crate::enemies::channels::Subscription;
use crate::enemies::context::{Enemy, EnemyCx};
use crate::enemies::laser::compute_laser_path;
use crate::enemies::motion::flat_distance;
use crate::enemies::profiles::AttackProfile;
use crate::fsm::{FinishSignal, StateBehavior};
use crate::world::{AimPhase, CombatCue};

const ARRIVE_DISTANCE: f32 = 1.0;
/// Fraction of the remaining turn applied per second while tracking.
const TRACK_TURN_RATE: f32 = 5.0;

/// Aim settings pulled from the archetype's profile.
#[derive(Debug, Clone, Copy)]
struct AimSettings {
    yellow: f32,
    red: f32,
    aim_during_red: bool,
    segments: usize,
    laser_delay: f32,
}

impl AimSettings {
    fn of(profile: &AttackProfile) -> Self {
        match *profile {
            AttackProfile::BossSniper {
                yellow_duration,
                red_duration,
                aim_during_red,
                laser_segments,
                laser_delay,
                ..
            } => Self {
                yellow: yellow_duration,
                red: red_duration,
                aim_during_red,
                segments: laser_segments,
                laser_delay,
            },
            _ => Self {
                yellow: 1.0,
                red: 0.5,
                aim_during_red: false,
                segments: 1,
                laser_delay: 0.0,
            },
        }
    }
}

/// Walk to the next patrol point, cycling through them.
#[derive(Debug, Default)]
pub struct ChangingPosition {
    index: Option<usize>,
    point: Option<Vec3>,
}

impl StateBehavior<Enemy> for ChangingPosition {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, signal: &mut FinishSignal) {
        let count = cx.body.patrol_points.len();
        if count == 0 {
            self.point = None;
            signal.invoke();
            return;
        }

        let next = self.index.map_or(0, |i| (i + 1) % count);
        self.index = Some(next);
        let point = cx.body.patrol_points[next];
        self.point = Some(point);

        cx.agent.set_stopping_distance(0.0);
        cx.apply_movement_speed();
        cx.move_to(point);
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, signal: &mut FinishSignal, _dt: f32) {
        cx.update_anim_speed(1.0);
        let arrived = self
            .point
            .map_or(true, |p| flat_distance(cx.body.position, p) <= ARRIVE_DISTANCE);
        if arrived && cx.player.is_alive() {
            signal.invoke();
        }
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        cx.stop_moving();
    }
}

/// Two timed laser phases, yellow then red.
#[derive(Debug, Default)]
pub struct Aiming {
    phase: Option<AimPhase>,
    yellow: Option<TimerHandle>,
    red: Option<TimerHandle>,
    reveal: Option<TimerHandle>,
    laser_visible: bool,
    done: bool,
}

impl Aiming {
    pub fn phase(&self) -> Option<AimPhase> {
        self.phase
    }
}

impl StateBehavior<Enemy> for Aiming {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        let settings = AimSettings::of(&cx.body.archetype.profile);
        cx.stop_moving();
        cx.body.laser_path.clear();

        self.phase = Some(AimPhase::Yellow);
        self.laser_visible = false;
        self.done = false;
        self.yellow = Some(cx.body.schedule_state(settings.yellow));
        self.reveal = Some(cx.body.schedule_state(settings.laser_delay));
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, signal: &mut FinishSignal, dt: f32) {
        let settings = AimSettings::of(&cx.body.archetype.profile);

        if cx.body.take_fired(&mut self.yellow) {
            self.phase = Some(AimPhase::Red);
            self.red = Some(cx.body.schedule_state(settings.red));
        }
        if cx.body.take_fired(&mut self.red) {
            self.done = true;
        }
        if cx.body.take_fired(&mut self.reveal) {
            self.laser_visible = true;
        }

        let Some(phase) = self.phase else {
            return;
        };
        if phase == AimPhase::Yellow || settings.aim_during_red {
            cx.face_target(dt * TRACK_TURN_RATE);
        }

        let path = compute_laser_path(cx.physics, cx.body.muzzle(), cx.body.forward(), settings.segments);
        cx.body.laser_path.clone_from(&path);
        if self.laser_visible {
            cx.effects.emit(CombatCue::LaserAimed {
                enemy: cx.body.id,
                path,
                phase,
            });
        }

        if self.done && cx.player.is_alive() {
            signal.invoke();
        }
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        cx.body.cancel_timer(&mut self.yellow);
        cx.body.cancel_timer(&mut self.red);
        cx.body.cancel_timer(&mut self.reveal);
        self.phase = None;
        if self.laser_visible {
            self.laser_visible = false;
            cx.effects.emit(CombatCue::LaserHidden { enemy: cx.body.id });
        }
    }
}

/// Fire the tracking bullet along the locked laser.
#[derive(Debug, Default)]
pub struct Shooting {
    finished: Option<Subscription>,
}

impl StateBehavior<Enemy> for Shooting {
    fn on_start(&mut self, cx: &mut EnemyCx<'_>, _signal: &mut FinishSignal) {
        self.finished = Some(cx.body.channels.attack_finished.subscribe());
        cx.attack();
    }

    fn on_update(&mut self, cx: &mut EnemyCx<'_>, signal: &mut FinishSignal, _dt: f32) {
        if cx.body.channels.attack_finished.poll_slot(&self.finished) {
            signal.invoke();
        }
    }

    fn on_end(&mut self, cx: &mut EnemyCx<'_>) {
        cx.body.channels.attack_finished.unsubscribe_slot(&mut self.finished);
    }
}
