//! The enemy unit: body, navigation handle and brain ticked together.

use bevy::log::{error, info};
use bevy::math::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

use super::animation::AttackCallback;
use super::body::{BodyTimer, EnemyBody};
use super::context::EnemyCx;
use super::motion::look_rotation;
use super::projectiles::Projectile;
use super::states::{BossSniperState, Brain, CommonState};
use crate::core::CombatTuning;
use crate::fsm::FsmError;
use crate::rewards::{plan_pickups, DropData, DropKind};
use crate::world::{CombatCue, NavigationAgent, Services, SoundCue};

/// Max sideways jitter of floating damage numbers.
const TEXT_JITTER: f32 = 0.3;

/// What a call to [`CombatEntity::take_damage`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Non-positive amount, dead target or unknown target.
    Ignored,
    Damaged,
    Killed,
}

/// State owned by the manager and lent to entities for one call.
#[derive(Debug)]
pub struct SimShared {
    pub rng: StdRng,
    pub tuning: CombatTuning,
    /// Bullets fired during the call, adopted by the manager afterwards.
    pub fired: Vec<Projectile>,
}

fn context<'s>(
    body: &'s mut EnemyBody,
    agent: &'s mut dyn NavigationAgent,
    services: &'s mut Services<'_>,
    shared: &'s mut SimShared,
) -> EnemyCx<'s> {
    EnemyCx {
        body,
        agent,
        player: &mut *services.player,
        physics: services.physics,
        navigation: services.navigation,
        effects: &mut *services.effects,
        room: &mut *services.room,
        projectiles: &mut shared.fired,
        rng: &mut shared.rng,
        tuning: &shared.tuning,
    }
}

pub struct CombatEntity {
    pub body: EnemyBody,
    agent: Box<dyn NavigationAgent + Send + Sync>,
    brain: Brain,
}

impl CombatEntity {
    pub fn new(body: EnemyBody, agent: Box<dyn NavigationAgent + Send + Sync>, brain: Brain) -> Self {
        Self { body, agent, brain }
    }

    pub fn agent(&self) -> &dyn NavigationAgent {
        self.agent.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.brain.is_running()
    }

    pub fn common_state(&self) -> Option<CommonState> {
        self.brain.common_state()
    }

    pub fn boss_state(&self) -> Option<BossSniperState> {
        self.brain.boss_state()
    }

    /// Bind the entity to the room and start its machine.
    pub fn initialise(&mut self, services: &mut Services<'_>, shared: &mut SimShared) -> Result<(), FsmError> {
        let mut cx = context(&mut self.body, self.agent.as_mut(), services, shared);
        let speed = cx.movement_speed();
        cx.agent.set_enabled(true);
        cx.agent.set_speed(speed);
        self.brain.start(&mut cx)
    }

    /// Advance timers, the state machine and movement by `dt`.
    pub fn tick(&mut self, dt: f32, services: &mut Services<'_>, shared: &mut SimShared) {
        let mut cx = context(&mut self.body, self.agent.as_mut(), services, shared);
        recover_hit_offset(&mut cx, dt);

        // State timers that fire during a stun stay visible until the brain runs again
        if !cx.body.stunned {
            cx.body.fired.clear();
        }
        for (handle, timer) in cx.body.timers.advance(dt) {
            match timer {
                BodyTimer::State => cx.body.fired.push(handle),
                BodyTimer::Attack(callback) => {
                    cx.body.attack_timers.retain(|h| *h != handle);
                    run_attack_callback(&mut cx, callback);
                }
                BodyTimer::StunOver => {
                    cx.body.stun_timer = None;
                    cx.body.stunned = false;
                    cx.body.channels.stunned.emit(false);
                }
                BodyTimer::RagdollCleanup => {
                    cx.body.ragdoll_timer = None;
                    cx.body.released = true;
                    cx.effects.emit(CombatCue::RagdollReleased { enemy: cx.body.id });
                }
                BodyTimer::Pickup(pickup) => cx.room.spawn_pickup(pickup),
            }
        }

        if cx.body.dead || cx.body.stunned {
            return;
        }

        self.brain.tick(&mut cx, dt);

        if cx.agent.is_enabled() {
            let before = cx.body.position;
            cx.body.position = cx.agent.advance(before, dt);
            let velocity = cx.agent.velocity();
            if velocity.length_squared() > f32::EPSILON {
                if let Some(rotation) = look_rotation(velocity) {
                    cx.body.rotation = rotation;
                }
            }
        }
    }

    /// Apply a hit from the player. See [`DamageOutcome`].
    pub fn take_damage(
        &mut self,
        amount: f32,
        point: Vec3,
        direction: Vec3,
        services: &mut Services<'_>,
        shared: &mut SimShared,
    ) -> DamageOutcome {
        if amount <= 0.0 || self.body.dead {
            return DamageOutcome::Ignored;
        }

        let mut cx = context(&mut self.body, self.agent.as_mut(), services, shared);
        let id = cx.body.id;
        let now = cx.body.now();

        let max = cx.body.max_health();
        cx.body.health = (cx.body.health - amount).clamp(0.0, max);
        let fraction = cx.body.health_fraction();
        cx.effects.emit(CombatCue::HealthChanged { enemy: id, fraction });
        cx.body.last_projectile_position = point - direction;

        if cx.body.last_flash_at.map_or(true, |t| now - t >= cx.tuning.hit_flash_cooldown) {
            cx.body.last_flash_at = Some(now);
            cx.effects.emit(CombatCue::HitFlash { enemy: id });
        }

        if cx.body.last_text_at.map_or(true, |t| now - t >= cx.tuning.floating_text_cooldown) {
            cx.body.last_text_at = Some(now);
            let jitter = Vec3::new(
                cx.rng.gen_range(-TEXT_JITTER..=TEXT_JITTER),
                0.0,
                cx.rng.gen_range(-TEXT_JITTER..=TEXT_JITTER),
            );
            let position = cx.body.position + Vec3::Y * cx.body.stats().hit_text_height + jitter;
            cx.effects.emit(CombatCue::FloatingText {
                enemy: id,
                text: format!("{amount:.0}"),
                position,
            });
        }

        if cx.body.health <= 0.0 {
            on_death(&mut cx, &mut self.brain);
            return DamageOutcome::Killed;
        }

        let away = cx.body.position - cx.target_position();
        let push = Vec3::new(away.x, 0.0, away.z).normalize_or_zero();
        cx.body.position += push * cx.tuning.knockback_step * cx.body.hit_offset_mult;
        cx.body.hit_offset_mult *= cx.tuning.knockback_decay;
        cx.body.last_damage_at = Some(now);

        cx.body.channels.taken_damage.emit(amount);
        cx.body.start_chasing();
        DamageOutcome::Damaged
    }

    /// Freeze the enemy for `duration` seconds. A new stun replaces the old one.
    pub fn stun(&mut self, duration: f32) {
        if self.body.dead {
            return;
        }
        self.body.timers.cancel_slot(&mut self.body.stun_timer);
        self.body.stun_timer = Some(self.body.timers.schedule(duration, BodyTimer::StunOver));
        self.body.stunned = true;
        self.body.channels.stunned.emit(true);
    }

    /// Room teardown: stop everything without killing the enemy.
    pub fn unload(&mut self, services: &mut Services<'_>, shared: &mut SimShared) {
        let mut cx = context(&mut self.body, self.agent.as_mut(), services, shared);
        self.brain.stop(&mut cx);
        cx.body.cancel_attack();
        cx.body.timers.cancel_slot(&mut cx.body.ragdoll_timer);
        cx.body.timers.cancel_slot(&mut cx.body.stun_timer);
        cx.agent.stop();
        cx.effects.emit(CombatCue::HealthBarDetached { enemy: cx.body.id });
    }
}

/// Let the knockback multiplier climb back once hits stop coming.
fn recover_hit_offset(cx: &mut EnemyCx<'_>, dt: f32) {
    if cx.body.hit_offset_mult >= 1.0 {
        return;
    }
    let now = cx.body.now();
    let quiet = cx
        .body
        .last_damage_at
        .map_or(true, |t| now - t > cx.tuning.knockback_recovery_delay);
    if quiet {
        cx.body.hit_offset_mult = (cx.body.hit_offset_mult + dt).min(1.0);
    }
}

fn run_attack_callback(cx: &mut EnemyCx<'_>, callback: AttackCallback) {
    match callback {
        AttackCallback::Hit => {
            let archetype = cx.body.archetype.clone();
            archetype.profile.resolve_hit(cx);
        }
        AttackCallback::HitFinish => {
            cx.body.channels.attack_finished.emit(());
        }
        AttackCallback::ReloadFinished => {
            cx.body.channels.reload_finished.emit(());
            cx.effects.emit(CombatCue::Reloaded { enemy: cx.body.id });
        }
    }
}

fn on_death(cx: &mut EnemyCx<'_>, brain: &mut Brain) {
    if cx.body.dead {
        return;
    }
    cx.body.dead = true;
    let id = cx.body.id;
    let position = cx.body.position;

    cx.agent.stop();
    cx.agent.set_enabled(false);
    cx.body.collider_enabled = false;
    cx.effects.emit(CombatCue::HealthBarDetached { enemy: id });

    brain.stop(cx);
    cx.body.cancel_attack();
    cx.body.timers.cancel_slot(&mut cx.body.stun_timer);
    cx.body.stunned = false;

    cx.effects.emit(CombatCue::RagdollActivated {
        enemy: id,
        impulse_point: cx.body.last_projectile_position,
        force: cx.tuning.death_explosion_force,
        radius: cx.tuning.death_explosion_radius,
    });
    let cleanup = cx
        .body
        .timers
        .schedule(cx.tuning.ragdoll_cleanup_delay, BodyTimer::RagdollCleanup);
    cx.body.ragdoll_timer = Some(cleanup);

    emit_drops(cx);

    cx.effects.emit(CombatCue::sound(SoundCue::EnemyScream, position));
    info!("{} ({}) died", id, cx.body.archetype.name);
    cx.room.on_enemy_killed(id, position);
}

/// Turn the drop list into pickups. Currency appears at once, everything
/// else is staggered through the scheduler.
fn emit_drops(cx: &mut EnemyCx<'_>) {
    let mut drops = std::mem::take(&mut cx.body.drops);
    let chance = cx.body.heal_drop_chance;
    if chance > 0.0 && cx.rng.gen::<f32>() <= chance {
        drops.push(DropData::new(DropKind::Heal, 1));
    }
    if drops.is_empty() {
        return;
    }

    let heal_amount = cx.body.stats().hp_for_player.random(cx.rng).round().max(0.0) as u32;
    let planned = plan_pickups(
        &drops,
        cx.body.position,
        cx.body.is_elite(),
        heal_amount,
        cx.tuning.drop_delay_step,
        cx.rng,
    );

    let mut coins = false;
    for entry in planned {
        coins |= entry.pickup.kind.is_currency();
        if entry.delay <= 0.0 {
            cx.room.spawn_pickup(entry.pickup);
        } else {
            cx.body.timers.schedule(entry.delay, BodyTimer::Pickup(entry.pickup));
        }
    }
    if coins {
        cx.effects
            .emit(CombatCue::sound(SoundCue::CoinAppear, cx.body.position));
    }
}

/// Fail-safe for wiring errors: log and keep the entity out of play.
pub(super) fn report_setup_error(body: &EnemyBody, error: &FsmError) {
    error!("{} ({}) failed to start: {}", body.id, body.archetype.name, error);
}
