//! State sets for every archetype and the machines wired from them.

mod boss_sniper;
mod common;
mod melee;

pub use boss_sniper::{Aiming, ChangingPosition, Shooting};
pub use common::{AimAndAttack, Attacking, Fleeing, Following, Patrolling};
pub use melee::MeleeChase;

use super::context::{Enemy, EnemyCx};
use super::profiles::AttackProfile;
use crate::fsm::TransitionKind::{self, Always, OnFinish};
use crate::fsm::{FsmError, StateMachine, Transition};

/// States of the regular archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonState {
    Patrolling,
    Following,
    Fleeing,
    Attacking,
    AimAndAttack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossSniperState {
    ChangingPosition,
    Aiming,
    Shooting,
}

type CommonMachine = StateMachine<CommonState, Enemy>;
type BossMachine = StateMachine<BossSniperState, Enemy>;

fn when(
    kind: TransitionKind,
    target: CommonState,
    condition: fn(&EnemyCx<'_>) -> bool,
) -> Transition<CommonState, Enemy> {
    Transition::new(kind, &[target], move |cx: &mut EnemyCx<'_>| {
        condition(cx).then_some(target)
    })
}

fn can_shoot(cx: &EnemyCx<'_>) -> bool {
    cx.is_target_in_attack_range() && cx.is_target_in_sight()
}

fn lost_target(cx: &EnemyCx<'_>) -> bool {
    !cx.is_target_in_vision_range()
}

/// Melee: patrol until the target is seen, then chase and swing.
fn melee_machine() -> Result<CommonMachine, FsmError> {
    StateMachine::builder()
        .state(
            CommonState::Patrolling,
            common::Patrolling::default(),
            vec![when(Always, CommonState::Attacking, |cx| cx.is_target_in_vision_range())],
        )
        .state(
            CommonState::Attacking,
            MeleeChase::default(),
            vec![when(Always, CommonState::Patrolling, lost_target)],
        )
        .build()
}

/// Shotgun: close in, fire a burst, close in again.
fn shotgun_machine() -> Result<CommonMachine, FsmError> {
    StateMachine::builder()
        .state(
            CommonState::Patrolling,
            common::Patrolling::default(),
            vec![when(Always, CommonState::Following, |cx| cx.is_target_in_vision_range())],
        )
        .state(
            CommonState::Following,
            common::Following::default(),
            vec![
                when(Always, CommonState::Attacking, can_shoot),
                when(Always, CommonState::Patrolling, lost_target),
            ],
        )
        .state(
            CommonState::Attacking,
            common::Attacking::default(),
            vec![Transition::on_finish(CommonState::Following)],
        )
        .build()
}

/// Sniper: close in, aim and fire, flee when the target gets too close.
fn sniper_machine() -> Result<CommonMachine, FsmError> {
    StateMachine::builder()
        .state(
            CommonState::Patrolling,
            common::Patrolling::default(),
            vec![when(Always, CommonState::Following, |cx| cx.is_target_in_vision_range())],
        )
        .state(
            CommonState::Following,
            common::Following::default(),
            vec![
                when(Always, CommonState::AimAndAttack, can_shoot),
                when(Always, CommonState::Patrolling, lost_target),
            ],
        )
        .state(
            CommonState::AimAndAttack,
            common::AimAndAttack::default(),
            vec![Transition::new(
                OnFinish,
                &[CommonState::Fleeing, CommonState::Following],
                |cx: &mut EnemyCx<'_>| {
                    if cx.is_target_in_flee_range() {
                        Some(CommonState::Fleeing)
                    } else {
                        Some(CommonState::Following)
                    }
                },
            )],
        )
        .state(
            CommonState::Fleeing,
            common::Fleeing::default(),
            vec![
                when(Always, CommonState::AimAndAttack, |cx| {
                    !cx.is_target_in_flee_range() && can_shoot(cx)
                }),
                when(Always, CommonState::Following, |cx| {
                    cx.distance_to_target() > cx.body.stats().attack_distance
                }),
            ],
        )
        .build()
}

/// Turret: hold the post, aim and fire whenever the target is in the open.
fn stationary_machine() -> Result<CommonMachine, FsmError> {
    StateMachine::builder()
        .state(
            CommonState::Patrolling,
            common::Patrolling::default(),
            vec![when(Always, CommonState::AimAndAttack, can_shoot)],
        )
        .state(
            CommonState::AimAndAttack,
            common::AimAndAttack::default(),
            vec![Transition::on_finish(CommonState::Patrolling)],
        )
        .build()
}

/// Boss: reposition, aim, shoot, and only every second shot reposition again.
fn boss_sniper_machine() -> Result<BossMachine, FsmError> {
    StateMachine::builder()
        .state(
            BossSniperState::ChangingPosition,
            boss_sniper::ChangingPosition::default(),
            vec![Transition::on_finish(BossSniperState::Aiming)],
        )
        .state(
            BossSniperState::Aiming,
            boss_sniper::Aiming::default(),
            vec![Transition::on_finish(BossSniperState::Shooting)],
        )
        .state(
            BossSniperState::Shooting,
            boss_sniper::Shooting::default(),
            vec![Transition::new(
                OnFinish,
                &[BossSniperState::Aiming, BossSniperState::ChangingPosition],
                |cx: &mut EnemyCx<'_>| {
                    cx.body.shoot_count += 1;
                    if cx.body.shoot_count % 2 == 1 {
                        Some(BossSniperState::Aiming)
                    } else {
                        cx.body.shoot_count = 0;
                        Some(BossSniperState::ChangingPosition)
                    }
                },
            )],
        )
        .build()
}

/// The state machine driving one enemy.
pub enum Brain {
    Common(CommonMachine),
    BossSniper(BossMachine),
}

impl Brain {
    /// Wire the machine matching an attack profile.
    pub fn for_profile(profile: &AttackProfile) -> Result<Self, FsmError> {
        let brain = match profile {
            AttackProfile::Melee { .. } => Brain::Common(melee_machine()?),
            AttackProfile::Shotgun { .. } => Brain::Common(shotgun_machine()?),
            AttackProfile::Sniper { .. } => Brain::Common(sniper_machine()?),
            AttackProfile::StationaryAimed { .. } => Brain::Common(stationary_machine()?),
            AttackProfile::BossSniper { .. } => Brain::BossSniper(boss_sniper_machine()?),
        };
        Ok(brain)
    }

    pub fn start(&mut self, cx: &mut EnemyCx<'_>) -> Result<(), FsmError> {
        match self {
            Brain::Common(machine) => machine.start(CommonState::Patrolling, cx),
            Brain::BossSniper(machine) => machine.start(BossSniperState::ChangingPosition, cx),
        }
    }

    pub fn stop(&mut self, cx: &mut EnemyCx<'_>) {
        match self {
            Brain::Common(machine) => machine.stop(cx),
            Brain::BossSniper(machine) => machine.stop(cx),
        }
    }

    pub fn tick(&mut self, cx: &mut EnemyCx<'_>, dt: f32) {
        match self {
            Brain::Common(machine) => {
                machine.tick(cx, dt);
            }
            Brain::BossSniper(machine) => {
                machine.tick(cx, dt);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        match self {
            Brain::Common(machine) => machine.is_running(),
            Brain::BossSniper(machine) => machine.is_running(),
        }
    }

    pub fn common_state(&self) -> Option<CommonState> {
        match self {
            Brain::Common(machine) => machine.active_state(),
            Brain::BossSniper(_) => None,
        }
    }

    pub fn boss_state(&self) -> Option<BossSniperState> {
        match self {
            Brain::BossSniper(machine) => machine.active_state(),
            Brain::Common(_) => None,
        }
    }
}
