//! What a state sees while it runs.

use rand::rngs::StdRng;

use super::body::EnemyBody;
use super::projectiles::Projectile;
use crate::core::CombatTuning;
use crate::fsm::Controlled;
use crate::world::{EffectsSink, NavigationAgent, NavigationArea, PhysicsQuery, PlayerTarget, RoomEvents};

/// Marker type that plugs enemies into the state machine framework.
pub struct Enemy;

impl Controlled for Enemy {
    type Context<'a> = EnemyCx<'a>;
}

/// One enemy plus the services it may use, borrowed for a single call.
pub struct EnemyCx<'a> {
    pub body: &'a mut EnemyBody,
    /// The enemy's own navigation handle.
    pub agent: &'a mut dyn NavigationAgent,
    pub player: &'a mut dyn PlayerTarget,
    pub physics: &'a dyn PhysicsQuery,
    pub navigation: &'a dyn NavigationArea,
    pub effects: &'a mut dyn EffectsSink,
    pub room: &'a mut dyn RoomEvents,
    /// Projectiles fired during this call, adopted by the manager afterwards.
    pub projectiles: &'a mut Vec<Projectile>,
    pub rng: &'a mut StdRng,
    pub tuning: &'a CombatTuning,
}
