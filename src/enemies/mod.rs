//! Enemies module - archetypes, the per-enemy brain, attacks and the manager.
//!
//! Everything except [`EnemyPlugin`] is plain data ticked by
//! [`EnemyManager::tick`], so the whole simulation runs headless in tests.

pub mod animation;
mod body;
pub mod channels;
mod components;
mod context;
pub mod data;
mod entity;
mod error;
pub mod laser;
mod manager;
pub mod motion;
mod plugin;
pub mod profiles;
pub mod projectiles;
pub mod states;

pub use animation::{AttackCallback, AttackTimeline};
pub use body::{BodyTimer, EnemyBody};
pub use channels::{Channel, EnemyChannels, Subscription};
pub use components::*;
pub use context::{Enemy, EnemyCx};
pub use data::{load_enemy_catalog, ArchetypeDefinition, CombatStats, CountRange, EnemyCatalog, Span, ENEMIES_DIR};
pub use entity::{CombatEntity, DamageOutcome};
pub use error::SpawnError;
pub use laser::{compute_laser_path, LASER_RANGE};
pub use manager::{EnemyManager, SpawnRequest};
pub use motion::look_rotation;
pub use plugin::EnemyPlugin;
pub use profiles::AttackProfile;
pub use projectiles::{Projectile, ProjectileKind, ProjectileStatus};
pub use states::{BossSniperState, CommonState};
