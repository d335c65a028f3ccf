//! World module - room data, the services enemies see, and the room lifecycle.

mod data;
mod effects;
mod error;
mod geometry;
mod navigation;
mod plugin;
mod rapier;
mod services;

pub use data::{
    load_ron_dir, load_world_data, ChestDef, CurrentLevel, EnemySpawnDef, LevelDefinition, LevelRegistry,
    ObstacleDef, RoomDefinition, RoomRegistry, validate_level, LEVELS_DIR, ROOMS_DIR,
};
pub use effects::{AimPhase, CombatCue, CueBuffer, ImpactSurface, SoundCue};
pub use error::DataLoadError;
pub use geometry::{spawn_obstacle, Obstacle, RoomEntity, RoomGeometry};
pub use navigation::SteeringAgent;
pub use plugin::{current_room, setup_level, RoomBuilder, RoomExit, RoomProgress, WorldPlugin};
pub use rapier::RapierQuery;
pub use services::*;
