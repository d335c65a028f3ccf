//! Room and level data structures and RON loading.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::load_ron;
use crate::rewards::{ChestKind, ChestSlot, DropData};

use super::error::DataLoadError;
use super::geometry::{Obstacle, RoomGeometry};

pub const ROOMS_DIR: &str = "assets/data/rooms";
pub const LEVELS_DIR: &str = "assets/data/levels";

fn vec3((x, y, z): (f32, f32, f32)) -> Vec3 {
    Vec3::new(x, y, z)
}

fn default_wall_height() -> f32 {
    3.0
}

fn default_heal_drop_chance() -> f32 {
    0.0
}

fn default_chest_inited() -> bool {
    true
}

/// A blocking box inside a room.
#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleDef {
    pub center: (f32, f32, f32),
    pub size: (f32, f32, f32),
}

/// An enemy placed in a room.
#[derive(Debug, Clone, Deserialize)]
pub struct EnemySpawnDef {
    /// Archetype identifier (matches the enemy file name).
    pub archetype: String,
    pub position: (f32, f32, f32),
    /// Initial facing around the Y axis, in degrees.
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub elite: bool,
    #[serde(default)]
    pub patrol_points: Vec<(f32, f32, f32)>,
}

impl EnemySpawnDef {
    pub fn position(&self) -> Vec3 {
        vec3(self.position)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.to_radians())
    }

    pub fn patrol_points(&self) -> Vec<Vec3> {
        self.patrol_points.iter().copied().map(vec3).collect()
    }
}

/// A chest slot in a room.
#[derive(Debug, Clone, Deserialize)]
pub struct ChestDef {
    pub kind: ChestKind,
    pub position: (f32, f32, f32),
    /// Slots that are not inited are placeholders and never spawn.
    #[serde(default = "default_chest_inited")]
    pub inited: bool,
}

/// One combat room, read from `assets/data/rooms/<name>.ron`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomDefinition {
    pub name: String,
    /// Walkable area on the ground plane as `((min_x, min_z), (max_x, max_z))`.
    pub bounds: ((f32, f32), (f32, f32)),
    #[serde(default = "default_wall_height")]
    pub wall_height: f32,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    pub player_start: (f32, f32, f32),
    pub exit_point: (f32, f32, f32),
    #[serde(default)]
    pub enemies: Vec<EnemySpawnDef>,
    #[serde(default)]
    pub chests: Vec<ChestDef>,
    /// Chance for every enemy in the room to drop an extra heal.
    #[serde(default = "default_heal_drop_chance")]
    pub heal_drop_chance: f32,
}

impl RoomDefinition {
    pub fn player_start(&self) -> Vec3 {
        vec3(self.player_start)
    }

    pub fn exit_point(&self) -> Vec3 {
        vec3(self.exit_point)
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Obstacle> + '_ {
        self.obstacles
            .iter()
            .map(|o| Obstacle::new(vec3(o.center), vec3(o.size)))
    }

    /// Headless collision layout of the room, outer walls included.
    pub fn geometry(&self) -> RoomGeometry {
        let ((min_x, min_z), (max_x, max_z)) = self.bounds;
        self.obstacles().fold(
            RoomGeometry::new(Vec2::new(min_x, min_z), Vec2::new(max_x, max_z), self.wall_height),
            RoomGeometry::with_obstacle,
        )
    }

    /// Chest slots in declaration order, as used by reward distribution.
    pub fn chest_slots(&self) -> Vec<ChestSlot> {
        self.chests
            .iter()
            .map(|c| ChestSlot {
                kind: c.kind,
                inited: c.inited,
            })
            .collect()
    }

    /// Chests that will actually be placed.
    pub fn inited_chests(&self) -> impl Iterator<Item = &ChestDef> {
        self.chests.iter().filter(|c| c.inited)
    }

    fn validate(&self, path: &Path) -> Result<(), DataLoadError> {
        let ((min_x, min_z), (max_x, max_z)) = self.bounds;
        if min_x >= max_x || min_z >= max_z {
            return Err(DataLoadError::InvalidData {
                path: path.display().to_string(),
                details: format!("room '{}' has empty bounds", self.name),
            });
        }
        if !(0.0..=1.0).contains(&self.heal_drop_chance) {
            return Err(DataLoadError::InvalidData {
                path: path.display().to_string(),
                details: format!("heal drop chance {} outside 0..=1", self.heal_drop_chance),
            });
        }
        Ok(())
    }
}

/// A level: an ordered list of rooms plus the level's reward list.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelDefinition {
    pub name: String,
    /// Room names, in play order.
    pub rooms: Vec<String>,
    #[serde(default)]
    pub drops: Vec<DropData>,
}

/// Resource holding every loaded room.
#[derive(Resource, Default, Debug)]
pub struct RoomRegistry {
    pub rooms: HashMap<String, RoomDefinition>,
}

impl RoomRegistry {
    pub fn get(&self, name: &str) -> Option<&RoomDefinition> {
        self.rooms.get(name)
    }
}

/// Resource holding every loaded level.
#[derive(Resource, Default, Debug)]
pub struct LevelRegistry {
    pub levels: HashMap<String, LevelDefinition>,
}

impl LevelRegistry {
    pub fn get(&self, name: &str) -> Option<&LevelDefinition> {
        self.levels.get(name)
    }
}

/// The level being played and the room the player is in.
#[derive(Resource, Debug, Clone)]
pub struct CurrentLevel {
    pub name: String,
    pub room_index: usize,
}

impl Default for CurrentLevel {
    fn default() -> Self {
        Self {
            name: "level1".to_string(),
            room_index: 0,
        }
    }
}

/// Parse every `.ron` file in `dir`, keyed by file stem.
///
/// Broken files are logged and skipped so one bad file does not take the
/// rest of the content down with it.
pub fn load_ron_dir<T: DeserializeOwned>(dir: &Path) -> Vec<(String, T)> {
    let mut loaded = Vec::new();

    if !dir.exists() {
        warn!("Data directory not found: {:?}", dir);
        return loaded;
    }

    let Ok(entries) = fs::read_dir(dir) else {
        warn!("Failed to read data directory {:?}", dir);
        return loaded;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "ron") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        match load_ron::<T>(&path) {
            Ok(value) => loaded.push((stem.to_string(), value)),
            Err(e) => error!("{}", e),
        }
    }

    loaded
}

/// Check a level against the rooms it references.
pub fn validate_level(level: &LevelDefinition, rooms: &RoomRegistry) -> Result<(), DataLoadError> {
    if level.rooms.is_empty() {
        return Err(DataLoadError::InvalidData {
            path: level.name.clone(),
            details: "level has no rooms".to_string(),
        });
    }

    match level.rooms.iter().find(|name| rooms.get(name).is_none()) {
        Some(missing) => Err(DataLoadError::InvalidData {
            path: level.name.clone(),
            details: format!("unknown room '{}'", missing),
        }),
        None => Ok(()),
    }
}

/// Startup system: load rooms and levels into their registries.
pub fn load_world_data(mut commands: Commands) {
    let mut rooms = RoomRegistry::default();
    for (name, room) in load_ron_dir::<RoomDefinition>(Path::new(ROOMS_DIR)) {
        let path = Path::new(ROOMS_DIR).join(format!("{name}.ron"));
        match room.validate(&path) {
            Ok(()) => {
                info!("Loaded room: {} ({} enemies)", name, room.enemies.len());
                rooms.rooms.insert(name, room);
            }
            Err(e) => error!("{}", e),
        }
    }

    let mut levels = LevelRegistry::default();
    for (name, level) in load_ron_dir::<LevelDefinition>(Path::new(LEVELS_DIR)) {
        match validate_level(&level, &rooms) {
            Ok(()) => {
                info!("Loaded level: {} ({} rooms)", name, level.rooms.len());
                levels.levels.insert(name, level);
            }
            Err(e) => error!("{}", e),
        }
    }

    info!("Loaded {} room(s), {} level(s)", rooms.rooms.len(), levels.levels.len());
    commands.insert_resource(rooms);
    commands.insert_resource(levels);
    commands.insert_resource(CurrentLevel::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = r#"(
        name: "arena",
        bounds: ((-10.0, -10.0), (10.0, 10.0)),
        obstacles: [(center: (0.0, 1.0, 4.0), size: (2.0, 2.0, 2.0))],
        player_start: (0.0, 0.0, -8.0),
        exit_point: (0.0, 0.0, 9.0),
        enemies: [
            (archetype: "melee", position: (3.0, 0.0, 3.0), patrol_points: [(3.0, 0.0, 3.0), (6.0, 0.0, 3.0)]),
            (archetype: "shotgunner", position: (-3.0, 0.0, 5.0), elite: true, yaw: 90.0),
        ],
        chests: [(kind: Standard, position: (8.0, 0.0, 8.0)), (kind: Rewarded, position: (-8.0, 0.0, 8.0), inited: false)],
        heal_drop_chance: 0.25,
    )"#;

    #[test]
    fn room_file_parses_with_defaults() {
        let room: RoomDefinition = ron::from_str(ROOM).unwrap();

        assert_eq!(room.wall_height, 3.0);
        assert_eq!(room.enemies.len(), 2);
        assert!(room.enemies[1].elite);
        assert_eq!(room.enemies[0].patrol_points().len(), 2);
        assert_eq!(room.inited_chests().count(), 1);
    }

    #[test]
    fn room_geometry_includes_walls_and_obstacles() {
        let room: RoomDefinition = ron::from_str(ROOM).unwrap();
        let geometry = room.geometry();

        assert_eq!(geometry.obstacles.len(), 5);
    }

    #[test]
    fn level_with_unknown_room_is_rejected() {
        let mut rooms = RoomRegistry::default();
        rooms
            .rooms
            .insert("arena".to_string(), ron::from_str(ROOM).unwrap());

        let good = LevelDefinition {
            name: "one".to_string(),
            rooms: vec!["arena".to_string()],
            drops: Vec::new(),
        };
        let bad = LevelDefinition {
            rooms: vec!["arena".to_string(), "vault".to_string()],
            ..good.clone()
        };

        assert!(validate_level(&good, &rooms).is_ok());
        assert!(matches!(
            validate_level(&bad, &rooms),
            Err(DataLoadError::InvalidData { .. })
        ));
    }
}
