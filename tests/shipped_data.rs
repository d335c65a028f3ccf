use std::collections::HashMap;
use std::path::Path;

use squad_shooter::core::{CombatTuning, COMBAT_TUNING_PATH};
use squad_shooter::enemies::{EnemyCatalog, EnemyManager, SpawnRequest, ENEMIES_DIR};
use squad_shooter::world::{
    load_ron_dir, validate_level, LevelDefinition, RoomDefinition, RoomRegistry, LEVELS_DIR, ROOMS_DIR,
};

fn rooms() -> RoomRegistry {
    RoomRegistry {
        rooms: load_ron_dir::<RoomDefinition>(Path::new(ROOMS_DIR))
            .into_iter()
            .collect::<HashMap<_, _>>(),
    }
}

#[test]
fn tuning_file_parses() {
    assert!(CombatTuning::load_or_default(COMBAT_TUNING_PATH).is_ok());
}

#[test]
fn every_level_references_known_rooms() {
    let rooms = rooms();
    let levels = load_ron_dir::<LevelDefinition>(Path::new(LEVELS_DIR));

    assert!(!levels.is_empty());
    for (_, level) in &levels {
        validate_level(level, &rooms).unwrap();
    }
}

#[test]
fn every_room_spawns_its_enemies() {
    let catalog = EnemyCatalog::load_dir(Path::new(ENEMIES_DIR));
    let rooms = rooms();
    assert!(!catalog.is_empty());
    assert!(!rooms.rooms.is_empty());

    for room in rooms.rooms.values() {
        let mut manager = EnemyManager::new(0);
        for spawn in &room.enemies {
            let request = SpawnRequest::new(spawn.archetype.clone(), spawn.position())
                .with_rotation(spawn.rotation())
                .elite(spawn.elite)
                .with_patrol_points(spawn.patrol_points());
            if let Err(error) = manager.spawn_enemy(&catalog, request) {
                panic!("room '{}': {}", room.name, error);
            }
        }
        assert_eq!(manager.len(), room.enemies.len());
    }
}
