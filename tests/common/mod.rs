#![allow(dead_code)]

use bevy::math::{Vec2, Vec3};
use squad_shooter::enemies::{ArchetypeDefinition, EnemyCatalog};
use squad_shooter::world::{CueBuffer, PlayerSnapshot, RoomGeometry, RoomLog, Services};

pub const MELEE: &str = r#"(
    name: "Brawler",
    stats: (
        hp: 100.0,
        move_speed: 4.0,
        patrolling_speed: 2.0,
        angular_speed: 720.0,
        preferred_distance: 1.0,
        attack_distance: 1.5,
        vision_range: 10.0,
        damage: (min: 10.0, max: 10.0),
        hp_for_player: (min: 12.0, max: 12.0),
    ),
    profile: Melee(hit_radius: 0.8, hit_reach: 1.0),
    timeline: (hit: 0.2, finish: 0.5),
)"#;

pub const SNIPER: &str = r#"(
    name: "Sniper",
    stats: (
        hp: 50.0,
        move_speed: 3.5,
        patrolling_speed: 1.5,
        angular_speed: 360.0,
        preferred_distance: 6.0,
        attack_distance: 10.0,
        vision_range: 12.0,
        aim_duration: 0.5,
        damage: (min: 20.0, max: 20.0),
        hp_for_player: (min: 10.0, max: 10.0),
    ),
    profile: Sniper(bullet_speed: 30.0),
    timeline: (hit: 0.1, finish: 0.3),
)"#;

pub const BOSS: &str = r#"(
    name: "Sniper Boss",
    tier: Boss,
    stats: (
        hp: 500.0,
        move_speed: 5.0,
        patrolling_speed: 5.0,
        angular_speed: 360.0,
        preferred_distance: 0.0,
        attack_distance: 30.0,
        vision_range: 30.0,
        damage: (min: 25.0, max: 25.0),
        hp_for_player: (min: 30.0, max: 30.0),
    ),
    profile: BossSniper(
        bullet_speed: 40.0,
        yellow_duration: 0.3,
        red_duration: 0.2,
        laser_segments: 1,
        laser_delay: 0.1,
    ),
    timeline: (hit: 0.05, finish: 0.15),
)"#;

/// Catalog with every test archetype, keyed `melee`, `sniper` and `boss`.
pub fn catalog() -> EnemyCatalog {
    let mut catalog = EnemyCatalog::default();
    for (key, source) in [("melee", MELEE), ("sniper", SNIPER), ("boss", BOSS)] {
        let definition: ArchetypeDefinition = ron::from_str(source).unwrap();
        catalog.insert(key, definition);
    }
    catalog
}

/// Headless room: walls, the player's body and recording sinks.
pub struct Room {
    pub geometry: RoomGeometry,
    pub cues: CueBuffer,
    pub log: RoomLog,
    pub player: PlayerSnapshot,
}

impl Room {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            geometry: RoomGeometry::new(min, max, 3.0),
            cues: CueBuffer::default(),
            log: RoomLog::default(),
            player: PlayerSnapshot::new(Vec3::ZERO),
        }
    }

    /// 40 x 40 room centred on the origin.
    pub fn open() -> Self {
        Self::new(Vec2::splat(-20.0), Vec2::splat(20.0))
    }

    /// Put the player's feet at `position`.
    pub fn place_player(&mut self, position: Vec3) {
        self.player.position = position;
        self.geometry.set_player(Some((position + Vec3::Y, 0.5)));
    }

    pub fn services(&mut self) -> Services<'_> {
        Services {
            physics: &self.geometry,
            navigation: &self.geometry,
            effects: &mut self.cues,
            room: &mut self.log,
            player: &mut self.player,
        }
    }
}
