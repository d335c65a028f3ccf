//! World plugin - room loading, room lifecycle and the scene around it.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::data::{load_world_data, CurrentLevel, LevelRegistry, RoomDefinition, RoomRegistry};
use super::effects::CueBuffer;
use super::geometry::{spawn_obstacle, RoomEntity};
use super::services::{PlayerSnapshot, RoomLog, Services};
use crate::combat::{spawn_player, Player, PLAYER_CENTER_HEIGHT, PLAYER_HIT_RADIUS};
use crate::core::{AllEnemiesDeadEvent, CombatTuning, GameState};
use crate::enemies::motion::flat_distance;
use crate::enemies::{EnemyCatalog, EnemyManager, SpawnRequest};
use crate::rewards::{distribute_level_rewards, spawn_chest, CurrencyLedger, RoomRewardPlan};

/// Flat distance from the exit point at which the player leaves the room.
const EXIT_RADIUS: f32 = 1.5;

/// World plugin - loads room data and builds, clears and advances rooms.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoomRegistry>()
            .init_resource::<LevelRegistry>()
            .init_resource::<CurrentLevel>()
            .init_resource::<RoomProgress>()
            .add_systems(Startup, (load_world_data, setup_scene))
            .add_systems(OnEnter(GameState::InGame), setup_level)
            .add_systems(
                Update,
                (open_exit, enter_next_room)
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

/// Reward plans of the current level and whether the room's exit is open.
#[derive(Resource, Debug, Default)]
pub struct RoomProgress {
    pub rewards: Vec<RoomRewardPlan>,
    pub exit_open: bool,
}

/// Marker for the exit portal of a cleared room.
#[derive(Component)]
pub struct RoomExit;

fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 28.0, 18.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Find the room the player is currently in.
pub fn current_room<'a>(
    levels: &LevelRegistry,
    rooms: &'a RoomRegistry,
    current: &CurrentLevel,
) -> Option<&'a RoomDefinition> {
    let level = levels.get(&current.name)?;
    let name = level.rooms.get(current.room_index)?;
    rooms.get(name)
}

/// Everything needed to build or tear down a room.
#[derive(SystemParam)]
pub struct RoomBuilder<'w, 's> {
    commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    rooms: Res<'w, RoomRegistry>,
    levels: Res<'w, LevelRegistry>,
    catalog: Res<'w, EnemyCatalog>,
    tuning: Res<'w, CombatTuning>,
    ledger: Res<'w, CurrencyLedger>,
    manager: ResMut<'w, EnemyManager>,
    progress: ResMut<'w, RoomProgress>,
    players: Query<'w, 's, &'static mut Transform, With<Player>>,
    room_entities: Query<'w, 's, Entity, With<RoomEntity>>,
}

impl RoomBuilder<'_, '_> {
    /// Split the level's rewards over its rooms and chests.
    fn plan_level_rewards(&mut self, current: &CurrentLevel) {
        let Some(level) = self.levels.get(&current.name) else {
            error!("Level '{}' not found in registry!", current.name);
            return;
        };

        let room_chests: Vec<_> = level
            .rooms
            .iter()
            .map(|name| self.rooms.get(name).map(RoomDefinition::chest_slots).unwrap_or_default())
            .collect();
        let ledger = &self.ledger;
        self.progress.rewards = distribute_level_rewards(&level.drops, &room_chests, |card| ledger.cards(card) > 0);
    }

    /// Build the room `current` points at. Returns false when there is none.
    fn build(&mut self, current: &CurrentLevel) -> bool {
        let Some(room) = current_room(&self.levels, &self.rooms, current) else {
            error!("No room {} in level '{}'", current.room_index, current.name);
            return false;
        };
        info!("Building room: {} ({} enemies)", room.name, room.enemies.len());

        for obstacle in room.obstacles() {
            spawn_obstacle(&mut self.commands, &mut self.meshes, &mut self.materials, &obstacle);
        }
        let ((min_x, min_z), (max_x, max_z)) = room.bounds;
        let size = Vec2::new(max_x - min_x, max_z - min_z);
        self.commands.spawn((
            Mesh3d(self.meshes.add(Plane3d::default().mesh().size(size.x, size.y))),
            MeshMaterial3d(self.materials.add(StandardMaterial::from(Color::srgb(0.2, 0.22, 0.25)))),
            Transform::from_xyz((min_x + max_x) * 0.5, 0.0, (min_z + max_z) * 0.5),
            RoomEntity,
        ));

        let start = room.player_start();
        match self.players.get_single_mut() {
            Ok(mut transform) => transform.translation = start + Vec3::Y * PLAYER_CENTER_HEIGHT,
            Err(_) => {
                spawn_player(&mut self.commands, start, self.tuning.player_max_health);
            }
        }

        for spawn in &room.enemies {
            let request = SpawnRequest::new(spawn.archetype.clone(), spawn.position())
                .with_rotation(spawn.rotation())
                .elite(spawn.elite)
                .with_patrol_points(spawn.patrol_points());
            self.manager.spawn_or_warn(&self.catalog, request);
        }

        let plan = self.progress.rewards.get(current.room_index).cloned().unwrap_or_default();
        self.manager.assign_room_drops(&plan.drops);
        self.manager.set_heal_drop_chance(room.heal_drop_chance);

        for (chest, contents) in room.chests.iter().zip(plan.chests) {
            if chest.inited {
                let position = Vec3::new(chest.position.0, chest.position.1, chest.position.2);
                spawn_chest(&mut self.commands, &mut self.meshes, &mut self.materials, position, contents);
            }
        }

        let mut geometry = room.geometry();
        geometry.set_player(Some((start + Vec3::Y * PLAYER_CENTER_HEIGHT, PLAYER_HIT_RADIUS)));
        let mut effects = CueBuffer::default();
        let mut log = RoomLog::default();
        let mut player = PlayerSnapshot::new(start);
        let mut services = Services {
            physics: &geometry,
            navigation: &geometry,
            effects: &mut effects,
            room: &mut log,
            player: &mut player,
        };
        self.manager.initialise_all(&mut services);

        self.commands.insert_resource(geometry);
        self.progress.exit_open = false;
        true
    }

    /// Unload every enemy and despawn everything that belongs to the room.
    fn teardown(&mut self) {
        let geometry = super::geometry::RoomGeometry::default();
        let mut effects = CueBuffer::default();
        let mut log = RoomLog::default();
        let mut player = PlayerSnapshot::default();
        let mut services = Services {
            physics: &geometry,
            navigation: &geometry,
            effects: &mut effects,
            room: &mut log,
            player: &mut player,
        };
        self.manager.unload_all(&mut services);

        for entity in &self.room_entities {
            self.commands.entity(entity).despawn_recursive();
        }
    }

    fn player_position(&self) -> Option<Vec3> {
        self.players.get_single().ok().map(|t| t.translation)
    }
}

/// Plan the level's rewards and build its first room.
pub fn setup_level(mut builder: RoomBuilder, current: Res<CurrentLevel>) {
    builder.plan_level_rewards(&current);
    builder.build(&current);
}

/// Open the exit once the room's last enemy died.
fn open_exit(
    mut commands: Commands,
    mut cleared: EventReader<AllEnemiesDeadEvent>,
    mut progress: ResMut<RoomProgress>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    levels: Res<LevelRegistry>,
    rooms: Res<RoomRegistry>,
    current: Res<CurrentLevel>,
) {
    if cleared.read().count() == 0 || progress.exit_open {
        return;
    }
    let Some(room) = current_room(&levels, &rooms, &current) else {
        return;
    };

    progress.exit_open = true;
    info!("Room '{}' cleared, exit is open", room.name);
    commands.spawn((
        RoomExit,
        Mesh3d(meshes.add(Cylinder::new(EXIT_RADIUS, 0.1))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.6, 1.0),
            emissive: LinearRgba::rgb(0.6, 1.2, 2.0),
            ..default()
        })),
        Transform::from_translation(room.exit_point()),
        RoomEntity,
    ));
}

/// Move on to the next room when the player steps onto the open exit.
fn enter_next_room(mut builder: RoomBuilder, mut current: ResMut<CurrentLevel>) {
    if !builder.progress.exit_open {
        return;
    }
    let Some(exit) = current_room(&builder.levels, &builder.rooms, &current).map(RoomDefinition::exit_point) else {
        return;
    };
    let Some(player) = builder.player_position() else {
        return;
    };
    if flat_distance(player, exit) > EXIT_RADIUS {
        return;
    }

    let rooms_in_level = builder.levels.get(&current.name).map_or(0, |l| l.rooms.len());
    if current.room_index + 1 >= rooms_in_level {
        builder.progress.exit_open = false;
        info!("Level '{}' complete", current.name);
        return;
    }

    builder.teardown();
    current.room_index += 1;
    builder.build(&current);
}
