//! Enemy plugin - drives the simulation once per frame and mirrors it into the ECS.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_kira_audio::{Audio, AudioControl};
use bevy_rapier3d::prelude::*;
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

use super::components::{EnemyId, EnemyLink, EnemyTier, ProjectileLink};
use super::data::{load_enemy_catalog, EnemyCatalog};
use super::manager::EnemyManager;
use crate::combat::{Health, Player, PLAYER_CENTER_HEIGHT, PLAYER_HIT_RADIUS};
use crate::core::{
    AllEnemiesDeadEvent, CombatTuning, DamageEvent, EnemyKilledEvent, GameState, PickupSpawnEvent,
    PlayerHitEvent,
};
use crate::world::{
    AimPhase, CombatCue, CueBuffer, LayerMask, PhysicsQuery, PlayerSnapshot, RapierQuery, RoomEntity,
    RoomGeometry, RoomLog, RoomNotice, Services,
};

/// Half length of the capsule between its two hemispheres.
const BODY_HALF_HEIGHT: f32 = 0.5;

/// Enemy plugin - handles the catalog, the per-frame simulation and enemy visuals.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyCatalog>()
            .init_resource::<EnemyManager>()
            .add_event::<CombatCue>()
            .add_systems(Startup, (load_enemy_catalog, setup_projectile_assets))
            // Tuning is loaded on Startup, rooms are set up once InGame is entered
            .add_systems(PostStartup, apply_combat_tuning)
            .add_systems(
                Update,
                (
                    despawn_released_enemies,
                    run_enemy_simulation,
                    spawn_enemy_bodies,
                    sync_enemy_bodies,
                    sync_projectiles,
                    draw_lasers,
                    play_cue_sounds,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

/// Shared handles for bullet visuals.
#[derive(Resource)]
struct ProjectileAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

fn setup_projectile_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(ProjectileAssets {
        mesh: meshes.add(Sphere::new(0.1)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.8, 0.2),
            emissive: LinearRgba::rgb(4.0, 3.0, 0.5),
            ..default()
        }),
    });
}

fn apply_combat_tuning(tuning: Res<CombatTuning>, mut manager: ResMut<EnemyManager>) {
    manager.set_tuning(tuning.clone());
}

/// Everything the simulation reports back during a frame.
#[derive(SystemParam)]
struct SimulationEvents<'w> {
    cues: EventWriter<'w, CombatCue>,
    kills: EventWriter<'w, EnemyKilledEvent>,
    cleared: EventWriter<'w, AllEnemiesDeadEvent>,
    pickups: EventWriter<'w, PickupSpawnEvent>,
    player_hits: EventWriter<'w, PlayerHitEvent>,
}

impl SimulationEvents<'_> {
    fn forward(&mut self, effects: &mut CueBuffer, room: &mut RoomLog, player: &mut PlayerSnapshot) {
        self.cues.send_batch(effects.drain());

        for notice in room.drain() {
            match notice {
                RoomNotice::EnemyKilled { enemy, position } => {
                    self.kills.send(EnemyKilledEvent { enemy, position });
                }
                RoomNotice::AllEnemiesDead => {
                    self.cleared.send(AllEnemiesDeadEvent);
                }
                RoomNotice::Pickup(pickup) => {
                    self.pickups.send(PickupSpawnEvent(pickup));
                }
            }
        }

        for hit in player.hits.drain(..) {
            self.player_hits.send(PlayerHitEvent {
                source: hit.source,
                amount: hit.amount,
            });
        }
    }
}

/// Route this frame's hits to enemies, then tick every enemy and bullet.
#[allow(clippy::too_many_arguments)]
fn run_enemy_simulation(
    time: Res<Time>,
    mut manager: ResMut<EnemyManager>,
    geometry: Option<ResMut<RoomGeometry>>,
    contexts: Query<&RapierContext>,
    players: Query<(&Transform, &Health), With<Player>>,
    enemy_links: Query<&EnemyLink>,
    mut damage_events: EventReader<DamageEvent>,
    mut events: SimulationEvents,
) {
    // No room loaded yet
    let Some(mut geometry) = geometry else {
        damage_events.clear();
        return;
    };

    let mut player = match players.get_single() {
        Ok((transform, health)) => {
            let mut snapshot = PlayerSnapshot::new(transform.translation - Vec3::Y * PLAYER_CENTER_HEIGHT);
            snapshot.alive = !health.is_dead();
            snapshot
        }
        Err(_) => PlayerSnapshot::default(),
    };
    let body = player
        .alive
        .then_some((player.position + Vec3::Y * PLAYER_CENTER_HEIGHT, PLAYER_HIT_RADIUS));
    geometry.set_player(body);
    let geometry: &RoomGeometry = &geometry;

    let classify = |entity: Entity| {
        if players.contains(entity) {
            LayerMask::PLAYER
        } else if enemy_links.contains(entity) {
            LayerMask::ENEMY
        } else {
            LayerMask::OBSTACLE
        }
    };
    let rapier = contexts.get_single().ok().map(|context| RapierQuery {
        context,
        classify: &classify,
    });
    let physics: &dyn PhysicsQuery = match &rapier {
        Some(query) => query,
        None => geometry,
    };

    let mut effects = CueBuffer::default();
    let mut room = RoomLog::default();
    let mut services = Services {
        physics,
        navigation: geometry,
        effects: &mut effects,
        room: &mut room,
        player: &mut player,
    };

    for event in damage_events.read() {
        if let Ok(link) = enemy_links.get(event.target) {
            manager.take_damage(link.0, event.amount, event.point, event.direction, &mut services);
        }
    }
    manager.tick(time.delta_secs(), &mut services);

    events.forward(&mut effects, &mut room, &mut player);
}

/// Enemies whose ragdoll was handed back leave the simulation.
fn despawn_released_enemies(mut manager: ResMut<EnemyManager>) {
    for id in manager.remove_released() {
        debug!("Released {}", id);
    }
}

fn body_center(radius: f32) -> f32 {
    BODY_HALF_HEIGHT + radius
}

fn tier_color(tier: EnemyTier) -> Color {
    match tier {
        EnemyTier::Regular => Color::srgb(0.7, 0.2, 0.2),
        EnemyTier::Elite => Color::srgb(0.85, 0.55, 0.1),
        EnemyTier::Boss => Color::srgb(0.5, 0.1, 0.6),
    }
}

/// Give every simulated enemy a visible, hittable body.
fn spawn_enemy_bodies(
    mut commands: Commands,
    manager: Res<EnemyManager>,
    linked: Query<&EnemyLink>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let existing: HashSet<EnemyId> = linked.iter().map(|link| link.0).collect();

    for enemy in manager.iter().filter(|e| !existing.contains(&e.body.id)) {
        let body = &enemy.body;
        if body.is_dead() {
            continue;
        }
        let radius = body.archetype.body_radius;

        commands.spawn((
            EnemyLink(body.id),
            Name::new(body.archetype.name.clone()),
            Mesh3d(meshes.add(Capsule3d::new(radius, BODY_HALF_HEIGHT * 2.0))),
            MeshMaterial3d(materials.add(StandardMaterial::from(tier_color(body.tier)))),
            Transform::from_translation(body.position + Vec3::Y * body_center(radius))
                .with_rotation(body.rotation),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(BODY_HALF_HEIGHT, radius),
            RoomEntity,
        ));
    }
}

/// Copy simulated poses onto enemy entities and drop the ones that left.
fn sync_enemy_bodies(
    mut commands: Commands,
    manager: Res<EnemyManager>,
    mut bodies: Query<(Entity, &EnemyLink, &mut Transform, Has<Collider>)>,
) {
    for (entity, link, mut transform, has_collider) in &mut bodies {
        let Some(enemy) = manager.get(link.0) else {
            commands.entity(entity).despawn_recursive();
            continue;
        };
        let body = &enemy.body;
        let radius = body.archetype.body_radius;

        if body.is_dead() {
            // Lying on its back until the ragdoll is released
            transform.translation = body.position + Vec3::Y * radius;
            transform.rotation = body.rotation * Quat::from_rotation_x(FRAC_PI_2);
        } else {
            transform.translation = body.position + Vec3::Y * body_center(radius);
            transform.rotation = body.rotation;
        }

        if has_collider && !body.collider_enabled() {
            commands.entity(entity).remove::<(RigidBody, Collider)>();
        }
    }
}

fn sync_projectiles(
    mut commands: Commands,
    manager: Res<EnemyManager>,
    assets: Res<ProjectileAssets>,
    mut linked: Query<(Entity, &ProjectileLink, &mut Transform)>,
) {
    let mut seen = HashSet::new();

    for (entity, link, mut transform) in &mut linked {
        match manager.projectiles().iter().find(|p| p.id == link.0) {
            Some(projectile) => {
                transform.translation = projectile.position;
                seen.insert(link.0);
            }
            None => commands.entity(entity).despawn_recursive(),
        }
    }

    for projectile in manager.projectiles().iter().filter(|p| !seen.contains(&p.id)) {
        commands.spawn((
            ProjectileLink(projectile.id),
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(assets.material.clone()),
            Transform::from_translation(projectile.position),
            RoomEntity,
        ));
    }
}

/// Boss lasers are raised every frame while visible, so immediate mode fits.
fn draw_lasers(mut cues: EventReader<CombatCue>, manager: Res<EnemyManager>, mut gizmos: Gizmos) {
    for cue in cues.read() {
        let CombatCue::LaserAimed { enemy, path, phase } = cue else {
            continue;
        };
        let Some(origin) = manager.get(*enemy).map(|e| e.body.muzzle()) else {
            continue;
        };
        let color = match phase {
            AimPhase::Yellow => Color::srgb(1.0, 0.9, 0.1),
            AimPhase::Red => Color::srgb(1.0, 0.1, 0.1),
        };
        gizmos.linestrip(std::iter::once(origin).chain(path.iter().copied()), color);
    }
}

fn play_cue_sounds(
    mut cues: EventReader<CombatCue>,
    audio: Res<Audio>,
    asset_server: Res<AssetServer>,
) {
    for cue in cues.read() {
        if let CombatCue::Sound { sound, volume, .. } = cue {
            audio
                .play(asset_server.load(sound.asset_path()))
                .with_volume(f64::from(*volume));
        }
    }
}
