//! Rewards plugin - pickups and chests in the world, collected into the ledger.

use bevy::prelude::*;

use super::drops::{CurrencyKind, DropData, DropKind, PickupSpawn};
use super::ledger::{resolve_pickup, CurrencyLedger, PickupOutcome};
use crate::combat::{Dead, Health, Player};
use crate::core::{GameState, PickupSpawnEvent};
use crate::enemies::motion::flat_distance;
use crate::world::RoomEntity;

/// Flat distance at which the player collects a pickup.
const PICKUP_RADIUS: f32 = 1.2;
/// Flat distance at which the player opens a chest.
const CHEST_RADIUS: f32 = 1.5;

/// Rewards plugin - spawns pickups, opens chests and credits the ledger.
pub struct RewardsPlugin;

impl Plugin for RewardsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrencyLedger>()
            .add_systems(Startup, setup_pickup_assets)
            .add_systems(
                Update,
                (open_chests, spawn_pickups, collect_pickups)
                    .chain()
                    .run_if(in_state(GameState::InGame)),
            );
    }
}

/// A reward lying in the world.
#[derive(Component, Debug, Clone)]
pub struct Pickup(pub PickupSpawn);

/// A closed chest and what it holds.
#[derive(Component, Debug, Clone, Default)]
pub struct Chest {
    pub contents: Vec<DropData>,
}

#[derive(Resource)]
struct PickupAssets {
    mesh: Handle<Mesh>,
    coins: Handle<StandardMaterial>,
    gems: Handle<StandardMaterial>,
    card: Handle<StandardMaterial>,
    heal: Handle<StandardMaterial>,
}

impl PickupAssets {
    fn material(&self, kind: &DropKind) -> Handle<StandardMaterial> {
        match kind {
            DropKind::Currency(CurrencyKind::Coins) => self.coins.clone(),
            DropKind::Currency(CurrencyKind::Gems) => self.gems.clone(),
            DropKind::WeaponCard(_) => self.card.clone(),
            DropKind::Heal => self.heal.clone(),
        }
    }
}

fn setup_pickup_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut emissive = |r: f32, g: f32, b: f32| {
        materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            emissive: LinearRgba::rgb(r, g, b),
            ..default()
        })
    };

    let coins = emissive(1.0, 0.8, 0.1);
    let gems = emissive(0.2, 0.9, 1.0);
    let card = emissive(0.9, 0.9, 0.9);
    let heal = emissive(0.2, 1.0, 0.3);

    commands.insert_resource(PickupAssets {
        mesh: meshes.add(Cuboid::new(0.3, 0.3, 0.3)),
        coins,
        gems,
        card,
        heal,
    });
}

/// Place a chest for the active room.
pub fn spawn_chest(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    position: Vec3,
    contents: Vec<DropData>,
) {
    commands.spawn((
        Chest { contents },
        Name::new("Chest"),
        Mesh3d(meshes.add(Cuboid::new(1.0, 0.7, 0.6))),
        MeshMaterial3d(materials.add(StandardMaterial::from(Color::srgb(0.45, 0.3, 0.15)))),
        Transform::from_translation(position + Vec3::Y * 0.35),
        RoomEntity,
    ));
}

fn spawn_pickups(
    mut commands: Commands,
    mut events: EventReader<PickupSpawnEvent>,
    assets: Res<PickupAssets>,
) {
    for PickupSpawnEvent(pickup) in events.read() {
        commands.spawn((
            Pickup(pickup.clone()),
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(assets.material(&pickup.kind)),
            Transform::from_translation(pickup.position + Vec3::Y * 0.3)
                .with_rotation(Quat::from_rotation_y(pickup.facing)),
            RoomEntity,
        ));
    }
}

/// Chests spill their contents as pickups once the player walks up.
fn open_chests(
    mut commands: Commands,
    chests: Query<(Entity, &Chest, &Transform)>,
    players: Query<&Transform, (With<Player>, Without<Dead>)>,
    mut spawns: EventWriter<PickupSpawnEvent>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };

    for (entity, chest, transform) in &chests {
        if flat_distance(player.translation, transform.translation) > CHEST_RADIUS {
            continue;
        }

        info!("Opened chest with {} reward(s)", chest.contents.len());
        let origin = Vec3::new(transform.translation.x, 0.0, transform.translation.z);
        for (i, drop) in chest.contents.iter().enumerate() {
            spawns.send(PickupSpawnEvent(PickupSpawn {
                kind: drop.kind.clone(),
                amount: drop.amount,
                position: origin + Vec3::X * 0.5 * i as f32,
                facing: 0.0,
            }));
        }
        commands.entity(entity).despawn_recursive();
    }
}

fn collect_pickups(
    mut commands: Commands,
    pickups: Query<(Entity, &Pickup, &Transform)>,
    mut players: Query<(&Transform, &mut Health), (With<Player>, Without<Dead>)>,
    mut ledger: ResMut<CurrencyLedger>,
) {
    let Ok((player, mut health)) = players.get_single_mut() else {
        return;
    };

    for (entity, pickup, transform) in &pickups {
        if flat_distance(player.translation, transform.translation) > PICKUP_RADIUS {
            continue;
        }

        match resolve_pickup(&pickup.0, &mut *ledger) {
            PickupOutcome::Currency { kind, amount } => {
                info!("Picked up {} {:?} (balance {})", amount, kind, ledger.balance(kind));
            }
            PickupOutcome::Card { card, amount } => {
                info!("Picked up {} card(s) of {}", amount, card.0);
            }
            PickupOutcome::Heal(amount) => {
                let healed = health.heal(amount as f32);
                info!("Healed {:.0}", healed);
            }
        }
        commands.entity(entity).despawn_recursive();
    }
}
