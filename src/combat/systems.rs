//! Player-side damage and death systems.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use crate::core::{DamageEvent, GameState, PlayerDiedEvent, PlayerHitEvent};

/// Spawn the player body at `position` (ground level). The player outlives
/// rooms, only its position is reset between them.
pub fn spawn_player(commands: &mut Commands, position: Vec3, max_health: f32) -> Entity {
    commands
        .spawn((
            Player,
            Health::new(max_health),
            Name::new("Player"),
            Transform::from_translation(position + Vec3::Y * PLAYER_CENTER_HEIGHT),
            RigidBody::KinematicPositionBased,
            Collider::capsule_y(0.5, 0.3),
        ))
        .id()
}

/// Apply hits landed by enemy attacks.
pub fn apply_player_hits(
    mut hits: EventReader<PlayerHitEvent>,
    mut players: Query<&mut Health, (With<Player>, Without<Dead>)>,
) {
    let Ok(mut health) = players.get_single_mut() else {
        hits.clear();
        return;
    };

    for hit in hits.read() {
        let taken = health.take_damage(hit.amount);
        debug!("Player took {:.1} from {}", taken, hit.source);
    }
}

/// Apply generic damage events to anything with `Health`.
///
/// Enemies carry no `Health` component, their damage goes through the
/// enemy simulation instead.
pub fn apply_damage(
    mut damage_events: EventReader<DamageEvent>,
    mut health_query: Query<&mut Health, Without<Dead>>,
) {
    for event in damage_events.read() {
        if let Ok(mut health) = health_query.get_mut(event.target) {
            health.take_damage(event.amount);
        }
    }
}

/// Handle the player's death exactly once.
pub fn check_player_death(
    mut commands: Commands,
    players: Query<(Entity, &Health), (With<Player>, Without<Dead>)>,
    mut died: EventWriter<PlayerDiedEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for (player, health) in &players {
        if health.is_dead() {
            info!("Player died! Transitioning to Game Over...");
            commands.entity(player).insert(Dead);
            died.send(PlayerDiedEvent { player });
            next_state.set(GameState::GameOver);
        }
    }
}
