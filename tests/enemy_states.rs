mod common;

use bevy::math::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::{catalog, Room};
use squad_shooter::core::CombatTuning;
use squad_shooter::enemies::motion::flat_distance;
use squad_shooter::enemies::states::Fleeing;
use squad_shooter::enemies::{
    BossSniperState, CommonState, EnemyBody, EnemyCx, EnemyId, EnemyManager, SpawnRequest,
};
use squad_shooter::fsm::{FinishSignal, StateBehavior};
use squad_shooter::world::{CombatCue, NavigationAgent, Obstacle, SteeringAgent};

#[test]
fn melee_chases_and_hits_the_player() {
    let mut room = Room::open();
    let player = Vec3::new(0.0, 0.0, -5.0);
    room.place_player(player);
    let mut manager = EnemyManager::new(1);
    let id = manager
        .spawn_enemy(&catalog(), SpawnRequest::new("melee", Vec3::ZERO))
        .unwrap();
    manager.initialise_all(&mut room.services());
    assert_eq!(manager.get(id).unwrap().common_state(), Some(CommonState::Patrolling));

    for _ in 0..30 {
        manager.tick(0.1, &mut room.services());
    }

    let enemy = manager.get(id).unwrap();
    assert_eq!(enemy.common_state(), Some(CommonState::Attacking));
    assert!(room.player.total_damage() >= 10.0);
    assert!((flat_distance(enemy.body.position, player) - 1.0).abs() < 0.05);
}

#[test]
fn losing_the_target_mid_swing_cancels_the_swing() {
    let mut room = Room::open();
    room.place_player(Vec3::new(0.0, 0.0, -1.2));
    let mut manager = EnemyManager::new(10);
    let id = manager
        .spawn_enemy(&catalog(), SpawnRequest::new("melee", Vec3::ZERO))
        .unwrap();
    manager.initialise_all(&mut room.services());

    manager.tick(0.1, &mut room.services());
    manager.tick(0.1, &mut room.services());
    assert!(manager.get(id).unwrap().body.is_attacking());

    room.player.alive = false;
    manager.tick(0.1, &mut room.services());

    let enemy = manager.get(id).unwrap();
    assert_eq!(enemy.common_state(), Some(CommonState::Patrolling));
    assert!(!enemy.body.is_attacking());

    // The cancelled hit was due here.
    room.player.alive = true;
    manager.tick(0.15, &mut room.services());
    assert_eq!(room.player.total_damage(), 0.0);
}

#[test]
fn one_transition_per_tick() {
    let mut room = Room::open();
    room.place_player(Vec3::new(0.0, 0.0, -8.0));
    let mut manager = EnemyManager::new(2);
    let id = manager
        .spawn_enemy(&catalog(), SpawnRequest::new("sniper", Vec3::ZERO))
        .unwrap();
    manager.initialise_all(&mut room.services());

    manager.tick(0.1, &mut room.services());
    assert_eq!(manager.get(id).unwrap().common_state(), Some(CommonState::Following));

    manager.tick(0.1, &mut room.services());
    assert_eq!(manager.get(id).unwrap().common_state(), Some(CommonState::AimAndAttack));
}

#[test]
fn boss_repositions_after_every_second_shot() {
    let mut room = Room::open();
    room.place_player(Vec3::new(0.0, 0.0, -5.0));
    let mut manager = EnemyManager::new(3);
    let start = Vec3::new(0.0, 0.0, 5.0);
    let request = SpawnRequest::new("boss", start)
        .with_patrol_points(vec![start, Vec3::new(5.0, 0.0, 5.0)]);
    let id = manager.spawn_enemy(&catalog(), request).unwrap();
    manager.initialise_all(&mut room.services());

    let mut seen = vec![manager.get(id).unwrap().boss_state().unwrap()];
    for _ in 0..80 {
        manager.tick(0.05, &mut room.services());
        let state = manager.get(id).unwrap().boss_state().unwrap();
        if seen.last() != Some(&state) {
            seen.push(state);
        }
    }

    use BossSniperState::*;
    let expected = [ChangingPosition, Aiming, Shooting, Aiming, Shooting, ChangingPosition, Aiming];
    assert!(seen.len() >= expected.len(), "{seen:?}");
    assert_eq!(&seen[..expected.len()], &expected);
}

#[test]
fn boss_laser_stops_at_a_wall_facing_it_head_on() {
    let mut room = Room::open();
    room.geometry.obstacles.push(Obstacle::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(12.0, 2.0, 1.0)));
    room.place_player(Vec3::new(0.0, 0.0, -5.0));
    let mut manager = EnemyManager::new(8);
    let start = Vec3::new(0.0, 0.0, 5.0);
    let request = SpawnRequest::new("boss", start).with_patrol_points(vec![start]);
    manager.spawn_enemy(&catalog(), request).unwrap();
    manager.initialise_all(&mut room.services());

    for _ in 0..80 {
        manager.tick(0.05, &mut room.services());
    }

    let paths: Vec<_> = room
        .cues
        .cues
        .iter()
        .filter_map(|c| match c {
            CombatCue::LaserAimed { path, .. } => Some(path),
            _ => None,
        })
        .collect();
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| p.first().is_some_and(|node| node.z > 0.0)), "{paths:?}");
    assert_eq!(room.player.total_damage(), 0.0);
}

#[test]
fn lone_patrol_point_at_spawn_keeps_the_enemy_on_post() {
    let mut room = Room::open();
    room.place_player(Vec3::new(0.0, 0.0, -18.0));
    let mut manager = EnemyManager::new(4);
    let request = SpawnRequest::new("melee", Vec3::ZERO).with_patrol_points(vec![Vec3::ZERO]);
    let id = manager.spawn_enemy(&catalog(), request).unwrap();
    manager.initialise_all(&mut room.services());

    for _ in 0..10 {
        manager.tick(0.1, &mut room.services());
    }

    let enemy = manager.get(id).unwrap();
    assert_eq!(enemy.common_state(), Some(CommonState::Patrolling));
    assert_eq!(enemy.body.position, Vec3::ZERO);
    assert!(enemy.agent().destination().is_none());
}

#[test]
fn patrol_walks_between_points() {
    let mut room = Room::open();
    room.place_player(Vec3::new(0.0, 0.0, -18.0));
    let mut manager = EnemyManager::new(5);
    let request = SpawnRequest::new("melee", Vec3::ZERO)
        .with_patrol_points(vec![Vec3::ZERO, Vec3::new(6.0, 0.0, 0.0)]);
    let id = manager.spawn_enemy(&catalog(), request).unwrap();
    manager.initialise_all(&mut room.services());

    let mut furthest = 0.0f32;
    for _ in 0..30 {
        manager.tick(0.1, &mut room.services());
        furthest = furthest.max(manager.get(id).unwrap().body.position.x);
    }

    assert!(furthest > 4.5, "{furthest}");
    assert_eq!(manager.get(id).unwrap().common_state(), Some(CommonState::Patrolling));
}

#[test]
fn flee_holds_position_when_nothing_is_walkable() {
    let mut room = Room::new(Vec2::splat(-2.0), Vec2::splat(2.0));
    room.place_player(Vec3::new(0.0, 0.0, -1.0));
    let archetype = catalog().get("sniper").unwrap();
    let mut body = EnemyBody::new(EnemyId(0), archetype, false, Vec3::ZERO, Quat::IDENTITY, Vec::new());
    let mut agent = SteeringAgent::new(Vec3::ZERO, 3.5);
    let mut projectiles = Vec::new();
    let mut rng = StdRng::seed_from_u64(9);
    let tuning = CombatTuning::default();

    let mut cx = EnemyCx {
        body: &mut body,
        agent: &mut agent,
        player: &mut room.player,
        physics: &room.geometry,
        navigation: &room.geometry,
        effects: &mut room.cues,
        room: &mut room.log,
        projectiles: &mut projectiles,
        rng: &mut rng,
        tuning: &tuning,
    };

    assert_eq!(Fleeing::pick_point(&mut cx), Vec3::ZERO);

    let mut fleeing = Fleeing::default();
    fleeing.on_start(&mut cx, &mut FinishSignal::default());
    assert_eq!(cx.agent.destination(), Some(Vec3::ZERO));
}

#[test]
fn stun_freezes_the_state_machine() {
    let mut room = Room::open();
    room.place_player(Vec3::new(0.0, 0.0, -5.0));
    let mut manager = EnemyManager::new(6);
    let id = manager
        .spawn_enemy(&catalog(), SpawnRequest::new("melee", Vec3::ZERO))
        .unwrap();
    manager.initialise_all(&mut room.services());
    manager.stun(id, 1.0).unwrap();

    for _ in 0..5 {
        manager.tick(0.1, &mut room.services());
    }
    let enemy = manager.get(id).unwrap();
    assert!(enemy.body.is_stunned());
    assert_eq!(enemy.common_state(), Some(CommonState::Patrolling));
    assert_eq!(enemy.body.position, Vec3::ZERO);

    for _ in 0..10 {
        manager.tick(0.1, &mut room.services());
    }
    let enemy = manager.get(id).unwrap();
    assert!(!enemy.body.is_stunned());
    assert_eq!(enemy.common_state(), Some(CommonState::Attacking));
}
