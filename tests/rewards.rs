mod common;

use bevy::math::Vec3;
use common::{catalog, Room};
use squad_shooter::enemies::{EnemyManager, SpawnRequest};
use squad_shooter::rewards::{
    distribute_level_rewards, resolve_pickup, CardKind, ChestKind, ChestSlot, CurrencyKind,
    CurrencyLedger, DropData, DropKind,
};

fn level_drops() -> Vec<DropData> {
    vec![
        DropData::coins(120),
        DropData::new(DropKind::Currency(CurrencyKind::Gems), 3),
        DropData::new(DropKind::WeaponCard(CardKind("shotgun".to_string())), 2),
    ]
}

fn level_chests() -> Vec<Vec<ChestSlot>> {
    let standard = ChestSlot {
        kind: ChestKind::Standard,
        inited: true,
    };
    let placeholder = ChestSlot {
        kind: ChestKind::Rewarded,
        inited: false,
    };
    vec![vec![standard], vec![standard, placeholder], vec![]]
}

fn coins_in(drops: &[DropData]) -> u32 {
    drops.iter().filter(|d| d.kind.is_coins()).map(|d| d.amount).sum()
}

#[test]
fn level_coins_are_preserved_across_rooms_and_chests() {
    let plans = distribute_level_rewards(&level_drops(), &level_chests(), |_| false);

    assert_eq!(plans.len(), 3);
    let in_rooms: u32 = plans.iter().map(|p| coins_in(&p.drops)).sum();
    let in_chests: u32 = plans.iter().flat_map(|p| &p.chests).map(|c| coins_in(c)).sum();
    assert_eq!(in_rooms + in_chests, 120);

    assert_eq!(plans[1].chests.len(), 2);
    assert!(plans[1].chests[1].is_empty());
    assert!(plans[..2].iter().all(|p| p.drops.len() == 1));
    assert_eq!(plans[2].drops.len(), 3);
}

#[test]
fn unlocked_cards_are_left_out() {
    let plans = distribute_level_rewards(&level_drops(), &level_chests(), |card| card.0 == "shotgun");

    let last = plans.last().unwrap();
    assert!(!last
        .drops
        .iter()
        .any(|d| matches!(d.kind, DropKind::WeaponCard(_))));
}

#[test]
fn last_room_rewards_reach_the_ledger() {
    let plans = distribute_level_rewards(&level_drops(), &level_chests(), |_| false);
    let last_room = &plans[2];

    let mut room = Room::open();
    room.place_player(Vec3::new(0.0, 0.0, -18.0));
    let mut manager = EnemyManager::new(21);
    let catalog = catalog();
    let ids: Vec<_> = [Vec3::new(-4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0)]
        .into_iter()
        .map(|position| {
            manager
                .spawn_enemy(&catalog, SpawnRequest::new("melee", position))
                .unwrap()
        })
        .collect();
    manager.initialise_all(&mut room.services());
    manager.assign_room_drops(&last_room.drops);

    for id in ids {
        manager.take_damage(id, 1000.0, Vec3::ZERO, Vec3::Z, &mut room.services());
    }
    for _ in 0..5 {
        manager.tick(0.1, &mut room.services());
    }

    let mut ledger = CurrencyLedger::default();
    for pickup in room.log.pickups() {
        resolve_pickup(pickup, &mut ledger);
    }

    assert_eq!(ledger.balance(CurrencyKind::Coins), coins_in(&last_room.drops));
    assert_eq!(ledger.balance(CurrencyKind::Gems), 3);
    assert_eq!(ledger.cards(&CardKind("shotgun".to_string())), 2);
}
