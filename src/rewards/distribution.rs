//! Spreading a level's rewards over its rooms, chests and enemies.

use serde::Deserialize;

use super::drops::{CardKind, DropData, DropKind};
use super::split::split_int_equally;

/// Chest flavours a room can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ChestKind {
    /// Holds its share of the level's coins.
    Standard,
    /// Holds the level's full coin reward.
    Rewarded,
}

/// A chest slot as placed in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChestSlot {
    pub kind: ChestKind,
    pub inited: bool,
}

/// Rewards assigned to one room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomRewardPlan {
    /// Dropped by the room's enemies.
    pub drops: Vec<DropData>,
    /// Contents of each chest slot, in slot order. Slots that are not
    /// inited get an empty list.
    pub chests: Vec<Vec<DropData>>,
}

/// Split a level's rewards between its rooms and chests.
///
/// The coin reward is divided with [`split_int_equally`] over every room
/// plus every inited standard chest. The last room also gets every other
/// reward, except weapon cards for which `is_unlocked` returns true.
/// Rewarded chests hold the full coin amount.
pub fn distribute_level_rewards(
    drops: &[DropData],
    room_chests: &[Vec<ChestSlot>],
    is_unlocked: impl Fn(&CardKind) -> bool,
) -> Vec<RoomRewardPlan> {
    let rooms = room_chests.len();
    let standard_chests = room_chests
        .iter()
        .flatten()
        .filter(|c| c.inited && c.kind == ChestKind::Standard)
        .count();

    let coins = drops.iter().find(|d| d.kind.is_coins()).map(|d| d.amount);
    let shares = coins
        .map(|amount| split_int_equally(amount, rooms + standard_chests))
        .unwrap_or_default();

    let mut plans: Vec<RoomRewardPlan> = (0..rooms)
        .map(|i| {
            let mut plan = RoomRewardPlan::default();
            if let Some(share) = shares.get(i).copied().filter(|s| *s > 0) {
                plan.drops.push(DropData::coins(share));
            }
            plan
        })
        .collect();

    if let Some(last) = plans.last_mut() {
        last.drops.extend(
            drops
                .iter()
                .filter(|d| !d.kind.is_coins())
                .filter(|d| match &d.kind {
                    DropKind::WeaponCard(card) => !is_unlocked(card),
                    _ => true,
                })
                .cloned(),
        );
    }

    let mut next_share = rooms;
    for (plan, slots) in plans.iter_mut().zip(room_chests) {
        for slot in slots {
            let amount = match (slot.inited, slot.kind) {
                (false, _) => None,
                (true, ChestKind::Standard) => {
                    let share = shares.get(next_share).copied();
                    next_share += 1;
                    share
                }
                (true, ChestKind::Rewarded) => coins,
            };

            plan.chests.push(
                amount
                    .filter(|a| *a > 0)
                    .map(|a| vec![DropData::coins(a)])
                    .unwrap_or_default(),
            );
        }
    }

    plans
}

/// Spread a room's drops over its enemies.
///
/// Currency is split across all enemies with [`split_int_equally`], so the
/// last enemy carries the remainder. Every other drop goes to the last
/// enemy. A room without enemies gets nothing.
pub fn assign_room_drops(drops: &[DropData], enemies: usize) -> Vec<Vec<DropData>> {
    let mut assigned = vec![Vec::new(); enemies];
    let Some(last) = enemies.checked_sub(1) else {
        return assigned;
    };

    for drop in drops {
        if drop.kind.is_currency() {
            for (enemy, amount) in split_int_equally(drop.amount, enemies).into_iter().enumerate() {
                if amount > 0 {
                    assigned[enemy].push(DropData::new(drop.kind.clone(), amount));
                }
            }
        } else {
            assigned[last].push(drop.clone());
        }
    }

    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards::CurrencyKind;

    fn card(name: &str) -> DropData {
        DropData::new(DropKind::WeaponCard(CardKind(name.to_string())), 1)
    }

    fn slot(kind: ChestKind, inited: bool) -> ChestSlot {
        ChestSlot { kind, inited }
    }

    #[test]
    fn coins_split_over_rooms_and_standard_chests() {
        let drops = [DropData::coins(100)];
        let rooms = vec![
            vec![],
            vec![slot(ChestKind::Standard, true), slot(ChestKind::Standard, false)],
            vec![slot(ChestKind::Rewarded, true)],
        ];

        let plans = distribute_level_rewards(&drops, &rooms, |_| false);

        // Three rooms plus one inited standard chest.
        assert_eq!(plans[0].drops, [DropData::coins(25)]);
        assert_eq!(plans[1].drops, [DropData::coins(25)]);
        assert_eq!(plans[2].drops, [DropData::coins(25)]);
        assert_eq!(plans[1].chests, [vec![DropData::coins(25)], vec![]]);
        assert_eq!(plans[2].chests, [vec![DropData::coins(100)]]);
    }

    #[test]
    fn last_room_gets_special_rewards_except_unlocked_cards() {
        let gems = DropData::new(DropKind::Currency(CurrencyKind::Gems), 3);
        let drops = [DropData::coins(10), card("shotgun"), card("rifle"), gems.clone()];
        let rooms = vec![vec![], vec![]];

        let plans = distribute_level_rewards(&drops, &rooms, |c| c.0 == "rifle");

        assert_eq!(plans[0].drops, [DropData::coins(5)]);
        assert_eq!(plans[1].drops, [DropData::coins(5), card("shotgun"), gems]);
    }

    #[test]
    fn level_without_coins_still_places_items() {
        let plans = distribute_level_rewards(&[card("smg")], &[vec![slot(ChestKind::Standard, true)]], |_| false);

        assert_eq!(plans[0].drops, [card("smg")]);
        assert_eq!(plans[0].chests, [Vec::<DropData>::new()]);
    }

    #[test]
    fn room_drops_are_spread_over_enemies() {
        let drops = [DropData::coins(10), card("smg")];

        let assigned = assign_room_drops(&drops, 3);

        assert_eq!(assigned[0], [DropData::coins(3)]);
        assert_eq!(assigned[1], [DropData::coins(3)]);
        assert_eq!(assigned[2], [DropData::coins(4), card("smg")]);
        assert!(assign_room_drops(&drops, 0).is_empty());
    }
}
