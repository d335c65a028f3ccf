//! Drop lists and their conversion into world pickups.

use bevy::math::Vec3;
use rand::Rng;
use serde::Deserialize;
use std::f32::consts::TAU;

use super::split::split_int_equally;

/// Persistent currencies tracked by the reward ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum CurrencyKind {
    Coins,
    Gems,
}

/// Weapon identifier carried by a weapon card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct CardKind(pub String);

/// What a drop gives when picked up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub enum DropKind {
    Currency(CurrencyKind),
    WeaponCard(CardKind),
    Heal,
}

impl DropKind {
    pub fn is_currency(&self) -> bool {
        matches!(self, DropKind::Currency(_))
    }

    pub fn is_coins(&self) -> bool {
        matches!(self, DropKind::Currency(CurrencyKind::Coins))
    }
}

/// One reward entry: a kind and how much of it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DropData {
    pub kind: DropKind,
    pub amount: u32,
}

impl DropData {
    pub fn new(kind: DropKind, amount: u32) -> Self {
        Self { kind, amount }
    }

    pub fn coins(amount: u32) -> Self {
        Self::new(DropKind::Currency(CurrencyKind::Coins), amount)
    }
}

/// A pickup to be placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupSpawn {
    pub kind: DropKind,
    pub amount: u32,
    pub position: Vec3,
    /// Yaw in radians.
    pub facing: f32,
}

/// A pickup together with the delay before it appears.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPickup {
    pub delay: f32,
    pub pickup: PickupSpawn,
}

/// How many pickups a currency drop is broken into.
pub fn currency_pickup_count(elite: bool, amount: u32, rng: &mut impl Rng) -> usize {
    let rolled = if elite {
        rng.gen_range(7..=10)
    } else {
        rng.gen_range(3..=5)
    };
    rolled.clamp(1, amount.max(1)) as usize
}

/// Turn a drop list into discrete pickups at `origin`.
///
/// Currency drops are broken into several pickups whose values come from
/// [`split_int_equally`]. Every other drop gives one pickup per unit, each
/// delayed by `delay_step` more than the previous one. Heal pickups carry
/// `heal_amount` hit points.
pub fn plan_pickups(
    drops: &[DropData],
    origin: Vec3,
    elite: bool,
    heal_amount: u32,
    delay_step: f32,
    rng: &mut impl Rng,
) -> Vec<PlannedPickup> {
    let mut planned = Vec::new();
    let mut staggered = 0usize;

    for drop in drops.iter().filter(|d| d.amount > 0) {
        if drop.kind.is_currency() {
            let count = currency_pickup_count(elite, drop.amount, rng);
            for value in split_int_equally(drop.amount, count) {
                planned.push(PlannedPickup {
                    delay: 0.0,
                    pickup: PickupSpawn {
                        kind: drop.kind.clone(),
                        amount: value,
                        position: origin,
                        facing: rng.gen_range(0.0..TAU),
                    },
                });
            }
            continue;
        }

        let amount = match drop.kind {
            DropKind::Heal => heal_amount,
            _ => 1,
        };
        for _ in 0..drop.amount {
            planned.push(PlannedPickup {
                delay: staggered as f32 * delay_step,
                pickup: PickupSpawn {
                    kind: drop.kind.clone(),
                    amount,
                    position: origin,
                    facing: rng.gen_range(0.0..TAU),
                },
            });
            staggered += 1;
        }
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn drop_list_parses_from_ron() {
        let drops: Vec<DropData> = ron::from_str(
            r#"[(kind: Currency(Coins), amount: 40), (kind: WeaponCard("shotgun"), amount: 2), (kind: Heal, amount: 1)]"#,
        )
        .unwrap();

        assert_eq!(drops[0], DropData::coins(40));
        assert_eq!(drops[1].kind, DropKind::WeaponCard(CardKind("shotgun".to_string())));
        assert_eq!(drops[2].kind, DropKind::Heal);
    }

    #[test]
    fn currency_is_split_into_several_pickups() {
        let mut rng = StdRng::seed_from_u64(7);
        let planned = plan_pickups(&[DropData::coins(20)], Vec3::ZERO, false, 0, 0.05, &mut rng);

        assert!((3..=5).contains(&planned.len()));
        assert_eq!(planned.iter().map(|p| p.pickup.amount).sum::<u32>(), 20);
        assert!(planned.iter().all(|p| p.delay == 0.0));
    }

    #[test]
    fn elite_currency_uses_more_pickups_but_never_more_than_amount() {
        let mut rng = StdRng::seed_from_u64(3);

        let planned = plan_pickups(&[DropData::coins(100)], Vec3::ZERO, true, 0, 0.05, &mut rng);
        assert!((7..=10).contains(&planned.len()));

        let planned = plan_pickups(&[DropData::coins(2)], Vec3::ZERO, true, 0, 0.05, &mut rng);
        assert_eq!(planned.len(), 2);
        assert!(planned.iter().all(|p| p.pickup.amount == 1));
    }

    #[test]
    fn items_are_one_per_unit_with_staggered_delay() {
        let mut rng = StdRng::seed_from_u64(11);
        let card = DropData::new(DropKind::WeaponCard(CardKind("rifle".to_string())), 3);
        let heal = DropData::new(DropKind::Heal, 1);

        let planned = plan_pickups(&[card, heal], Vec3::ONE, false, 25, 0.05, &mut rng);
        let delays: Vec<f32> = planned.iter().map(|p| p.delay).collect();

        assert_eq!(planned.len(), 4);
        for (i, delay) in delays.iter().enumerate() {
            assert!((delay - i as f32 * 0.05).abs() < 1e-6);
        }
        assert_eq!(planned[3].pickup.amount, 25);
        assert!(planned.iter().all(|p| p.pickup.position == Vec3::ONE));
    }
}
