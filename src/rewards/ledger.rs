//! Persistent currency and card ledger, and pickup resolution.

use bevy::prelude::*;
use std::collections::HashMap;

use super::drops::{CardKind, CurrencyKind, DropKind, PickupSpawn};

/// Where picked up rewards end up.
pub trait RewardLedger {
    fn add_currency(&mut self, kind: CurrencyKind, amount: u32);

    fn has_amount(&self, kind: CurrencyKind, amount: u32) -> bool;

    /// Remove `amount`. Returns `false` and leaves the balance untouched when
    /// there is not enough.
    fn subtract(&mut self, kind: CurrencyKind, amount: u32) -> bool;

    fn add_cards(&mut self, card: &CardKind, amount: u32);
}

/// In-memory ledger used by the running game.
#[derive(Resource, Debug, Default, Clone)]
pub struct CurrencyLedger {
    currencies: HashMap<CurrencyKind, u32>,
    cards: HashMap<CardKind, u32>,
}

impl CurrencyLedger {
    pub fn balance(&self, kind: CurrencyKind) -> u32 {
        self.currencies.get(&kind).copied().unwrap_or(0)
    }

    pub fn cards(&self, card: &CardKind) -> u32 {
        self.cards.get(card).copied().unwrap_or(0)
    }
}

impl RewardLedger for CurrencyLedger {
    fn add_currency(&mut self, kind: CurrencyKind, amount: u32) {
        let balance = self.currencies.entry(kind).or_default();
        *balance = balance.saturating_add(amount);
    }

    fn has_amount(&self, kind: CurrencyKind, amount: u32) -> bool {
        self.balance(kind) >= amount
    }

    fn subtract(&mut self, kind: CurrencyKind, amount: u32) -> bool {
        if !self.has_amount(kind, amount) {
            return false;
        }
        *self.currencies.entry(kind).or_default() -= amount;
        true
    }

    fn add_cards(&mut self, card: &CardKind, amount: u32) {
        *self.cards.entry(card.clone()).or_default() += amount;
    }
}

/// What collecting a pickup did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickupOutcome {
    Currency { kind: CurrencyKind, amount: u32 },
    Card { card: CardKind, amount: u32 },
    /// Hit points the host should give back to the player.
    Heal(u32),
}

/// Apply a collected pickup to the ledger.
pub fn resolve_pickup(pickup: &PickupSpawn, ledger: &mut dyn RewardLedger) -> PickupOutcome {
    match &pickup.kind {
        DropKind::Currency(kind) => {
            ledger.add_currency(*kind, pickup.amount);
            PickupOutcome::Currency {
                kind: *kind,
                amount: pickup.amount,
            }
        }
        DropKind::WeaponCard(card) => {
            ledger.add_cards(card, pickup.amount);
            PickupOutcome::Card {
                card: card.clone(),
                amount: pickup.amount,
            }
        }
        DropKind::Heal => PickupOutcome::Heal(pickup.amount),
    }
}
