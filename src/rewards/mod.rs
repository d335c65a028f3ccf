//! Rewards module - reward splitting, enemy drops, chests and the currency ledger.

mod distribution;
mod drops;
mod ledger;
mod plugin;
mod split;

pub use distribution::{assign_room_drops, distribute_level_rewards, ChestKind, ChestSlot, RoomRewardPlan};
pub use drops::*;
pub use ledger::{resolve_pickup, CurrencyLedger, PickupOutcome, RewardLedger};
pub use plugin::{spawn_chest, Chest, Pickup, RewardsPlugin};
pub use split::split_int_equally;
