//! Combat tuning loaded from `assets/data/combat.ron`.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::world::DataLoadError;

/// Path of the tuning file relative to the working directory.
pub const COMBAT_TUNING_PATH: &str = "assets/data/combat.ron";

/// Global knobs for damage feedback, death handling and AI movement.
///
/// Every field has a default, so a partial RON file only overrides what it
/// names.
#[derive(Resource, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CombatTuning {
    /// Minimum seconds between two hit flashes on the same enemy.
    pub hit_flash_cooldown: f32,
    /// Minimum seconds between two floating damage numbers on the same enemy.
    pub floating_text_cooldown: f32,
    /// Distance an enemy is pushed back per hit at full multiplier.
    pub knockback_step: f32,
    /// Multiplier applied to the knockback multiplier on every hit.
    pub knockback_decay: f32,
    /// Seconds without damage before the knockback multiplier recovers.
    pub knockback_recovery_delay: f32,
    /// Seconds before a ragdoll is handed back and cleaned up.
    pub ragdoll_cleanup_delay: f32,
    pub death_explosion_force: f32,
    pub death_explosion_radius: f32,
    /// Delay step between consecutive drop pickups.
    pub drop_delay_step: f32,
    /// Target movement that makes a following enemy re-path.
    pub follow_repath_threshold: f32,
    /// Target movement that makes a melee enemy re-path.
    pub melee_repath_threshold: f32,
    /// Distance at which a patrol or boss waypoint counts as reached.
    pub waypoint_tolerance: f32,
    pub flee_max_attempts: u32,
    pub flee_min_radius: f32,
    pub flee_max_radius: f32,
    /// A flee point closer than this to the enemy is replaced.
    pub flee_arrive_distance: f32,
    /// Height of the eye ray used for line of sight checks.
    pub sight_height: f32,
    pub player_max_health: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            hit_flash_cooldown: 0.11,
            floating_text_cooldown: 0.18,
            knockback_step: 0.15,
            knockback_decay: 0.8,
            knockback_recovery_delay: 0.5,
            ragdoll_cleanup_delay: 2.0,
            death_explosion_force: 7000.0,
            death_explosion_radius: 100.0,
            drop_delay_step: 0.05,
            follow_repath_threshold: 0.5,
            melee_repath_threshold: 0.1,
            waypoint_tolerance: 1.0,
            flee_max_attempts: 1000,
            flee_min_radius: 10.0,
            flee_max_radius: 100.0,
            flee_arrive_distance: 5.0,
            sight_height: 1.0,
            player_max_health: 100.0,
        }
    }
}

impl CombatTuning {
    /// Load tuning from `path`, falling back to defaults when the file is absent.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        load_ron(path)
    }
}

/// Read and parse a single RON file.
pub fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;

    ron::from_str(&contents).map_err(|e| DataLoadError::ParseError {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

/// Startup system: replace the default tuning with the file contents.
pub fn load_combat_tuning(mut tuning: ResMut<CombatTuning>) {
    match CombatTuning::load_or_default(COMBAT_TUNING_PATH) {
        Ok(loaded) => {
            info!("Loaded combat tuning from {}", COMBAT_TUNING_PATH);
            *tuning = loaded;
        }
        Err(e) => error!("Failed to load combat tuning: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let tuning: CombatTuning =
            ron::from_str("(hit_flash_cooldown: 0.2, flee_max_attempts: 10)").unwrap();

        assert_eq!(tuning.hit_flash_cooldown, 0.2);
        assert_eq!(tuning.flee_max_attempts, 10);
        assert_eq!(tuning.floating_text_cooldown, 0.18);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tuning = CombatTuning::load_or_default("does/not/exist.ron").unwrap();
        assert_eq!(tuning, CombatTuning::default());
    }
}
