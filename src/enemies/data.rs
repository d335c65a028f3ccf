//! Enemy archetype data loaded from RON files.

use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::animation::AttackTimeline;
use super::components::EnemyTier;
use super::profiles::AttackProfile;
use crate::world::load_ron_dir;

pub const ENEMIES_DIR: &str = "assets/data/enemies";

/// Inclusive float range rolled uniformly.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn random(&self, rng: &mut impl Rng) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Inclusive integer range rolled uniformly.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub fn random(&self, rng: &mut impl Rng) -> u32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

fn default_elite_mult() -> f32 {
    1.5
}

fn default_patrolling_multiplier() -> f32 {
    1.0
}

fn default_hit_text_height() -> f32 {
    2.0
}

/// Immutable combat numbers shared by every enemy of an archetype.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct CombatStats {
    pub hp: f32,
    /// Running speed.
    pub move_speed: f32,
    /// Speed while patrolling or walking.
    pub patrolling_speed: f32,
    /// Animation speed factor applied while walking.
    #[serde(default = "default_patrolling_multiplier")]
    pub patrolling_multiplier: f32,
    /// Degrees per second.
    pub angular_speed: f32,
    /// Distance the enemy keeps from its target while following.
    pub preferred_distance: f32,
    pub attack_distance: f32,
    pub vision_range: f32,
    /// Targets closer than this make ranged enemies run away.
    #[serde(default)]
    pub flee_distance: f32,
    /// Seconds spent aiming before a stationary shot.
    #[serde(default)]
    pub aim_duration: f32,
    /// Pause at every patrol point.
    #[serde(default)]
    pub patrolling_idle_duration: f32,
    pub damage: Span,
    /// Hit points given back by the heal this enemy may drop.
    pub hp_for_player: Span,
    #[serde(default = "default_elite_mult")]
    pub elite_health_mult: f32,
    #[serde(default = "default_elite_mult")]
    pub elite_damage_mult: f32,
    /// Height of floating damage numbers above the enemy.
    #[serde(default = "default_hit_text_height")]
    pub hit_text_height: f32,
}

fn default_body_radius() -> f32 {
    0.5
}

fn default_muzzle_height() -> f32 {
    1.0
}

/// Enemy definition loaded from `assets/data/enemies/<name>.ron`.
#[derive(Deserialize, Clone, Debug)]
pub struct ArchetypeDefinition {
    pub name: String,
    /// `Regular` or `Boss`. Elites are regular archetypes spawned with the elite flag.
    #[serde(default)]
    pub tier: EnemyTier,
    pub stats: CombatStats,
    pub profile: AttackProfile,
    pub timeline: AttackTimeline,
    #[serde(default = "default_body_radius")]
    pub body_radius: f32,
    /// Height of the gun barrel for ranged archetypes.
    #[serde(default = "default_muzzle_height")]
    pub muzzle_height: f32,
}

/// Resource holding every loaded archetype.
///
/// Archetypes are handed out as `Arc`s, so spawned enemies share their
/// definition instead of copying it.
#[derive(Resource, Default, Debug, Clone)]
pub struct EnemyCatalog {
    archetypes: HashMap<String, Arc<ArchetypeDefinition>>,
}

impl EnemyCatalog {
    pub fn insert(&mut self, key: impl Into<String>, definition: ArchetypeDefinition) {
        self.archetypes.insert(key.into(), Arc::new(definition));
    }

    /// Get an archetype by key (the file stem).
    pub fn get(&self, key: &str) -> Option<Arc<ArchetypeDefinition>> {
        self.archetypes.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Load every archetype file in `dir`.
    pub fn load_dir(dir: &Path) -> Self {
        let mut catalog = Self::default();
        for (key, definition) in load_ron_dir::<ArchetypeDefinition>(dir) {
            info!("Loaded enemy archetype: {} ({})", definition.name, key);
            catalog.insert(key, definition);
        }
        catalog
    }
}

/// Startup system: load all archetypes from `assets/data/enemies/`.
pub fn load_enemy_catalog(mut catalog: ResMut<EnemyCatalog>) {
    *catalog = EnemyCatalog::load_dir(Path::new(ENEMIES_DIR));
    info!("Loaded {} enemy archetypes", catalog.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SHOTGUNNER: &str = r#"(
        name: "Shotgunner",
        stats: (
            hp: 60.0,
            move_speed: 4.0,
            patrolling_speed: 2.0,
            angular_speed: 360.0,
            preferred_distance: 4.0,
            attack_distance: 7.0,
            vision_range: 12.0,
            damage: (min: 8.0, max: 12.0),
            hp_for_player: (min: 10.0, max: 20.0),
        ),
        profile: Shotgun(bullet_speed: 14.0, spread_angle: 40.0, bullets: (min: 3, max: 5)),
        timeline: (hit: 0.3, finish: 0.8),
    )"#;

    #[test]
    fn archetype_parses_with_defaults() {
        let definition: ArchetypeDefinition = ron::from_str(SHOTGUNNER).unwrap();

        assert_eq!(definition.tier, EnemyTier::Regular);
        assert_eq!(definition.stats.elite_health_mult, 1.5);
        assert_eq!(definition.stats.flee_distance, 0.0);
        assert_eq!(definition.timeline.reload, None);
        assert!(matches!(definition.profile, AttackProfile::Shotgun { .. }));
    }

    #[test]
    fn catalog_shares_definitions() {
        let mut catalog = EnemyCatalog::default();
        catalog.insert("shotgunner", ron::from_str(SHOTGUNNER).unwrap());

        let a = catalog.get("shotgunner").unwrap();
        let b = catalog.get("shotgunner").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn spans_roll_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let span = Span { min: 2.0, max: 3.0 };

        for _ in 0..100 {
            let v = span.random(&mut rng);
            assert!((2.0..=3.0).contains(&v));
        }
        assert_eq!(Span::fixed(4.0).random(&mut rng), 4.0);
        assert_eq!(CountRange { min: 2, max: 2 }.random(&mut rng), 2);
    }
}
