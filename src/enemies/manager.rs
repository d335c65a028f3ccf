//! Table of live enemies, ticked once per frame.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::body::EnemyBody;
use super::components::EnemyId;
use super::data::EnemyCatalog;
use super::entity::{report_setup_error, CombatEntity, DamageOutcome, SimShared};
use super::error::SpawnError;
use super::projectiles::Projectile;
use super::states::Brain;
use crate::core::CombatTuning;
use crate::rewards::{assign_room_drops, DropData};
use crate::world::{Services, SteeringAgent};

/// What the room asks for when it spawns an enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub archetype: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub elite: bool,
    pub patrol_points: Vec<Vec3>,
}

impl SpawnRequest {
    pub fn new(archetype: impl Into<String>, position: Vec3) -> Self {
        Self {
            archetype: archetype.into(),
            position,
            rotation: Quat::IDENTITY,
            elite: false,
            patrol_points: Vec::new(),
        }
    }

    pub fn elite(mut self, elite: bool) -> Self {
        self.elite = elite;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_patrol_points(mut self, points: Vec<Vec3>) -> Self {
        self.patrol_points = points;
        self
    }
}

/// Owns every enemy of the current room and the bullets they fired.
#[derive(Resource)]
pub struct EnemyManager {
    entities: Vec<CombatEntity>,
    projectiles: Vec<Projectile>,
    shared: SimShared,
    next_enemy: u32,
    next_projectile: u32,
    all_dead_notified: bool,
}

impl Default for EnemyManager {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EnemyManager {
    /// Manager with default tuning and a seeded random source.
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, CombatTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: CombatTuning) -> Self {
        Self {
            entities: Vec::new(),
            projectiles: Vec::new(),
            shared: SimShared {
                rng: StdRng::seed_from_u64(seed),
                tuning,
                fired: Vec::new(),
            },
            next_enemy: 0,
            next_projectile: 0,
            all_dead_notified: false,
        }
    }

    pub fn tuning(&self) -> &CombatTuning {
        &self.shared.tuning
    }

    pub fn set_tuning(&mut self, tuning: CombatTuning) {
        self.shared.tuning = tuning;
    }

    /// Create an enemy from its archetype. It stays idle until initialised.
    pub fn spawn_enemy(
        &mut self,
        catalog: &EnemyCatalog,
        request: SpawnRequest,
    ) -> Result<EnemyId, SpawnError> {
        let archetype = catalog
            .get(&request.archetype)
            .ok_or_else(|| SpawnError::UnknownArchetype(request.archetype.clone()))?;

        let required = archetype.profile.min_patrol_points();
        if request.patrol_points.len() < required {
            return Err(SpawnError::MissingPatrolPoints {
                archetype: request.archetype,
                required,
                given: request.patrol_points.len(),
            });
        }

        let brain = Brain::for_profile(&archetype.profile).map_err(|source| SpawnError::StateMachine {
            archetype: request.archetype.clone(),
            source,
        })?;

        let id = EnemyId(self.next_enemy);
        self.next_enemy += 1;

        let agent = SteeringAgent::new(request.position, archetype.stats.move_speed);
        let body = EnemyBody::new(
            id,
            archetype,
            request.elite,
            request.position,
            request.rotation,
            request.patrol_points,
        );
        info!("Spawned {} ({}, {:?})", id, body.archetype.name, body.tier);

        self.entities.push(CombatEntity::new(body, Box::new(agent), brain));
        self.all_dead_notified = false;
        Ok(id)
    }

    pub fn add_drop(&mut self, id: EnemyId, drop: DropData) -> Result<(), SpawnError> {
        let entity = self.get_mut(id).ok_or(SpawnError::UnknownEnemy(id))?;
        entity.body.add_drop(drop);
        Ok(())
    }

    /// Spread a room's reward list over its enemies in spawn order.
    pub fn assign_room_drops(&mut self, drops: &[DropData]) {
        let shares = assign_room_drops(drops, self.entities.len());
        for (entity, share) in self.entities.iter_mut().zip(shares) {
            for drop in share {
                entity.body.add_drop(drop);
            }
        }
    }

    pub fn set_heal_drop_chance(&mut self, chance: f32) {
        for entity in &mut self.entities {
            entity.body.set_heal_drop_chance(chance);
        }
    }

    /// Start every enemy that is not running yet. Enemies whose machine
    /// fails to start are logged and dropped.
    pub fn initialise_all(&mut self, services: &mut Services<'_>) {
        let shared = &mut self.shared;
        self.entities.retain_mut(|entity| {
            if entity.is_running() || entity.body.is_dead() {
                return true;
            }
            match entity.initialise(services, shared) {
                Ok(()) => true,
                Err(error) => {
                    report_setup_error(&entity.body, &error);
                    false
                }
            }
        });
        self.adopt_projectiles();
    }

    /// Advance every enemy and bullet by `dt`.
    pub fn tick(&mut self, dt: f32, services: &mut Services<'_>) {
        for entity in &mut self.entities {
            entity.tick(dt, services, &mut self.shared);
        }
        self.adopt_projectiles();

        self.projectiles.retain_mut(|projectile| {
            !projectile
                .step(dt, services.physics, &mut *services.player, &mut *services.effects)
                .is_done()
        });

        self.notify_if_cleared(services);
    }

    /// Tell the room once that its last enemy died.
    fn notify_if_cleared(&mut self, services: &mut Services<'_>) {
        if !self.all_dead_notified && !self.entities.is_empty() && self.alive_count() == 0 {
            self.all_dead_notified = true;
            info!("All enemies in the room are dead");
            services.room.on_all_enemies_dead();
        }
    }

    fn adopt_projectiles(&mut self) {
        for mut projectile in self.shared.fired.drain(..) {
            projectile.id = self.next_projectile;
            self.next_projectile = self.next_projectile.wrapping_add(1);
            self.projectiles.push(projectile);
        }
    }

    /// Route a player hit to an enemy. Unknown ids are ignored.
    pub fn take_damage(
        &mut self,
        id: EnemyId,
        amount: f32,
        point: Vec3,
        direction: Vec3,
        services: &mut Services<'_>,
    ) -> DamageOutcome {
        let Some(entity) = self.entities.iter_mut().find(|e| e.body.id == id) else {
            return DamageOutcome::Ignored;
        };
        let outcome = entity.take_damage(amount, point, direction, services, &mut self.shared);
        self.adopt_projectiles();
        if outcome == DamageOutcome::Killed {
            self.notify_if_cleared(services);
        }
        outcome
    }

    pub fn stun(&mut self, id: EnemyId, duration: f32) -> Result<(), SpawnError> {
        let entity = self.get_mut(id).ok_or(SpawnError::UnknownEnemy(id))?;
        entity.stun(duration);
        Ok(())
    }

    /// Switch every enemy between patrolling and normal speed.
    pub fn set_walking(&mut self, walking: bool) {
        for entity in &mut self.entities {
            entity.body.walking = walking;
        }
    }

    /// Room teardown. Every enemy is stopped and dropped, bullets included.
    pub fn unload_all(&mut self, services: &mut Services<'_>) {
        for entity in &mut self.entities {
            entity.unload(services, &mut self.shared);
        }
        if !self.entities.is_empty() {
            info!("Unloaded {} enemies", self.entities.len());
        }
        self.entities.clear();
        self.projectiles.clear();
        self.shared.fired.clear();
        self.all_dead_notified = false;
    }

    /// Drop enemies whose ragdoll was released. Returns their ids.
    pub fn remove_released(&mut self) -> Vec<EnemyId> {
        let mut removed = Vec::new();
        self.entities.retain(|entity| {
            if entity.body.is_released() {
                removed.push(entity.body.id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn get(&self, id: EnemyId) -> Option<&CombatEntity> {
        self.entities.iter().find(|e| e.body.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut CombatEntity> {
        self.entities.iter_mut().find(|e| e.body.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.entities.iter().filter(|e| !e.body.is_dead()).count()
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Log and skip a spawn failure. Used by room setup.
    pub fn spawn_or_warn(&mut self, catalog: &EnemyCatalog, request: SpawnRequest) -> Option<EnemyId> {
        match self.spawn_enemy(catalog, request) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!("Skipping enemy spawn: {}", error);
                None
            }
        }
    }
}
