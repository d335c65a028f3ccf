//! Enemy bullets in flight.

use bevy::math::Vec3;

use super::components::EnemyId;
use crate::world::{CombatCue, EffectsSink, ImpactSurface, LayerMask, PhysicsQuery, PlayerTarget};

/// How a bullet moves.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileKind {
    /// Flies along `direction` until it hits something or covers `max_distance`.
    Straight { direction: Vec3, max_distance: f32 },
    /// Follows a laser path node by node. Walls do not stop it.
    Tracking { nodes: Vec<Vec3>, next: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileStatus {
    Flying,
    HitPlayer,
    HitWall,
    Expired,
}

impl ProjectileStatus {
    pub fn is_done(self) -> bool {
        self != ProjectileStatus::Flying
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Assigned by the manager when the bullet is adopted.
    pub id: u32,
    pub owner: EnemyId,
    pub position: Vec3,
    pub damage: f32,
    pub speed: f32,
    pub traveled: f32,
    pub kind: ProjectileKind,
}

impl Projectile {
    pub fn straight(owner: EnemyId, origin: Vec3, direction: Vec3, speed: f32, damage: f32, max_distance: f32) -> Self {
        Self {
            id: 0,
            owner,
            position: origin,
            damage,
            speed,
            traveled: 0.0,
            kind: ProjectileKind::Straight {
                direction: direction.normalize_or_zero(),
                max_distance,
            },
        }
    }

    pub fn tracking(owner: EnemyId, origin: Vec3, nodes: Vec<Vec3>, speed: f32, damage: f32) -> Self {
        Self {
            id: 0,
            owner,
            position: origin,
            damage,
            speed,
            traveled: 0.0,
            kind: ProjectileKind::Tracking { nodes, next: 0 },
        }
    }

    /// Move the bullet by one tick, resolving whatever it runs into.
    pub fn step(
        &mut self,
        dt: f32,
        physics: &dyn PhysicsQuery,
        player: &mut dyn PlayerTarget,
        effects: &mut dyn EffectsSink,
    ) -> ProjectileStatus {
        let budget = self.speed * dt;
        if budget <= 0.0 {
            return ProjectileStatus::Flying;
        }

        let status = match &mut self.kind {
            ProjectileKind::Straight {
                direction,
                max_distance,
            } => {
                let step = budget.min((*max_distance - self.traveled).max(0.0));
                let mask = LayerMask::PLAYER | LayerMask::OBSTACLE;
                match physics.raycast(self.position, *direction, step, mask) {
                    Some(hit) => {
                        self.position = hit.point;
                        self.traveled += hit.distance;
                        if hit.layer.intersects(LayerMask::PLAYER) {
                            ProjectileStatus::HitPlayer
                        } else {
                            ProjectileStatus::HitWall
                        }
                    }
                    None => {
                        self.position += *direction * step;
                        self.traveled += step;
                        if self.traveled >= *max_distance {
                            ProjectileStatus::Expired
                        } else {
                            ProjectileStatus::Flying
                        }
                    }
                }
            }
            ProjectileKind::Tracking { nodes, next } => {
                let mut remaining = budget;
                let mut status = ProjectileStatus::Flying;
                while remaining > 0.0 {
                    let Some(&target) = nodes.get(*next) else {
                        status = ProjectileStatus::Expired;
                        break;
                    };
                    let offset = target - self.position;
                    let length = offset.length();
                    let step = remaining.min(length);
                    if step > 0.0 {
                        let direction = offset / length;
                        if let Some(hit) = physics.raycast(self.position, direction, step, LayerMask::PLAYER) {
                            self.position = hit.point;
                            self.traveled += hit.distance;
                            status = ProjectileStatus::HitPlayer;
                            break;
                        }
                        self.position += direction * step;
                        self.traveled += step;
                    }
                    remaining -= step;
                    if step >= length {
                        *next += 1;
                    }
                }
                if status == ProjectileStatus::Flying && *next >= nodes.len() {
                    status = ProjectileStatus::Expired;
                }
                status
            }
        };

        match status {
            ProjectileStatus::HitPlayer => {
                player.apply_damage(self.damage, self.owner);
                effects.emit(CombatCue::ProjectileImpact {
                    position: self.position,
                    surface: ImpactSurface::Player,
                });
            }
            ProjectileStatus::HitWall => {
                effects.emit(CombatCue::ProjectileImpact {
                    position: self.position,
                    surface: ImpactSurface::Wall,
                });
            }
            _ => {}
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{CueBuffer, Obstacle, PlayerSnapshot, RoomGeometry};
    use bevy::math::Vec2;

    fn room() -> RoomGeometry {
        RoomGeometry::new(Vec2::splat(-20.0), Vec2::splat(20.0), 3.0)
    }

    #[test]
    fn straight_bullet_damages_player() {
        let mut geometry = room();
        geometry.set_player(Some((Vec3::new(0.0, 1.0, -5.0), 0.5)));
        let mut player = PlayerSnapshot::new(Vec3::new(0.0, 0.0, -5.0));
        let mut effects = CueBuffer::default();
        let mut bullet = Projectile::straight(EnemyId(1), Vec3::Y, Vec3::NEG_Z, 10.0, 7.0, 30.0);

        assert_eq!(bullet.step(0.1, &geometry, &mut player, &mut effects), ProjectileStatus::Flying);
        let mut status = ProjectileStatus::Flying;
        for _ in 0..10 {
            status = bullet.step(0.1, &geometry, &mut player, &mut effects);
            if status.is_done() {
                break;
            }
        }

        assert_eq!(status, ProjectileStatus::HitPlayer);
        assert_eq!(player.total_damage(), 7.0);
        assert_eq!(effects.count(|c| matches!(c, CombatCue::ProjectileImpact { surface: ImpactSurface::Player, .. })), 1);
    }

    #[test]
    fn straight_bullet_stops_at_walls_and_expires() {
        let geometry = room().with_obstacle(Obstacle::new(Vec3::new(0.0, 1.0, -3.0), Vec3::new(4.0, 2.0, 1.0)));
        let mut player = PlayerSnapshot::new(Vec3::new(0.0, 0.0, -8.0));
        let mut effects = CueBuffer::default();

        let mut blocked = Projectile::straight(EnemyId(1), Vec3::Y, Vec3::NEG_Z, 100.0, 5.0, 30.0);
        assert_eq!(blocked.step(0.1, &geometry, &mut player, &mut effects), ProjectileStatus::HitWall);

        let mut short = Projectile::straight(EnemyId(1), Vec3::Y, Vec3::X, 100.0, 5.0, 2.0);
        assert_eq!(short.step(0.1, &geometry, &mut player, &mut effects), ProjectileStatus::Expired);
        assert!(player.hits.is_empty());
    }

    #[test]
    fn tracking_bullet_ignores_walls_and_expires_after_last_node() {
        let geometry = room().with_obstacle(Obstacle::new(Vec3::new(2.0, 1.0, 0.0), Vec3::new(1.0, 2.0, 4.0)));
        let mut player = PlayerSnapshot::new(Vec3::new(0.0, 0.0, 10.0));
        let mut effects = CueBuffer::default();
        let nodes = vec![Vec3::new(4.0, 1.0, 0.0), Vec3::new(4.0, 1.0, 4.0)];
        let mut bullet = Projectile::tracking(EnemyId(2), Vec3::Y, nodes, 3.0, 5.0);

        assert_eq!(bullet.step(1.0, &geometry, &mut player, &mut effects), ProjectileStatus::Flying);
        assert_eq!(bullet.step(1.0, &geometry, &mut player, &mut effects), ProjectileStatus::Flying);
        assert_eq!(bullet.step(2.0, &geometry, &mut player, &mut effects), ProjectileStatus::Expired);
        assert!((bullet.position - Vec3::new(4.0, 1.0, 4.0)).length() < 1e-4);
        assert!(effects.cues.is_empty());
    }
}
