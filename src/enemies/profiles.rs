//! Attack profiles: how each archetype turns an attack into damage.

use bevy::math::{Quat, Vec3};
use rand::Rng;
use serde::Deserialize;

use super::context::EnemyCx;
use super::data::CountRange;
use super::laser::LASER_RANGE;
use super::projectiles::Projectile;
use crate::world::{CombatCue, LayerMask, SoundCue};

/// Extra reach of straight bullets past the attack distance.
const BULLET_RANGE_MARGIN: f32 = 10.0;

fn default_laser_delay() -> f32 {
    0.25
}

fn default_laser_segments() -> usize {
    3
}

/// Attack behaviour selected per archetype.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub enum AttackProfile {
    /// Hits whatever stands in a sphere in front of the enemy.
    Melee { hit_radius: f32, hit_reach: f32 },
    /// A burst of straight bullets fanned around the aim direction.
    Shotgun {
        bullet_speed: f32,
        /// Degrees.
        spread_angle: f32,
        bullets: CountRange,
    },
    /// One straight bullet per attack, fired after an aim.
    Sniper {
        bullet_speed: f32,
        #[serde(default)]
        can_reload: bool,
    },
    /// Like `Sniper`, but the enemy never leaves its post.
    StationaryAimed {
        bullet_speed: f32,
        #[serde(default)]
        can_reload: bool,
    },
    /// Aims a reflecting laser, then fires a bullet along it.
    BossSniper {
        bullet_speed: f32,
        yellow_duration: f32,
        red_duration: f32,
        /// Keep tracking the player while the laser is red.
        #[serde(default)]
        aim_during_red: bool,
        #[serde(default = "default_laser_segments")]
        laser_segments: usize,
        /// Delay before the laser first shows up.
        #[serde(default = "default_laser_delay")]
        laser_delay: f32,
    },
}

impl AttackProfile {
    /// True when the enemy waits for a reload after every attack.
    pub fn reloads(&self) -> bool {
        match self {
            AttackProfile::Sniper { can_reload, .. }
            | AttackProfile::StationaryAimed { can_reload, .. } => *can_reload,
            _ => false,
        }
    }

    /// Patrol points an archetype needs to be spawned at all.
    pub fn min_patrol_points(&self) -> usize {
        match self {
            AttackProfile::BossSniper { .. } => 1,
            _ => 0,
        }
    }

    /// Resolve the `Hit` callback of an attack clip.
    pub fn resolve_hit(&self, cx: &mut EnemyCx<'_>) {
        let id = cx.body.id;
        let target = cx.player.position();

        match self {
            AttackProfile::Melee {
                hit_radius,
                hit_reach,
            } => {
                let center = cx.body.position
                    + Vec3::Y * cx.body.archetype.muzzle_height
                    + cx.body.forward() * *hit_reach;
                cx.effects
                    .emit(CombatCue::sound(SoundCue::MeleeSwing, cx.body.position));
                let touched = cx.physics.sphere_overlap(center, *hit_radius, LayerMask::PLAYER);
                if !touched.is_empty() {
                    let damage = cx.body.roll_damage(cx.rng);
                    cx.player.apply_damage(damage, id);
                }
            }
            AttackProfile::Shotgun {
                bullet_speed,
                spread_angle,
                bullets,
            } => {
                let muzzle = cx.body.muzzle();
                let aim = flat_aim(muzzle, target, cx.body.forward());
                let range = cx.body.stats().attack_distance + BULLET_RANGE_MARGIN;
                let count = bullets.random(cx.rng).max(1);

                for i in 0..count {
                    let direction = if i == 0 {
                        aim
                    } else {
                        let side: f32 = if cx.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                        let angle = side * cx.rng.gen_range(0.25f32..=0.5) * *spread_angle;
                        Quat::from_rotation_y(angle.to_radians()) * aim
                    };
                    let damage = cx.body.roll_damage(cx.rng);
                    cx.projectiles.push(Projectile::straight(
                        id,
                        muzzle,
                        direction,
                        *bullet_speed,
                        damage,
                        range,
                    ));
                }
                cx.effects.emit(CombatCue::MuzzleFlash { enemy: id });
                cx.effects.emit(CombatCue::sound(SoundCue::ShotgunShot, muzzle));
            }
            AttackProfile::Sniper { bullet_speed, .. }
            | AttackProfile::StationaryAimed { bullet_speed, .. } => {
                let muzzle = cx.body.muzzle();
                let aim = flat_aim(muzzle, target, cx.body.forward());
                let range = cx.body.stats().attack_distance + BULLET_RANGE_MARGIN;
                let damage = cx.body.roll_damage(cx.rng);
                cx.projectiles.push(Projectile::straight(
                    id,
                    muzzle,
                    aim,
                    *bullet_speed,
                    damage,
                    range,
                ));
                cx.effects.emit(CombatCue::MuzzleFlash { enemy: id });
                cx.effects.emit(CombatCue::sound(SoundCue::SniperShot, muzzle));
            }
            AttackProfile::BossSniper { bullet_speed, .. } => {
                let muzzle = cx.body.muzzle();
                let nodes = if cx.body.laser_path.is_empty() {
                    let forward = cx.body.forward();
                    let mask = LayerMask::OBSTACLE | LayerMask::PLAYER;
                    let end = cx
                        .physics
                        .raycast(muzzle, forward, LASER_RANGE, mask)
                        .map_or(muzzle + forward * LASER_RANGE, |hit| hit.point);
                    vec![end]
                } else {
                    cx.body.laser_path.clone()
                };
                let damage = cx.body.roll_damage(cx.rng);
                cx.projectiles.push(Projectile::tracking(
                    id,
                    muzzle,
                    nodes,
                    *bullet_speed,
                    damage,
                ));
                cx.effects.emit(CombatCue::MuzzleFlash { enemy: id });
                cx.effects
                    .emit(CombatCue::sound(SoundCue::BossSniperShot, muzzle));
            }
        }
    }
}

/// Horizontal direction from `from` to `to`, or `fallback` when they overlap.
fn flat_aim(from: Vec3, to: Vec3, fallback: Vec3) -> Vec3 {
    let offset = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    offset.try_normalize().unwrap_or(fallback)
}
