//! Reflecting aim laser of the sniper boss.

use bevy::math::Vec3;

use crate::world::{LayerMask, PhysicsQuery};

/// How far a single laser segment reaches.
pub const LASER_RANGE: f32 = 300.0;

/// Bounces whose direction barely changes, or nearly reverses, are dropped.
pub const DEGENERATE_BOUNCE_DOT: f32 = 0.96;

/// Nodes are pulled back from the surface so the next cast starts in free space.
const SURFACE_OFFSET: f32 = 0.2;

/// Mirror `direction` about the plane with unit normal `normal`.
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Trace the laser from `origin` along `direction` for at most `segments` casts.
///
/// Returns one node per segment: the bounce point for every wall hit, or the
/// far end of the ray when it escapes. Hitting the player ends the path. The
/// first wall hit is always kept; a later degenerate bounce truncates the
/// path before the node of that bounce.
pub fn compute_laser_path(
    physics: &dyn PhysicsQuery,
    origin: Vec3,
    direction: Vec3,
    segments: usize,
) -> Vec<Vec3> {
    let mask = LayerMask::OBSTACLE | LayerMask::PLAYER;
    let mut path = Vec::with_capacity(segments);
    let mut from = origin;
    let mut dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return path;
    }

    for i in 0..segments {
        let Some(hit) = physics.raycast(from, dir, LASER_RANGE, mask) else {
            path.push(from + dir * LASER_RANGE);
            break;
        };

        if hit.layer.intersects(LayerMask::PLAYER) {
            path.push(hit.point);
            break;
        }

        let reflected = reflect(dir, hit.normal).normalize_or_zero();
        if i > 0 && reflected.dot(dir).abs() > DEGENERATE_BOUNCE_DOT {
            break;
        }

        let node = hit.point - dir * SURFACE_OFFSET;
        path.push(node);
        from = node;
        dir = reflected;
    }
    path
}
