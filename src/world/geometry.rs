//! Room geometry: headless collision queries and obstacle spawning.
//!
//! [`RoomGeometry`] is the room's blocking layout as plain boxes. It answers
//! navigation sampling for every enemy in the room, and doubles as a
//! physics backend when the simulation runs without Rapier.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::services::{LayerMask, NavigationArea, Overlap, PhysicsQuery, RayHit};

/// Marker for everything spawned for the active room.
#[derive(Component)]
pub struct RoomEntity;

/// Axis-aligned box obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Obstacle {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
        }
    }

    fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Footprint test on the ground plane.
    fn contains_xz(&self, point: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.z >= min.z && point.z <= max.z
    }

    /// Slab test. Returns distance and surface normal of the entry point.
    /// Rays starting inside the box do not hit it.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        let (min, max) = (self.min(), self.max());
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < f32::EPSILON {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }

            let mut t1 = (min[axis] - o) / d;
            let mut t2 = (max[axis] - o) / d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            if t1 > t_enter {
                t_enter = t1;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t2);

            if t_enter > t_exit {
                return None;
            }
        }

        (t_enter >= 0.0 && t_enter <= max_distance).then_some((t_enter, normal))
    }

    fn overlaps_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min(), self.max());
        closest.distance_squared(center) <= radius * radius
    }
}

/// Blocking layout of a room plus the player's body.
#[derive(Resource, Debug, Clone, Default)]
pub struct RoomGeometry {
    pub min: Vec2,
    pub max: Vec2,
    pub obstacles: Vec<Obstacle>,
    player: Option<(Vec3, f32)>,
}

impl RoomGeometry {
    /// Room spanning `min..max` on the ground plane, enclosed by four walls.
    pub fn new(min: Vec2, max: Vec2, wall_height: f32) -> Self {
        let size = max - min;
        let center = (min + max) * 0.5;
        let thickness = 1.0;
        let y = wall_height * 0.5;

        let walls = [
            Obstacle::new(
                Vec3::new(center.x, y, min.y - thickness * 0.5),
                Vec3::new(size.x + thickness * 2.0, wall_height, thickness),
            ),
            Obstacle::new(
                Vec3::new(center.x, y, max.y + thickness * 0.5),
                Vec3::new(size.x + thickness * 2.0, wall_height, thickness),
            ),
            Obstacle::new(
                Vec3::new(min.x - thickness * 0.5, y, center.y),
                Vec3::new(thickness, wall_height, size.y),
            ),
            Obstacle::new(
                Vec3::new(max.x + thickness * 0.5, y, center.y),
                Vec3::new(thickness, wall_height, size.y),
            ),
        ];

        Self {
            min,
            max,
            obstacles: walls.to_vec(),
            player: None,
        }
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Update the player's collision sphere. `None` removes it.
    pub fn set_player(&mut self, body: Option<(Vec3, f32)>) {
        self.player = body;
    }

    fn in_bounds(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.y && point.z <= self.max.y
    }
}

fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let b = offset.dot(direction);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

impl PhysicsQuery for RoomGeometry {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let mut best: Option<RayHit> = None;
        let mut consider = |distance: f32, normal: Vec3, layer: LayerMask| {
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit {
                    point: origin + direction * distance,
                    normal,
                    distance,
                    layer,
                });
            }
        };

        if mask.intersects(LayerMask::OBSTACLE) {
            for obstacle in &self.obstacles {
                if let Some((distance, normal)) = obstacle.raycast(origin, direction, max_distance) {
                    consider(distance, normal, LayerMask::OBSTACLE);
                }
            }
        }

        if mask.intersects(LayerMask::PLAYER) {
            if let Some((center, radius)) = self.player {
                if let Some(distance) = ray_sphere(origin, direction, center, radius) {
                    if distance <= max_distance {
                        let point = origin + direction * distance;
                        consider(distance, (point - center).normalize_or_zero(), LayerMask::PLAYER);
                    }
                }
            }
        }

        best
    }

    fn sphere_overlap(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Overlap> {
        let mut hits = Vec::new();

        if mask.intersects(LayerMask::OBSTACLE) {
            hits.extend(
                self.obstacles
                    .iter()
                    .filter(|o| o.overlaps_sphere(center, radius))
                    .map(|_| Overlap {
                        layer: LayerMask::OBSTACLE,
                    }),
            );
        }

        if mask.intersects(LayerMask::PLAYER) {
            if let Some((player, player_radius)) = self.player {
                if player.distance(center) <= radius + player_radius {
                    hits.push(Overlap {
                        layer: LayerMask::PLAYER,
                    });
                }
            }
        }

        hits
    }
}

impl NavigationArea for RoomGeometry {
    fn sample_position(&self, point: Vec3, _max_distance: f32) -> Option<Vec3> {
        let walkable = self.in_bounds(point) && !self.obstacles.iter().any(|o| o.contains_xz(point));
        walkable.then_some(point)
    }
}

/// Spawn a blocking box for the active room.
pub fn spawn_obstacle(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    obstacle: &Obstacle,
) {
    let size = obstacle.half_extents * 2.0;

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
        MeshMaterial3d(materials.add(StandardMaterial::from(Color::srgb(0.35, 0.35, 0.4)))),
        Transform::from_translation(obstacle.center),
        Collider::cuboid(obstacle.half_extents.x, obstacle.half_extents.y, obstacle.half_extents.z),
        RoomEntity,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomGeometry {
        RoomGeometry::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0), 4.0)
            .with_obstacle(Obstacle::new(Vec3::new(0.0, 1.0, 5.0), Vec3::new(2.0, 2.0, 2.0)))
    }

    #[test]
    fn ray_hits_nearest_obstacle_with_normal() {
        let hit = room()
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 100.0, LayerMask::OBSTACLE)
            .unwrap();

        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::NEG_Z);
        assert_eq!(hit.layer, LayerMask::OBSTACLE);
    }

    #[test]
    fn ray_respects_max_distance_and_mask() {
        let geometry = room();

        assert!(geometry
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 3.0, LayerMask::OBSTACLE)
            .is_none());
        assert!(geometry
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 100.0, LayerMask::PLAYER)
            .is_none());
    }

    #[test]
    fn player_in_front_of_wall_is_hit_first() {
        let mut geometry = room();
        geometry.set_player(Some((Vec3::new(0.0, 1.0, 2.0), 0.5)));

        let hit = geometry
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 100.0, LayerMask::ALL)
            .unwrap();

        assert_eq!(hit.layer, LayerMask::PLAYER);
        assert!((hit.distance - 1.5).abs() < 1e-4);
    }

    #[test]
    fn outer_walls_enclose_the_room() {
        let hit = room()
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 100.0, LayerMask::OBSTACLE)
            .unwrap();

        assert!((hit.point.x - 10.0).abs() < 1e-4);
        assert_eq!(hit.normal, Vec3::NEG_X);
    }

    #[test]
    fn sampling_rejects_blocked_and_outside_points() {
        let geometry = room();

        assert!(geometry.sample_position(Vec3::new(3.0, 0.0, 3.0), 0.5).is_some());
        assert!(geometry.sample_position(Vec3::new(0.0, 0.0, 5.0), 0.5).is_none());
        assert!(geometry.sample_position(Vec3::new(30.0, 0.0, 0.0), 0.5).is_none());
    }
}
