//! [`PhysicsQuery`] backed by the live Rapier context.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::services::{LayerMask, Overlap, PhysicsQuery, RayHit};

/// Borrowed view over Rapier for one simulation tick.
///
/// `classify` maps a collider entity to its gameplay layer, since Rapier
/// collision groups are not used for AI queries.
pub struct RapierQuery<'a> {
    pub context: &'a RapierContext,
    pub classify: &'a dyn Fn(Entity) -> LayerMask,
}

impl PhysicsQuery for RapierQuery<'_> {
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

        let predicate = |entity: Entity| mask.intersects((self.classify)(entity));
        let filter = QueryFilter::default().predicate(&predicate);

        self.context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)
            .map(|(entity, hit)| RayHit {
                point: hit.point,
                normal: hit.normal,
                distance: hit.time_of_impact,
                layer: (self.classify)(entity),
            })
    }

    fn sphere_overlap(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<Overlap> {
        let predicate = |entity: Entity| mask.intersects((self.classify)(entity));
        let filter = QueryFilter::default().predicate(&predicate);
        let shape = Collider::ball(radius);

        let mut hits = Vec::new();
        self.context
            .intersections_with_shape(center, Quat::IDENTITY, &shape, filter, |entity| {
                hits.push(Overlap {
                    layer: (self.classify)(entity),
                });
                true
            });
        hits
    }
}
