//! Targeting and movement helpers shared by every state.

use bevy::math::{Quat, Vec3};

use super::context::EnemyCx;
use crate::world::LayerMask;

/// Rotation that makes an enemy face along `direction` on the ground plane.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z).try_normalize()?;
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Distance on the ground plane.
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    Vec3::new(a.x - b.x, 0.0, a.z - b.z).length()
}

impl EnemyCx<'_> {
    pub fn target_position(&self) -> Vec3 {
        self.player.position()
    }

    pub fn distance_to_target(&self) -> f32 {
        flat_distance(self.body.position, self.player.position())
    }

    pub fn is_target_in_vision_range(&self) -> bool {
        self.player.is_alive() && self.distance_to_target() <= self.body.vision_range()
    }

    pub fn is_target_in_attack_range(&self) -> bool {
        self.player.is_alive() && self.distance_to_target() <= self.body.stats().attack_distance
    }

    /// True when the target is closer than the flee distance. Archetypes
    /// with no flee distance never flee.
    pub fn is_target_in_flee_range(&self) -> bool {
        let flee = self.body.stats().flee_distance;
        flee > 0.0 && self.player.is_alive() && self.distance_to_target() < flee
    }

    /// Clear line of fire to the target within attack distance.
    pub fn is_target_in_sight(&self) -> bool {
        if !self.player.is_alive() {
            return false;
        }
        let height = Vec3::Y * self.tuning.sight_height;
        let from = self.body.position + height;
        let to = self.player.position() + height;
        let Some(direction) = (to - from).try_normalize() else {
            return true;
        };
        let mask = LayerMask::OBSTACLE | LayerMask::PLAYER;
        self.physics
            .raycast(from, direction, self.body.stats().attack_distance, mask)
            .is_some_and(|hit| hit.layer.intersects(LayerMask::PLAYER))
    }

    /// Speed for the current walking mode.
    pub fn movement_speed(&self) -> f32 {
        let stats = self.body.stats();
        if self.body.walking {
            stats.patrolling_speed * stats.patrolling_multiplier
        } else {
            stats.move_speed
        }
    }

    pub fn apply_movement_speed(&mut self) {
        let speed = self.movement_speed();
        self.agent.set_speed(speed);
    }

    pub fn move_to(&mut self, point: Vec3) {
        self.agent.set_destination(point);
    }

    pub fn stop_moving(&mut self) {
        self.agent.stop();
    }

    /// Turn toward the target by `t` of the remaining angle.
    pub fn face_target(&mut self, t: f32) {
        let direction = self.player.position() - self.body.position;
        if let Some(goal) = look_rotation(direction) {
            self.body.rotation = self.body.rotation.slerp(goal, t.clamp(0.0, 1.0));
        }
    }

    /// Turn toward the target at the archetype's angular speed.
    pub fn turn_toward_target(&mut self, dt: f32) {
        let direction = self.player.position() - self.body.position;
        let Some(goal) = look_rotation(direction) else {
            return;
        };
        let max_step = self.body.stats().angular_speed.to_radians() * dt;
        let angle = self.body.rotation.angle_between(goal);
        if angle <= max_step || angle <= f32::EPSILON {
            self.body.rotation = goal;
        } else {
            self.body.rotation = self.body.rotation.slerp(goal, max_step / angle);
        }
    }

    /// Scale the movement animation with the current speed mode.
    pub fn update_anim_speed(&mut self, multiplier: f32) {
        let speed = self.agent.velocity().length();
        let base = self.movement_speed().max(f32::EPSILON);
        self.body.anim_speed = speed / base * multiplier;
    }

    /// Start an attack clip. Ignored while one is already playing.
    pub fn attack(&mut self) -> bool {
        self.body.begin_attack()
    }
}
