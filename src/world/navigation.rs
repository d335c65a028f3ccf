//! Per-enemy steering agent.

use bevy::math::Vec3;

use super::services::NavigationAgent;

/// Distance under which an agent with zero stopping distance counts as arrived.
const ARRIVE_EPSILON: f32 = 0.05;

/// Straight-line mover on the ground plane.
///
/// Each enemy owns one, so destination requests never leak between
/// entities. Height is left to the caller.
#[derive(Debug, Clone)]
pub struct SteeringAgent {
    position: Vec3,
    destination: Option<Vec3>,
    velocity: Vec3,
    speed: f32,
    stopping_distance: f32,
    enabled: bool,
    stopped: bool,
}

impl SteeringAgent {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            destination: None,
            velocity: Vec3::ZERO,
            speed,
            stopping_distance: 0.0,
            enabled: true,
            stopped: false,
        }
    }

    fn remaining(&self) -> Option<f32> {
        self.destination.map(|d| planar(d - self.position).length())
    }
}

fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

impl NavigationAgent for SteeringAgent {
    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.stopped = false;
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.velocity = Vec3::ZERO;
    }

    fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn is_at_destination(&self) -> bool {
        self.remaining()
            .map_or(true, |d| d <= self.stopping_distance.max(ARRIVE_EPSILON))
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_stopping_distance(&mut self, distance: f32) {
        self.stopping_distance = distance.max(0.0);
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.velocity = Vec3::ZERO;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn advance(&mut self, position: Vec3, dt: f32) -> Vec3 {
        self.position = position;
        self.velocity = Vec3::ZERO;

        if !self.enabled || self.stopped || dt <= 0.0 {
            return position;
        }

        let Some(destination) = self.destination else {
            return position;
        };

        let offset = planar(destination - position);
        let distance = offset.length();
        let travel = (distance - self.stopping_distance).min(self.speed * dt);
        if travel <= 0.0 {
            return position;
        }

        let direction = offset / distance;
        self.position = position + direction * travel;
        self.velocity = direction * (travel / dt);
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_at_speed_and_stops_at_destination() {
        let mut agent = SteeringAgent::new(Vec3::ZERO, 2.0);
        agent.set_destination(Vec3::new(3.0, 0.0, 0.0));

        let p = agent.advance(Vec3::ZERO, 1.0);
        assert_eq!(p, Vec3::new(2.0, 0.0, 0.0));
        assert!((agent.velocity().length() - 2.0).abs() < 1e-5);
        assert!(!agent.is_at_destination());

        let p = agent.advance(p, 1.0);
        assert_eq!(p, Vec3::new(3.0, 0.0, 0.0));
        assert!(agent.is_at_destination());
    }

    #[test]
    fn keeps_stopping_distance() {
        let mut agent = SteeringAgent::new(Vec3::ZERO, 10.0);
        agent.set_stopping_distance(4.0);
        agent.set_destination(Vec3::new(0.0, 0.0, 5.0));

        let p = agent.advance(Vec3::ZERO, 1.0);
        assert!((p.z - 1.0).abs() < 1e-5);
        assert!(agent.is_at_destination());
    }

    #[test]
    fn stopped_or_disabled_agents_stay_put() {
        let mut agent = SteeringAgent::new(Vec3::ZERO, 1.0);
        agent.set_destination(Vec3::X * 5.0);
        agent.stop();
        assert_eq!(agent.advance(Vec3::ZERO, 1.0), Vec3::ZERO);

        agent.set_destination(Vec3::X * 5.0);
        agent.set_enabled(false);
        assert_eq!(agent.advance(Vec3::ZERO, 1.0), Vec3::ZERO);
        assert_eq!(agent.velocity(), Vec3::ZERO);
    }
}
