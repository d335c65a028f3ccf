//! Player-side combat components.

use bevy::prelude::*;

/// Height of the player's body centre above the ground.
pub const PLAYER_CENTER_HEIGHT: f32 = 1.0;

/// Radius enemies aim at and hit.
pub const PLAYER_HIT_RADIUS: f32 = 0.5;

/// Marker component for the player entity.
#[derive(Component)]
pub struct Player;

/// Component for entities that can take damage.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
        }
    }

    /// Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.clamp(0.0, self.current);
        self.current -= actual;
        actual
    }

    /// Returns the hit points actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let actual = amount.clamp(0.0, self.maximum - self.current);
        self.current += actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        if self.maximum <= 0.0 {
            return 0.0;
        }
        self.current / self.maximum
    }
}

/// Marks a dead player so the death is only handled once.
#[derive(Component)]
pub struct Dead;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_and_heal_are_clamped() {
        let mut health = Health::new(50.0);

        assert_eq!(health.take_damage(80.0), 50.0);
        assert!(health.is_dead());
        assert_eq!(health.take_damage(-5.0), 0.0);

        assert_eq!(health.heal(30.0), 30.0);
        assert_eq!(health.heal(30.0), 20.0);
        assert_eq!(health.percentage(), 1.0);
    }
}
