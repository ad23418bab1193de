//! Базовые компоненты существ: Health, BodyState, Generation

use bevy::prelude::*;

/// Доля здоровья, ниже которой существо считается раненым (regen penalty)
pub const WOUNDED_HEALTH_FRACTION: f32 = 0.7;

/// Здоровье существа
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Что stamina нужно знать про здоровье
pub trait HealthProvider {
    fn is_alive(&self) -> bool;
    fn is_wounded(&self) -> bool;
}

impl HealthProvider for Health {
    fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    fn is_wounded(&self) -> bool {
        self.current < self.max * WOUNDED_HEALTH_FRACTION
    }
}

/// Физическое состояние тела (пишут physics/world queries, читают locomotion + stamina)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BodyState {
    pub on_ground: bool,
    pub swimming: bool,
    pub collided_horizontally: bool,
    /// Нормаль грани, по которой лезем (None = не climbing)
    pub climbing_face: Option<Vec3>,
    /// Entity type разворачивает модель на стене: только тогда режем walk vector
    pub rotate_model_on_climb: bool,
    /// Смещение swim line от низа тела
    pub swimming_offset_y: f32,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            on_ground: true,
            swimming: false,
            collided_horizontally: false,
            climbing_face: None,
            rotate_model_on_climb: false,
            swimming_offset_y: 0.6,
        }
    }
}

/// Поколение приручённого существа (0 = дикое)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Generation(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100.0);

        health.take_damage(30.0);
        assert_eq!(health.current, 70.0);
        assert!(health.is_alive());
        // Ровно 70%: ещё не ранен
        assert!(!health.is_wounded());

        health.take_damage(1.0);
        assert!(health.is_wounded());

        health.take_damage(500.0);
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal_clamped() {
        let mut health = Health::new(50.0);
        health.take_damage(40.0);
        health.heal(100.0);
        assert_eq!(health.current, 50.0);
    }
}
