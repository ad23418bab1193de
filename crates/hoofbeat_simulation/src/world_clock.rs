//! Мировые часы + сторона симуляции
//!
//! - `WorldClock.elapsed_ms`: монотонное время симуляции (debounce, jump cooldown)
//! - `WorldClock.total_hours`: календарь (dismount cooldown для wander AI)
//! - `time_acceleration()` = speed_of_time × calendar_speed_mul (stamina масштабируется им)
//! - `SimSide`: authoritative (server) или replica (client)

use bevy::prelude::*;

use crate::SimSet;

/// Физический кадр симуляции (секунды). FixedUpdate крутится с этой частотой.
pub const PHYSICS_FRAME_TIME: f32 = 1.0 / 30.0;

#[derive(Resource, Debug, Clone)]
pub struct WorldClock {
    pub elapsed_ms: i64,
    pub total_hours: f64,
    /// Игровых секунд на одну реальную
    pub speed_of_time: f32,
    pub calendar_speed_mul: f32,
    /// Накопленная дробная часть миллисекунд (не теряем точность на 30Hz)
    carry_ms: f64,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self {
            elapsed_ms: 0,
            total_hours: 0.0,
            speed_of_time: 60.0,
            calendar_speed_mul: 0.5,
            carry_ms: 0.0,
        }
    }
}

impl WorldClock {
    pub fn time_acceleration(&self) -> f32 {
        self.speed_of_time * self.calendar_speed_mul
    }

    /// Продвинуть часы на `dt` реальных секунд
    pub fn advance(&mut self, dt: f32) {
        let ms = dt as f64 * 1000.0 + self.carry_ms;
        let whole = ms.floor();
        self.carry_ms = ms - whole;
        self.elapsed_ms += whole as i64;

        self.total_hours += dt as f64 * self.time_acceleration() as f64 / 3600.0;
    }
}

/// Где крутится этот App
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimSide {
    /// Authoritative: меняет gait, stamina, сессию
    #[default]
    Server,
    /// Replica: только наблюдает + косметика (звук, плавный yaw)
    Client,
}

impl SimSide {
    pub fn is_authoritative(&self) -> bool {
        matches!(self, SimSide::Server)
    }
}

/// Клиент на паузе: render sampler ставит звук на паузу
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct GamePaused(pub bool);

/// Система: часы идут вместе с FixedUpdate
pub fn advance_world_clock(mut clock: ResMut<WorldClock>, time: Res<Time<Fixed>>) {
    clock.advance(time.delta_secs());
}

pub struct WorldClockPlugin;

impl Plugin for WorldClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldClock>()
            .init_resource::<SimSide>()
            .init_resource::<GamePaused>()
            .add_systems(FixedUpdate, advance_world_clock.in_set(SimSet::Clock));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_ms_without_drift() {
        let mut clock = WorldClock::default();
        for _ in 0..30 {
            clock.advance(PHYSICS_FRAME_TIME);
        }
        // 30 кадров по 33.33ms = 1000ms (±1 на float)
        assert!((clock.elapsed_ms - 1000).abs() <= 1, "elapsed = {}", clock.elapsed_ms);
    }

    #[test]
    fn test_calendar_hours_scale_with_acceleration() {
        let mut clock = WorldClock::default();
        assert_eq!(clock.time_acceleration(), 30.0);

        // 120 реальных секунд × 30 = 3600 игровых = 1 час
        clock.advance(120.0);
        assert!((clock.total_hours - 1.0).abs() < 1e-6);
    }
}
