//! Should-execute гейты AI задач

use crate::mount::{DismountRecord, Seats};

use super::tasks::AiTaskKind;

/// Сколько календарных часов после высадки маунт не бродит
pub const WANDER_COOLDOWN_HOURS: f64 = 24.0;

pub trait TaskGate {
    fn should_execute(&self, task: AiTaskKind) -> bool;
}

/// Гейт ездового существа
///
/// - Wander запрещён 24 игровых часа после последней высадки
/// - Пока хоть одно место занято, запрещено всё
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RideableTaskGate {
    pub any_mounted: bool,
    pub last_dismount_total_hours: Option<f64>,
    pub total_hours: f64,
}

impl RideableTaskGate {
    pub fn new(seats: &Seats, record: Option<&DismountRecord>, total_hours: f64) -> Self {
        Self {
            any_mounted: seats.any_mounted(),
            last_dismount_total_hours: record.and_then(|r| r.last_dismount_total_hours),
            total_hours,
        }
    }

    fn wander_cooling_down(&self) -> bool {
        self.last_dismount_total_hours
            .is_some_and(|hours| self.total_hours - hours < WANDER_COOLDOWN_HOURS)
    }
}

impl TaskGate for RideableTaskGate {
    fn should_execute(&self, task: AiTaskKind) -> bool {
        if task == AiTaskKind::Wander && self.wander_cooling_down() {
            return false;
        }
        !self.any_mounted
    }
}
