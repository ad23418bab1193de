//! AI планировщик (минимальный)
//!
//! Задачи + should-execute гейты. Решения "что хотеть": снаружи (request),
//! здесь только запуск через гейт и принудительная остановка (stamina → Flee).

use bevy::prelude::*;

use crate::SimSet;

pub mod gate;
pub mod systems;
pub mod tasks;

// Re-export основных типов
pub use gate::{RideableTaskGate, TaskGate, WANDER_COOLDOWN_HOURS};
pub use tasks::{AiTaskKind, AiTaskManager, TaskScheduler};

/// AI Plugin
///
/// Работает в FixedUpdate (SimSet::Ai), после stamina: сначала stamina снимает
/// Flee у уставших, потом стартуют новые задачи.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, systems::start_requested_tasks.in_set(SimSet::Ai));
    }
}
