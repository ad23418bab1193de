//! AI задачи существа: requested → (gate) → active
//!
//! Полноценного AI тут нет: задачи: это просто слоты, которые гейты разрешают
//! или запрещают, а stamina умеет принудительно снять Flee.

use bevy::prelude::*;

/// Вид AI задачи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AiTaskKind {
    Idle,
    Wander,
    Flee,
    Graze,
    LookAround,
}

/// Что stamina/гейтам нужно от AI планировщика
pub trait TaskScheduler {
    fn active_tasks(&self) -> &[AiTaskKind];

    /// false: задача уже активна
    fn start_task(&mut self, task: AiTaskKind) -> bool;

    /// false: такой задачи не было
    fn stop_task(&mut self, task: AiTaskKind) -> bool;

    fn is_active(&self, task: AiTaskKind) -> bool {
        self.active_tasks().contains(&task)
    }
}

/// Менеджер задач (порядок active = порядок запуска)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AiTaskManager {
    active: Vec<AiTaskKind>,
    requested: Vec<AiTaskKind>,
}

impl AiTaskManager {
    /// Попросить задачу (стартует на ближайшем AI тике, если гейт пустит)
    pub fn request(&mut self, task: AiTaskKind) {
        if !self.requested.contains(&task) {
            self.requested.push(task);
        }
    }

    pub fn requested(&self) -> &[AiTaskKind] {
        &self.requested
    }

    pub fn take_requested(&mut self) -> Vec<AiTaskKind> {
        std::mem::take(&mut self.requested)
    }
}

impl TaskScheduler for AiTaskManager {
    fn active_tasks(&self) -> &[AiTaskKind] {
        &self.active
    }

    fn start_task(&mut self, task: AiTaskKind) -> bool {
        if self.active.contains(&task) {
            return false;
        }
        self.active.push(task);
        true
    }

    fn stop_task(&mut self, task: AiTaskKind) -> bool {
        let before = self.active.len();
        self.active.retain(|active| *active != task);
        self.active.len() != before
    }
}
