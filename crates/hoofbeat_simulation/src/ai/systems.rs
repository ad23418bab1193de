//! AI системы

use bevy::prelude::*;

use crate::logger;
use crate::mount::{DismountRecord, Seats};
use crate::world_clock::{SimSide, WorldClock};

use super::gate::{RideableTaskGate, TaskGate};
use super::tasks::{AiTaskManager, TaskScheduler};

/// Система: запустить requested задачи, которые пропускает гейт
///
/// Не ездовые существа (без Seats) гейта не имеют. Отклонённые запросы
/// выбрасываются: AI попросит снова на следующем решении.
pub fn start_requested_tasks(
    side: Res<SimSide>,
    clock: Res<WorldClock>,
    mut managers: Query<(Entity, &mut AiTaskManager, Option<&Seats>, Option<&DismountRecord>)>,
) {
    if !side.is_authoritative() {
        return;
    }

    for (entity, mut manager, seats, record) in managers.iter_mut() {
        if manager.requested().is_empty() {
            continue;
        }

        let gate = seats.map(|seats| RideableTaskGate::new(seats, record, clock.total_hours));

        for task in manager.take_requested() {
            if gate.as_ref().map_or(true, |gate| gate.should_execute(task)) {
                manager.start_task(task);
            } else {
                logger::log(&format!("{:?}: task {:?} vetoed by rideable gate", entity, task));
            }
        }
    }
}
