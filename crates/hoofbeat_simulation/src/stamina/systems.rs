//! Stamina системы (authoritative)
//!
//! Порядок в SimSet::Stamina:
//! init_stamina_timers → derive_fleeing → handle_fatigue_events → update_stamina → publish_stamina_sync

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{AiTaskKind, AiTaskManager, TaskScheduler};
use crate::components::{BodyState, Health, HealthProvider};
use crate::config::GameplayConstants;
use crate::logger;
use crate::mount::Seats;
use crate::world_clock::{SimSide, WorldClock};
use crate::DeterministicRng;

use super::modifiers::FatigueModifiers;
use super::record::{FatigueCause, FatigueContext, FatigueSource, StaminaRecord};

/// Stamina пересчитывается 4 раза в секунду
pub const STAMINA_UPDATE_INTERVAL: f32 = 0.25;

/// Накопленное время до следующего пересчёта
///
/// Стартовая фаза случайная: существа, загруженные одновременно, не обновляются на одном тике.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct StaminaTimer {
    pub since_last_update: f32,
}

impl StaminaTimer {
    pub fn with_random_phase(rng: &mut impl Rng) -> Self {
        Self {
            since_last_update: rng.gen_range(0.0..STAMINA_UPDATE_INTERVAL),
        }
    }
}

/// Внешняя усталость (атака, погода, ...): проходит через FatigueModifiers
#[derive(Event, Debug, Clone)]
pub struct FatigueEvent {
    pub entity: Entity,
    pub amount: f32,
    pub source: FatigueSource,
}

/// Уставшее существо перестало убегать
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleeCanceled {
    pub entity: Entity,
}

/// Observer event: stamina запись изменилась, пора синхронизировать
#[derive(Event, Debug, Clone)]
pub struct StaminaSynced {
    pub entity: Entity,
    pub record: StaminaRecord,
}

/// Копия stamina на принимающей стороне (только чтение)
#[derive(Component, Debug, Clone, PartialEq)]
pub struct StaminaReplica(pub StaminaRecord);

/// Система: таймер со случайной фазой для новых записей
pub fn init_stamina_timers(
    mut commands: Commands,
    mut rng: ResMut<DeterministicRng>,
    query: Query<Entity, (With<StaminaRecord>, Without<StaminaTimer>)>,
) {
    for entity in query.iter() {
        let timer = StaminaTimer::with_random_phase(&mut rng.rng);
        commands.entity(entity).insert(timer);
    }
}

/// Система: fleeing = есть активная Flee задача
pub fn derive_fleeing(side: Res<SimSide>, mut query: Query<(&mut StaminaRecord, &AiTaskManager)>) {
    if !side.is_authoritative() {
        return;
    }

    for (mut record, tasks) in query.iter_mut() {
        let fleeing = tasks.is_active(AiTaskKind::Flee);
        if record.fleeing != fleeing {
            record.fleeing = fleeing;
            record.mark_dirty();
        }
    }
}

/// Система: внешняя усталость → modifiers → запись
pub fn handle_fatigue_events(
    side: Res<SimSide>,
    constants: Res<GameplayConstants>,
    mut events: EventReader<FatigueEvent>,
    mut query: Query<(&mut StaminaRecord, Option<&FatigueModifiers>, Option<&Health>)>,
) {
    if !side.is_authoritative() {
        events.clear();
        return;
    }

    for event in events.read() {
        let Ok((mut record, modifiers, health)) = query.get_mut(event.entity) else {
            continue;
        };

        let amount = modifiers.map_or(event.amount, |m| m.apply(event.amount, &event.source));
        let ctx = FatigueContext {
            alive: health.map_or(true, |h| h.is_alive()),
            authoritative: true,
            max_multiplier: constants.max_stamina_multiplier,
        };
        record.apply_fatigue(amount, &event.source, ctx);
    }
}

/// Система: пересчёт stamina раз в STAMINA_UPDATE_INTERVAL
///
/// За интервал: clamp → плавание → бегство → реген (если усталости не было)
/// → exhausted → уставший беглец бросает Flee.
pub fn update_stamina(
    time: Res<Time<Fixed>>,
    clock: Res<WorldClock>,
    side: Res<SimSide>,
    constants: Res<GameplayConstants>,
    mut query: Query<(
        Entity,
        &mut StaminaRecord,
        &mut StaminaTimer,
        Option<&BodyState>,
        Option<&Health>,
        Option<&Seats>,
        Option<&mut AiTaskManager>,
        Option<&Transform>,
    )>,
    mut canceled: EventWriter<FleeCanceled>,
) {
    if !side.is_authoritative() {
        return;
    }

    let dt = time.delta_secs();
    let acceleration = clock.time_acceleration();

    for (entity, mut record, mut timer, body, health, seats, tasks, transform) in query.iter_mut() {
        timer.since_last_update += dt;
        if timer.since_last_update < STAMINA_UPDATE_INTERVAL {
            continue;
        }
        let elapsed = std::mem::take(&mut timer.since_last_update);

        let alive = health.map_or(true, |h| h.is_alive());
        let position = transform.map_or(Vec3::ZERO, |t| t.translation);
        let ctx = FatigueContext {
            alive,
            authoritative: true,
            max_multiplier: constants.max_stamina_multiplier,
        };

        record.clamp_current(constants.max_stamina_multiplier);

        if alive {
            let game_seconds = elapsed * acceleration;
            let mut fatiguing = record.actively_fatiguing;

            if body.is_some_and(|b| b.swimming) {
                let amount = record.swimfatigue * game_seconds;
                let source = FatigueSource::internal(FatigueCause::Swim, entity, position);
                fatiguing |= record.apply_fatigue(amount, &source, ctx);
            }

            if record.fleeing {
                let amount = record.sprintfatigue * game_seconds;
                let source = FatigueSource::internal(FatigueCause::Run, entity, position);
                fatiguing |= record.apply_fatigue(amount, &source, ctx);
            }

            if !fatiguing {
                record.regenerate(
                    elapsed,
                    acceleration,
                    health.is_some_and(|h| h.is_wounded()),
                    seats.is_some_and(|s| s.any_mounted()),
                    constants.stamina_regen_multiplier,
                    constants.max_stamina_multiplier,
                );
            }
        }

        record.recompute_exhaustion();
        record.actively_fatiguing = false;
        record.mark_dirty();

        if alive && record.fleeing && record.exhausted && record.dont_flee_when_exhausted {
            if let Some(mut tasks) = tasks {
                if tasks.stop_task(AiTaskKind::Flee) {
                    record.fleeing = false;
                    logger::log_info(&format!(
                        "{:?} too exhausted to flee ({})",
                        entity,
                        record.info_text(constants.max_stamina_multiplier)
                    ));
                    canceled.write(FleeCanceled { entity });
                }
            }
        }
    }
}

/// Система: dirty записи → StaminaSynced (observer)
pub fn publish_stamina_sync(mut commands: Commands, mut query: Query<(Entity, &mut StaminaRecord)>) {
    for (entity, mut record) in query.iter_mut() {
        if !record.is_dirty() {
            continue;
        }
        record.take_dirty();
        commands.trigger(StaminaSynced {
            entity,
            record: record.clone(),
        });
    }
}

/// Observer: зеркалим запись в StaminaReplica
pub fn mirror_stamina_replica(trigger: Trigger<StaminaSynced>, mut commands: Commands) {
    let synced = trigger.event();
    if let Ok(mut entity) = commands.get_entity(synced.entity) {
        entity.insert(StaminaReplica(synced.record.clone()));
    }
}
