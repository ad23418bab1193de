//! Spawn helpers для ездовых существ

use bevy::prelude::*;

use crate::ai::AiTaskManager;
use crate::components::{AttachedGear, Generation, Health};
use crate::config::EntityTypeConfig;
use crate::error::SetupError;
use crate::physics::spawn_kinematic_mount;
use crate::stamina::StaminaRecord;

use super::seat::Seats;
use super::{DismountRecord, Rideable};

/// Слотов снаряжения у маунта (седло, сумки, ...)
pub const GEAR_SLOTS: usize = 4;

/// Спавн ездового существа из entity type конфига
///
/// Kinematic тело + Rideable + места + stamina + AI. Сессию создаёт
/// `setup_rideables` на следующем тике. Без gait секции entity всё равно
/// спавнится: setup залогирует фатальную ошибку и не даст на ней ездить.
pub fn spawn_rideable(
    commands: &mut Commands,
    config: &EntityTypeConfig,
    seats: Seats,
    position: Vec3,
) -> Result<Entity, SetupError> {
    let rideable = config
        .rideable
        .clone()
        .ok_or_else(|| SetupError::NotRideable(config.code.clone()))?;
    let gaits = config.gait_table()?;
    let stamina = StaminaRecord::seeded(&config.stamina.clone().unwrap_or_default());

    let entity = spawn_kinematic_mount(commands, position, 0.0);
    let mut entity_commands = commands.entity(entity);
    entity_commands.insert((
        Rideable { config: rideable },
        seats,
        Health::default(),
        Generation::default(),
        AttachedGear::with_slots(GEAR_SLOTS),
        stamina,
        AiTaskManager::default(),
        DismountRecord::default(),
    ));
    if let Some(gaits) = gaits {
        entity_commands.insert(gaits);
    }

    Ok(entity)
}
