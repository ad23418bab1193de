//! Entity type конфиги (JSON) + глобальные gameplay константы
//!
//! Формат ключей совпадает с контентом:
//! - rideable: `controls`, `minGeneration`, `rideableGaitOrder`
//! - stamina: lowercase ключи (`maxstamina`, `sprintfatigue`, ...)
//!
//! Конфиг читается ОДИН раз при инициализации entity type, дальше immutable.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SetupError;
use crate::gait::{Gait, GaitTable};

/// Ключи descriptor'ов, которые обязаны быть в `controls`
pub const REQUIRED_CONTROLS: [&str; 3] = ["idle", "swim", "jump"];

/// Control Descriptor: какую анимацию играть и как считать скорость для gait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDescriptor {
    pub animation: String,

    #[serde(default)]
    pub rider_animation: Option<String>,

    /// Если задан (> 0): перекрывает скорость gait полностью
    #[serde(default)]
    pub move_speed: Option<f32>,

    /// Множитель к базовой скорости gait (когда нет override)
    #[serde(default = "default_multiplier")]
    pub move_speed_multiplier: f32,

    #[serde(default)]
    pub ease_out_speed: f32,
}

fn default_multiplier() -> f32 {
    1.0
}

impl ControlDescriptor {
    pub fn new(animation: impl Into<String>) -> Self {
        Self {
            animation: animation.into(),
            rider_animation: None,
            move_speed: None,
            move_speed_multiplier: 1.0,
            ease_out_speed: 0.0,
        }
    }

    pub fn with_rider(mut self, rider_animation: impl Into<String>) -> Self {
        self.rider_animation = Some(rider_animation.into());
        self
    }

    /// Эффективная скорость: override > gait × multiplier
    pub fn effective_speed(&self, gait_speed: f32) -> f32 {
        match self.move_speed {
            Some(speed) if speed > 0.0 => speed,
            _ => gait_speed * self.move_speed_multiplier,
        }
    }
}

/// Rideable часть entity type конфига
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideableConfig {
    pub controls: HashMap<String, ControlDescriptor>,

    /// Минимальное поколение для посадки (проверяет seating, не locomotion)
    #[serde(default)]
    pub min_generation: u32,

    /// Коды gait в порядке возрастания скорости
    #[serde(default)]
    pub rideable_gait_order: Vec<String>,
}

impl RideableConfig {
    /// `idle`/`swim`/`jump` descriptors обязательны: без них state machine не работает
    pub fn validate(&self) -> Result<(), SetupError> {
        for key in REQUIRED_CONTROLS {
            if !self.controls.contains_key(key) {
                return Err(SetupError::MissingControl(key.to_string()));
            }
        }
        Ok(())
    }
}

/// Stamina часть entity type конфига (дефолты из контента)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaConfig {
    #[serde(default = "default_max_stamina")]
    pub maxstamina: f32,
    /// Только seed для НОВОЙ entity, при reload игнорируется
    #[serde(default)]
    pub currentstamina: Option<f32>,
    #[serde(default = "default_fatigue")]
    pub sprintfatigue: f32,
    #[serde(default = "default_fatigue")]
    pub swimfatigue: f32,
    #[serde(default = "default_base_fatigue_rate")]
    pub basefatiguerate: f32,
    #[serde(default = "default_regen_rate")]
    pub staminaregenrate: f32,
    #[serde(default = "default_wounded_penalty")]
    pub regenpenaltywounded: f32,
    #[serde(default = "default_mounted_penalty")]
    pub regenpenaltymounted: f32,
    #[serde(default = "default_exhaustion_threshold")]
    pub exhaustionthreshold: f32,
    /// Exhausted существо бросает flee task
    #[serde(default = "default_true")]
    pub dontfleewhenexhausted: bool,
}

fn default_max_stamina() -> f32 {
    100.0
}
fn default_fatigue() -> f32 {
    0.2
}
fn default_base_fatigue_rate() -> f32 {
    1.0
}
fn default_regen_rate() -> f32 {
    0.5
}
fn default_wounded_penalty() -> f32 {
    0.5
}
fn default_mounted_penalty() -> f32 {
    0.3
}
fn default_exhaustion_threshold() -> f32 {
    0.2
}
fn default_true() -> bool {
    true
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            maxstamina: default_max_stamina(),
            currentstamina: None,
            sprintfatigue: default_fatigue(),
            swimfatigue: default_fatigue(),
            basefatiguerate: default_base_fatigue_rate(),
            staminaregenrate: default_regen_rate(),
            regenpenaltywounded: default_wounded_penalty(),
            regenpenaltymounted: default_mounted_penalty(),
            exhaustionthreshold: default_exhaustion_threshold(),
            dontfleewhenexhausted: true,
        }
    }
}

/// Gait каталог entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaitConfig {
    #[serde(default = "default_turn_radius")]
    pub turn_radius: f32,
    pub gaits: Vec<Gait>,
}

fn default_turn_radius() -> f32 {
    3.5
}

/// Полный конфиг entity type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityTypeConfig {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub gait: Option<GaitConfig>,
    #[serde(default)]
    pub rideable: Option<RideableConfig>,
    #[serde(default)]
    pub stamina: Option<StaminaConfig>,
}

impl EntityTypeConfig {
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let config: EntityTypeConfig = serde_json::from_str(json)?;
        if let Some(rideable) = &config.rideable {
            rideable.validate()?;
        }
        Ok(config)
    }

    /// None: у entity type нет gait (для rideable это фатально, решает setup)
    pub fn gait_table(&self) -> Result<Option<GaitTable>, SetupError> {
        self.gait
            .as_ref()
            .map(|gait| GaitTable::new(gait.gaits.clone(), gait.turn_radius))
            .transpose()
    }
}

/// Глобальные множители (аналог world-wide gameplay settings)
#[derive(Resource, Debug, Clone, Copy)]
pub struct GameplayConstants {
    pub max_stamina_multiplier: f32,
    pub stamina_regen_multiplier: f32,
    pub overall_speed_multiplier: f32,
    /// Turn radius если у gait provider его нет
    pub default_turn_radius: f32,
}

impl Default for GameplayConstants {
    fn default() -> Self {
        Self {
            max_stamina_multiplier: 1.0,
            stamina_regen_multiplier: 1.0,
            overall_speed_multiplier: 1.0,
            default_turn_radius: 3.5,
        }
    }
}
