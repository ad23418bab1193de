//! Fatal setup errors
//!
//! Это ошибки контента (JSON entity type), а не runtime: setup прерывается,
//! entity остаётся без RideableSession, ошибка уходит в log_error + RideableSetupFailed.
//! Вето на езду (RideVerdict::Denied) сюда НЕ относится: это обычное значение.

use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("rideable entity {entity:?} has no gait provider (GaitTable), register gaits on the entity type")]
    MissingGaitProvider { entity: Entity },

    #[error("entity type `{0}` has no rideable section")]
    NotRideable(String),

    #[error("rideable config has no `{0}` control descriptor")]
    MissingControl(String),

    #[error("gait catalog must contain exactly one idle gait, found {0}")]
    IdleGaitCount(usize),

    #[error("gait catalog has duplicate code `{0}`")]
    DuplicateGait(String),

    #[error("invalid entity type config: {0}")]
    Config(#[from] serde_json::Error),
}
