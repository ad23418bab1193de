//! Mounted locomotion
//!
//! Поток данных (на тик, server-authoritative):
//! ввод пассажиров (Seats) → translator → net motion → state machine
//! (анимация/звук, walk vector) → physics двигает маунта.
//!
//! Клиент: тот же state machine в FixedUpdate, но translator + yaw в render sampler (Update).
//!
//! Подмодули:
//! - seat: места, посадка/высадка (MountRequest → MountEvent)
//! - authorization: can-ride / can-turn цепочки, вето → in-game ошибка
//! - motion: seat-to-motion translator
//! - locomotion: RideableSession (state machine)
//! - rider: анимации + обзор пассажира
//! - sound: gait звук (клиент)
//! - sampler: render-time sampler (клиент)
//! - spawn: spawn ездового существа из entity type конфига

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RideableConfig;
use crate::SimSet;

pub mod authorization;
pub mod locomotion;
pub mod motion;
pub mod rider;
pub mod sampler;
pub mod seat;
pub mod sound;
pub mod spawn;
pub mod systems;


pub use authorization::{IngameError, Lang, LocalPlayer, RideCheck, RideChecks, RideDenied, RideVerdict};
pub use locomotion::{LocomotionChanged, LocomotionPhase, RideableSession};
pub use motion::{seats_to_motion, SeatMotion};
pub use rider::{RiderAnimation, RiderView};
pub use seat::{
    unmount_all_passengers, MountEvent, MountRequest, MountedOn, Seat, SeatConfig, SeatControls,
    Seats,
};
pub use spawn::spawn_rideable;

/// Маркер + неизменяемый конфиг rideable entity type
#[derive(Component, Debug, Clone)]
pub struct Rideable {
    pub config: RideableConfig,
}

/// Когда последний раз с маунта слезли (календарные часы)
///
/// Wander AI выключен 24 игровых часа после высадки.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DismountRecord {
    #[serde(rename = "lastDismountTotalHours")]
    pub last_dismount_total_hours: Option<f64>,
}

/// Setup rideable не удался (entity осталась без сессии)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct RideableSetupFailed {
    pub entity: Entity,
    pub error: String,
}

/// Mount Plugin
///
/// FixedUpdate порядок:
/// 1. Seating: setup_rideables → process_mount_requests → handle_mount_events → sync_control_scheme
/// 2. Locomotion: rideable_tick → sync_rider_animations → constrain_passenger_view → update_gait_sound
/// 3. Sync: surface_ride_denials
///
/// Update (клиент): render_sampler
pub struct MountPlugin;

impl Plugin for MountPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MountRequest>()
            .add_event::<MountEvent>()
            .add_event::<RideDenied>()
            .add_event::<IngameError>()
            .add_event::<LocomotionChanged>()
            .add_event::<RideableSetupFailed>()
            .add_event::<crate::animation::SoundPlayed>()
            .init_resource::<Lang>()
            .init_resource::<LocalPlayer>()
            .add_systems(
                FixedUpdate,
                (
                    systems::setup_rideables,
                    seat::process_mount_requests,
                    systems::handle_mount_events,
                    systems::sync_control_scheme,
                )
                    .chain()
                    .in_set(SimSet::Seating),
            )
            .add_systems(
                FixedUpdate,
                (
                    systems::rideable_tick,
                    rider::sync_rider_animations,
                    rider::constrain_passenger_view,
                    sound::update_gait_sound,
                )
                    .chain()
                    .in_set(SimSet::Locomotion),
            )
            .add_systems(
                FixedUpdate,
                authorization::surface_ride_denials.in_set(SimSet::Sync),
            )
            .add_systems(Update, sampler::render_sampler);
    }
}
