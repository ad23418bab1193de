//! Пассажир: анимации езды + ограничение обзора

use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::animation::{ActiveAnimations, AnimationPlayer};
use crate::components::Heading;

use super::locomotion::RideableSession;
use super::seat::{MountedOn, Seats};
use super::Rideable;

/// Какую анимацию езды пассажир играет сейчас
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct RiderAnimation {
    pub current: Option<String>,
}

/// Ограничение угла вокруг центра (радианы)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleConstraint {
    pub center: f32,
    pub range: f32,
}

impl AngleConstraint {
    pub fn new(center: f32, range: f32) -> Self {
        Self { center, range }
    }

    /// Зажать yaw в [center - range, center + range] с учётом wrap
    pub fn clamp(&self, yaw: f32) -> f32 {
        let diff = (yaw - self.center + PI).rem_euclid(TAU) - PI;
        (self.center + diff.clamp(-self.range, self.range)).rem_euclid(TAU)
    }
}

/// Обзор пассажира управляющего места
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct RiderView {
    pub head_yaw_limit: Option<AngleConstraint>,
    pub body_yaw_limit: Option<AngleConstraint>,
    pub left_mouse_down: bool,
}

/// Система: пассажиры играют `rider_animation` сессии, переключение только на изменении
pub fn sync_rider_animations(
    sessions: Query<&RideableSession>,
    mut passengers: Query<
        (&MountedOn, &mut RiderAnimation, &mut ActiveAnimations),
        Without<Rideable>,
    >,
) {
    for (mounted_on, mut rider, mut anims) in passengers.iter_mut() {
        let Ok(session) = sessions.get(mounted_on.mount) else {
            continue;
        };

        if rider.current == session.rider_animation {
            continue;
        }

        if let Some(previous) = rider.current.take() {
            anims.stop(&previous);
        }
        if let Some(next) = &session.rider_animation {
            anims.start_code(next);
        }
        rider.current = session.rider_animation.clone();
    }
}

/// Система: голова/тело пассажира ±90° от направления места, left mouse зеркалится
pub fn constrain_passenger_view(
    mounts: Query<(&Heading, &Seats), With<Rideable>>,
    mut views: Query<&mut RiderView>,
) {
    for (heading, seats) in mounts.iter() {
        for seat in &seats.seats {
            let Some(passenger) = seat.passenger else {
                continue;
            };
            if !seat.config.controllable {
                continue;
            }
            let Ok(mut view) = views.get_mut(passenger) else {
                continue;
            };

            let center = heading.yaw + seat.config.mount_rotation_y.to_radians();
            let limit = AngleConstraint::new(center, FRAC_PI_2);
            view.head_yaw_limit = Some(limit);
            view.body_yaw_limit = Some(limit);
            view.left_mouse_down = seat.controls.left_mouse_down;
        }
    }
}
