//! Gait звук маунта (только клиент)

use bevy::prelude::*;

use crate::animation::GaitSound;
use crate::components::BodyState;
use crate::gait::{GaitProvider, GaitTable};
use crate::world_clock::SimSide;

use super::locomotion::RideableSession;

/// Дольше этого в воздухе: gait звук глушим
pub const AIRBORNE_SILENCE_SECS: f32 = 0.2;

/// Какой звук должен играть сейчас
///
/// None: если в воде, долго в воздухе, или у gait нет звука.
pub fn desired_gait_sound(gait_sound: Option<&str>, body: &BodyState, airborne_secs: f32) -> Option<String> {
    if body.swimming || airborne_secs > AIRBORNE_SILENCE_SECS {
        return None;
    }
    gait_sound.map(str::to_string)
}

pub fn update_gait_sound(
    time: Res<Time<Fixed>>,
    side: Res<SimSide>,
    mut mounts: Query<(
        &GaitTable,
        &RideableSession,
        &BodyState,
        &Transform,
        &mut GaitSound,
    )>,
) {
    if side.is_authoritative() {
        return;
    }

    let dt = time.delta_secs();

    for (gaits, session, body, transform, mut sound) in mounts.iter_mut() {
        if body.on_ground {
            sound.airborne_secs = 0.0;
        } else {
            sound.airborne_secs += dt;
        }

        sound.position = transform.translation;

        let gait = gaits.current_gait();
        if session.descriptor(&gait.code).is_none() {
            continue;
        }

        let code = desired_gait_sound(gait.sound.as_deref(), body, sound.airborne_secs);
        sound.switch_to(code);
    }
}
