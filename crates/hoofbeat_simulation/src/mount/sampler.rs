//! Render-time sampler (только клиент, раз в кадр)
//!
//! - Плавный yaw между тиками (translator + yaw на render dt)
//! - Пауза игры → gait звук на паузу, снятие паузы → продолжить
//! - dt зажат до 0.5s (лаги не крутят маунта на полкруга)
//!
//! Authoritative состояние тут не меняется: gait мутирует только сервер.

use bevy::prelude::*;

use crate::animation::{ActiveAnimations, GaitSound, SoundPlayed};
use crate::components::{BodyState, Health, HealthProvider, Heading, MountControls};
use crate::config::GameplayConstants;
use crate::gait::{GaitProvider, GaitTable};
use crate::world_clock::{GamePaused, SimSide, WorldClock};

use super::authorization::{RideChecks, RideDenied};
use super::locomotion::{MountState, RideableSession, RidingEffects};
use super::seat::Seats;
use super::systems::apply_riding_effects;
use super::Rideable;

pub const MAX_RENDER_DT: f32 = 0.5;

pub fn render_sampler(
    time: Res<Time>,
    clock: Res<WorldClock>,
    side: Res<SimSide>,
    paused: Res<GamePaused>,
    constants: Res<GameplayConstants>,
    mut was_paused: Local<bool>,
    mut sounds_q: Query<&mut GaitSound>,
    mut mounts: Query<
        (
            Entity,
            &mut RideableSession,
            &mut GaitTable,
            &mut Seats,
            Option<&RideChecks>,
            &mut MountControls,
            &mut ActiveAnimations,
            &mut Heading,
            &BodyState,
            Option<&Health>,
        ),
        With<Rideable>,
    >,
    mut passengers: Query<&mut ActiveAnimations, Without<Rideable>>,
    mut sounds: EventWriter<SoundPlayed>,
    mut denials: EventWriter<RideDenied>,
) {
    if side.is_authoritative() {
        return;
    }

    let now_paused = paused.0;
    if now_paused != *was_paused {
        for mut sound in sounds_q.iter_mut() {
            if now_paused {
                sound.pause();
            } else {
                sound.resume();
            }
        }
    }
    *was_paused = now_paused;

    if now_paused {
        return;
    }

    let dt = time.delta_secs().min(MAX_RENDER_DT);

    for (
        entity,
        mut session,
        mut gaits,
        mut seats,
        checks,
        mut controls,
        mut anims,
        mut heading,
        body,
        health,
    ) in mounts.iter_mut()
    {
        if !seats.any_mounted() {
            continue;
        }

        let turn_radius = match gaits.turn_radius() {
            radius if radius > 0.0 => radius,
            _ => constants.default_turn_radius,
        };

        let mut effects = RidingEffects::default();
        let mut state = MountState {
            gaits: &mut *gaits,
            controls: &mut *controls,
            anims: &mut *anims,
            heading: &mut *heading,
            body,
            alive: health.map_or(true, |h| h.is_alive()),
            now_ms: clock.elapsed_ms,
            authoritative: false,
        };

        let motion = session.update_angle_and_motion(
            dt,
            turn_radius,
            &mut state,
            &mut seats,
            checks,
            &mut effects,
        );
        // Вето показываем тому клиенту, где оно случилось
        for (passenger, reason) in motion.denials {
            denials.write(RideDenied {
                mount: entity,
                passenger,
                reason,
            });
        }

        apply_riding_effects(entity, effects, &seats, &mut passengers, &mut sounds, None);
    }
}
