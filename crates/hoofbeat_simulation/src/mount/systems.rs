//! ECS системы езды (тонкий glue над RideableSession)

use bevy::prelude::*;

use crate::animation::{ActiveAnimations, AnimationPlayer, SoundPlayed};
use crate::components::{AttachedGear, BodyState, Health, HealthProvider, Heading, MountControls, PhysicsBody};
use crate::config::GameplayConstants;
use crate::error::SetupError;
use crate::gait::{GaitProvider, GaitTable};
use crate::logger;
use crate::physics::fluid::{FluidGrid, FluidQuery};
use crate::world_clock::{SimSide, WorldClock};

use super::authorization::{RideChecks, RideDenied};
use super::locomotion::{LocomotionChanged, MountState, RideableSession, RidingEffects};
use super::seat::{MountEvent, Seats};
use super::{DismountRecord, Rideable, RideableSetupFailed};

/// Система: setup сессии для новых rideable
///
/// Нет GaitTable или битый конфиг → log_error + RideableSetupFailed, сессии нет.
pub fn setup_rideables(
    mut commands: Commands,
    added: Query<(Entity, &Rideable, Option<&GaitTable>, Option<&AttachedGear>), Added<Rideable>>,
    mut failed: EventWriter<RideableSetupFailed>,
) {
    for (entity, rideable, gaits, gear) in added.iter() {
        let result = match gaits {
            Some(gaits) => RideableSession::new(&rideable.config, gaits),
            None => Err(SetupError::MissingGaitProvider { entity }),
        };

        match result {
            Ok(mut session) => {
                session.on_mount(gear);
                logger::log_info(&format!(
                    "rideable {:?} ready: {} gaits in ride order",
                    entity,
                    session.gait_order().codes().len()
                ));
                commands.entity(entity).insert(session);
            }
            Err(error) => {
                logger::log_error(&format!("rideable setup failed for {:?}: {}", entity, error));
                failed.write(RideableSetupFailed {
                    entity,
                    error: error.to_string(),
                });
            }
        }
    }
}

/// Система: снаряжение изменилось → пересчёт control scheme (сервер ещё и gait → idle)
pub fn sync_control_scheme(
    side: Res<SimSide>,
    mut mounts: Query<(&AttachedGear, &mut RideableSession, &mut GaitTable), Changed<AttachedGear>>,
) {
    for (gear, mut session, mut gaits) in mounts.iter_mut() {
        session.on_mount(Some(gear));
        if side.is_authoritative() {
            gaits.set_idle();
        }
    }
}

/// Система: mount/dismount → сессия
pub fn handle_mount_events(
    mut events: EventReader<MountEvent>,
    clock: Res<WorldClock>,
    side: Res<SimSide>,
    mut mounts: Query<
        (
            &mut RideableSession,
            &mut GaitTable,
            &mut MountControls,
            &mut ActiveAnimations,
            &mut Heading,
            &BodyState,
            Option<&Health>,
            Option<&AttachedGear>,
            Option<&mut DismountRecord>,
        ),
        With<Rideable>,
    >,
    mut passengers: Query<&mut ActiveAnimations, Without<Rideable>>,
) {
    for event in events.read() {
        match *event {
            MountEvent::Mounted { mount, .. } => {
                let Ok((mut session, _, _, _, _, _, _, gear, _)) = mounts.get_mut(mount) else {
                    continue;
                };
                session.on_mount(gear);
            }
            MountEvent::Dismounted {
                passenger, mount, ..
            } => {
                let Ok((
                    mut session,
                    mut gaits,
                    mut controls,
                    mut anims,
                    mut heading,
                    body,
                    health,
                    _,
                    record,
                )) = mounts.get_mut(mount)
                else {
                    continue;
                };

                let mut state = MountState {
                    gaits: &mut *gaits,
                    controls: &mut *controls,
                    anims: &mut *anims,
                    heading: &mut *heading,
                    body,
                    alive: health.map_or(true, |h| h.is_alive()),
                    now_ms: clock.elapsed_ms,
                    authoritative: side.is_authoritative(),
                };

                let mut passenger_anims = passengers.get_mut(passenger).ok();
                session.on_unmount(
                    &mut state,
                    passenger_anims
                        .as_deref_mut()
                        .map(|anims| anims as &mut dyn AnimationPlayer),
                );

                if let Some(mut record) = record {
                    record.last_dismount_total_hours = Some(clock.total_hours);
                }

                logger::log_info(&format!(
                    "{:?} dismounted {:?} at {:.2}h",
                    passenger, mount, clock.total_hours
                ));
            }
        }
    }
}

/// Применить эффекты тика к пассажирам + события
pub(crate) fn apply_riding_effects(
    mount: Entity,
    effects: RidingEffects,
    seats: &Seats,
    passengers: &mut Query<&mut ActiveAnimations, Without<Rideable>>,
    sounds: &mut EventWriter<SoundPlayed>,
    phases: Option<&mut EventWriter<LocomotionChanged>>,
) {
    if !effects.passenger_start.is_empty() || !effects.passenger_stop.is_empty() {
        for passenger in seats.passengers() {
            let Ok(mut anims) = passengers.get_mut(passenger) else {
                continue;
            };
            for code in &effects.passenger_stop {
                anims.stop(code);
            }
            for request in &effects.passenger_start {
                anims.start(request.clone());
            }
        }
    }

    for code in effects.sounds {
        sounds.write(SoundPlayed { entity: mount, code });
    }

    if let (Some(phases), Some((from, to))) = (phases, effects.phase_changed) {
        phases.write(LocomotionChanged { mount, from, to });
    }
}

/// Система: тик езды (обе стороны)
///
/// Server: translator + yaw здесь. Client: translator + yaw в render sampler,
/// здесь только riding state + движение.
pub fn rideable_tick(
    time: Res<Time<Fixed>>,
    clock: Res<WorldClock>,
    side: Res<SimSide>,
    constants: Res<GameplayConstants>,
    fluid: Option<Res<FluidGrid>>,
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
            &Transform,
            &mut PhysicsBody,
        ),
        With<Rideable>,
    >,
    mut passengers: Query<&mut ActiveAnimations, Without<Rideable>>,
    mut sounds: EventWriter<SoundPlayed>,
    mut phases: EventWriter<LocomotionChanged>,
    mut denials: EventWriter<RideDenied>,
) {
    let dt = time.delta_secs();
    let dry = FluidGrid::default();
    let fluid: &dyn FluidQuery = match fluid.as_deref() {
        Some(grid) => grid,
        None => &dry,
    };

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
        transform,
        mut physics,
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
            authoritative: side.is_authoritative(),
        };

        let mut jumped = false;
        if side.is_authoritative() {
            let motion = session.update_angle_and_motion(
                dt,
                turn_radius,
                &mut state,
                &mut seats,
                checks,
                &mut effects,
            );
            jumped = motion.jump;
            for (passenger, reason) in motion.denials {
                denials.write(RideDenied {
                    mount: entity,
                    passenger,
                    reason,
                });
            }
        }

        session.update_riding_state(&mut state, true, &mut effects);
        session.apply_movement(
            &mut state,
            transform.translation,
            &mut physics.velocity,
            fluid,
            constants.overall_speed_multiplier,
        );

        // Повторный riding state на этом тике сбрасывает controls.jump, physics должна его увидеть
        if jumped {
            controls.jump = true;
        }

        apply_riding_effects(
            entity,
            effects,
            &seats,
            &mut passengers,
            &mut sounds,
            Some(&mut phases),
        );
    }
}
