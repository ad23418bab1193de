//! Kinematic движение маунта
//!
//! Архитектура:
//! - Rapier только для коллизий (RigidBody::KinematicPositionBased)
//! - Velocity интегрируем сами: MountControls → PhysicsBody → Transform
//! - Gravity + ground check (stub по высоте)
//!
//! Детерминизм: fixed timestep 30Hz, порядок систем фиксирован (.chain()).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::animation::{ActiveAnimations, GaitSound};
use crate::components::{BodyState, Heading, MountControls, PhysicsBody};
use crate::world_clock::PHYSICS_FRAME_TIME;

pub const GRAVITY: f32 = -9.81;
/// Вертикальная скорость отрыва при прыжке (m/s)
pub const JUMP_VELOCITY: f32 = 5.0;
/// Затухание вертикальной скорости в воде (на тик)
pub const SWIM_DRAG: f32 = 0.9;
/// Пол на y = 0, низ капсулы маунта = центр - GROUND_OFFSET
pub const GROUND_OFFSET: f32 = 0.9;

/// Kinematic тело маунта
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KinematicMount {
    pub gravity: f32,
    /// Высота пола под маунтом
    pub ground_y: f32,
}

impl Default for KinematicMount {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            ground_y: 0.0,
        }
    }
}

/// Система: ground detection через простую Y-проверку
///
/// TODO: raycast через RapierContext, когда headless режим подключит полный Rapier plugin
pub fn ground_detection(mut query: Query<(&Transform, &KinematicMount, &mut BodyState)>) {
    for (transform, mount, mut body) in query.iter_mut() {
        // Небольшой запас на numerical errors
        body.on_ground = transform.translation.y - GROUND_OFFSET <= mount.ground_y + 0.05;
    }
}

/// Система: walk/fly vectors + jump → velocity
pub fn apply_mount_controls(
    mut query: Query<(&mut MountControls, &BodyState, &KinematicMount, &mut PhysicsBody)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut controls, body, mount, mut physics) in query.iter_mut() {
        physics.velocity.x = controls.walk_vector.x;
        physics.velocity.z = controls.walk_vector.z;

        if body.swimming {
            // fly vector в blocks/tick
            physics.velocity.y = physics.velocity.y * SWIM_DRAG + controls.fly_vector.y / PHYSICS_FRAME_TIME;
        } else if body.on_ground {
            physics.velocity.y = if controls.jump {
                JUMP_VELOCITY
            } else {
                physics.velocity.y.max(0.0)
            };
        } else {
            physics.velocity.y += mount.gravity * delta;
        }

        // Jump: импульс на один тик
        if controls.jump {
            controls.jump = false;
        }
    }
}

/// Система: velocity → Transform (headless режим, без Rapier step)
pub fn integrate_velocity_to_transform(
    mut query: Query<(&PhysicsBody, &KinematicMount, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mount, mut transform) in query.iter_mut() {
        transform.translation += body.velocity * delta;

        let floor = mount.ground_y + GROUND_OFFSET;
        if transform.translation.y < floor {
            transform.translation.y = floor;
        }
    }
}

/// Система: Heading.yaw → Transform.rotation
pub fn sync_heading_to_transform(mut query: Query<(&Heading, &mut Transform), Changed<Heading>>) {
    for (heading, mut transform) in query.iter_mut() {
        transform.rotation = Quat::from_rotation_y(heading.yaw);
    }
}

/// Система: наша velocity → Rapier Velocity
pub fn sync_velocity_to_rapier(
    mut query: Query<(&PhysicsBody, &mut Velocity), With<KinematicMount>>,
) {
    for (body, mut rapier_velocity) in query.iter_mut() {
        rapier_velocity.linvel = body.velocity;
    }
}

/// Spawn helper: kinematic тело + всё, что нужно locomotion
///
/// - Transform + Heading (yaw из rotation)
/// - PhysicsBody, KinematicMount, MountControls, BodyState
/// - ActiveAnimations, GaitSound
/// - Rapier: RigidBody + Collider (capsule) + Velocity
pub fn spawn_kinematic_mount(commands: &mut Commands, position: Vec3, yaw: f32) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position).with_rotation(Quat::from_rotation_y(yaw)),
            Heading { yaw },
            PhysicsBody::default(),
            KinematicMount::default(),
            MountControls::default(),
            BodyState::default(),
            ActiveAnimations::default(),
            GaitSound::default(),
            RigidBody::KinematicPositionBased,
            // Лось: 1.8m капсула, радиус 0.6m
            Collider::capsule_y(0.3, 0.6),
            Velocity::default(),
        ))
        .id()
}
