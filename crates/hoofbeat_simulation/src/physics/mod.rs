//! Physics bridge
//!
//! Kinematic движение маунта + fluid queries. Полноценного physics engine нет:
//! Rapier получает только collider и зеркало velocity.

use bevy::prelude::*;

use crate::SimSet;

pub mod fluid;
pub mod movement;

// Re-export основных типов
pub use fluid::{FluidGrid, FluidQuery};
pub use movement::{spawn_kinematic_mount, KinematicMount};

/// Physics Plugin
///
/// Порядок в SimSet::Physics:
/// ground_detection → apply_mount_controls → integrate_velocity_to_transform
/// → sync_heading_to_transform → sync_velocity_to_rapier
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FluidGrid>().add_systems(
            FixedUpdate,
            (
                movement::ground_detection,
                movement::apply_mount_controls,
                movement::integrate_velocity_to_transform,
                movement::sync_heading_to_transform,
                movement::sync_velocity_to_rapier,
            )
                .chain()
                .in_set(SimSet::Physics),
        );
    }
}
