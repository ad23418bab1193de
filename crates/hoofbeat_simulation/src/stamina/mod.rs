//! Stamina: усталость, реген, exhaustion
//!
//! Authoritative сторона пересчитывает запись 4 раза в секунду, клиенты видят
//! только StaminaReplica. Exhausted читают AI (Flee) и gameplay.

use bevy::prelude::*;

use crate::SimSet;

pub mod modifiers;
pub mod record;
pub mod systems;

// Tests (separate files with _tests suffix)
mod systems_tests;

pub use modifiers::{FatigueModifier, FatigueModifiers};
pub use record::{FatigueCause, FatigueContext, FatigueSource, StaminaRecord};
pub use systems::{
    FatigueEvent, FleeCanceled, StaminaReplica, StaminaSynced, StaminaTimer, STAMINA_UPDATE_INTERVAL,
};

/// Stamina Plugin
///
/// FixedUpdate (SimSet::Stamina), порядок:
/// init_stamina_timers → derive_fleeing → handle_fatigue_events → update_stamina → publish_stamina_sync
///
/// Observer: StaminaSynced → StaminaReplica
pub struct StaminaPlugin;

impl Plugin for StaminaPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FatigueEvent>()
            .add_event::<FleeCanceled>()
            .add_observer(systems::mirror_stamina_replica)
            .add_systems(
                FixedUpdate,
                (
                    systems::init_stamina_timers,
                    systems::derive_fleeing,
                    systems::handle_fatigue_events,
                    systems::update_stamina,
                    systems::publish_stamina_sync,
                )
                    .chain()
                    .in_set(SimSet::Stamina),
            );
    }
}
