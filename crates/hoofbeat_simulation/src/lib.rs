//! HOOFBEAT Simulation Core
//!
//! ECS-симуляция езды верхом на Bevy 0.16 (headless).
//!
//! Тик (FixedUpdate, 30Hz), порядок через SimSet:
//! Clock → Seating → Locomotion → Physics → Stamina → Ai → Sync
//!
//! - Server (authoritative): gait, stamina, AI задачи
//! - Client (replica): тот же state machine + косметика (звук, плавный yaw в Update)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod animation;
pub mod components;
pub mod config;
pub mod error;
pub mod gait;
pub mod logger;
pub mod mount;
pub mod physics;
pub mod stamina;
pub mod world_clock;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, AiTaskKind, AiTaskManager, TaskScheduler};
pub use animation::{ActiveAnimations, AnimationPlayer, GaitSound, SoundPlayed};
pub use components::*;
pub use config::{EntityTypeConfig, GameplayConstants, RideableConfig, StaminaConfig};
pub use error::SetupError;
pub use gait::{Gait, GaitOrder, GaitProvider, GaitTable};
pub use mount::{
    spawn_rideable, DismountRecord, LocomotionChanged, LocomotionPhase, MountEvent, MountPlugin,
    MountRequest, Rideable, RideableSession, Seat, SeatConfig, Seats,
};
pub use physics::{FluidGrid, PhysicsPlugin};
pub use stamina::{StaminaPlugin, StaminaRecord};
pub use world_clock::{SimSide, WorldClock, WorldClockPlugin, PHYSICS_FRAME_TIME};

pub use logger::init_logger;

/// Фазы тика (цепочка, порядок фиксирован для детерминизма)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Clock,
    Seating,
    Locomotion,
    Physics,
    Stamina,
    Ai,
    Sync,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 30Hz = один physics frame
            .insert_resource(Time::<Fixed>::from_hz(30.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .init_resource::<GameplayConstants>()
            .configure_sets(
                FixedUpdate,
                (
                    SimSet::Clock,
                    SimSet::Seating,
                    SimSet::Locomotion,
                    SimSet::Physics,
                    SimSet::Stamina,
                    SimSet::Ai,
                    SimSet::Sync,
                )
                    .chain(),
            )
            .add_plugins((
                WorldClockPlugin,
                MountPlugin,
                PhysicsPlugin,
                StaminaPlugin,
                AIPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт Bevy App для headless симуляции (MinimalPlugins + SimulationPlugin)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    let mut snapshot = Vec::new();
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}

/// Прогнать `ticks` фиксированных тиков без реального времени
///
/// Headless бинарь и тесты двигают Time<Fixed> вручную: app.update() зависит
/// от wall clock и даёт нестабильное число FixedUpdate за кадр.
pub fn run_fixed_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        let timestep = app.world().resource::<Time<Fixed>>().timestep();
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(timestep);
        app.world_mut().run_schedule(FixedUpdate);
    }
}
