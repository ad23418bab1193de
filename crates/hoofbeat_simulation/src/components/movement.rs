//! Movement компоненты: controls маунта, heading, velocity

use bevy::prelude::*;

/// Управляющие флаги + векторы, которые locomotion выставляет самому маунту
///
/// Physics читает `walk_vector`/`fly_vector` (blocks/tick), никто кроме locomotion их не пишет.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MountControls {
    pub forward: bool,
    pub backward: bool,
    pub sprint: bool,
    pub jump: bool,
    pub is_climbing: bool,
    pub walk_vector: Vec3,
    pub fly_vector: Vec3,
}

impl MountControls {
    pub fn tries_to_move(&self) -> bool {
        self.forward || self.backward
    }

    pub fn stop_all_movement(&mut self) {
        self.forward = false;
        self.backward = false;
        self.sprint = false;
        self.jump = false;
        self.walk_vector = Vec3::ZERO;
        self.fly_vector = Vec3::ZERO;
    }
}

/// Yaw маунта (радианы, [0, 2π))
///
/// Отдельно от Transform: yaw крутится с render частотой на клиенте,
/// Transform.rotation только синхронизируется из него.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Heading {
    pub yaw: f32,
}

impl Heading {
    /// Направление "вперёд" в горизонтальной плоскости: (sin yaw, 0, cos yaw)
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }

    pub fn rotate(&mut self, delta: f32) {
        self.yaw = (self.yaw + delta).rem_euclid(std::f32::consts::TAU);
    }
}

/// Наша velocity (m/s), интегрируется в Transform, зеркалится в Rapier
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
}
