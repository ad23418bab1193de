//! Fluid queries: чёрный ящик мира для плавания
//!
//! Уровень жидкости в клетке: 0 (сухо) ..= 7 (полная клетка).

use bevy::prelude::*;
use std::collections::HashMap;

pub const FULL_LIQUID_LEVEL: u8 = 7;

pub trait FluidQuery {
    fn liquid_level(&self, cell: IVec3) -> u8;

    /// Высота поверхности воды над клеткой позиции
    fn water_surface_y(&self, position: Vec3) -> f32 {
        let cell = position.floor().as_ivec3();
        let inside = self.liquid_level(cell) as f32 / 8.0;
        let above = if self.liquid_level(cell + IVec3::Y) > 0 {
            9.0 / 8.0
        } else {
            0.0
        };
        cell.y as f32 + inside + above
    }
}

/// Вода в мире: ровное море + отдельные клетки (пруды, реки)
#[derive(Resource, Debug, Clone, Default)]
pub struct FluidGrid {
    /// Все клетки с y < sea_level заполнены
    pub sea_level: Option<i32>,
    pub cells: HashMap<IVec3, u8>,
}

impl FluidGrid {
    pub fn with_sea_level(sea_level: i32) -> Self {
        Self {
            sea_level: Some(sea_level),
            cells: HashMap::new(),
        }
    }

    pub fn set(&mut self, cell: IVec3, level: u8) {
        self.cells.insert(cell, level.min(FULL_LIQUID_LEVEL));
    }
}

impl FluidQuery for FluidGrid {
    fn liquid_level(&self, cell: IVec3) -> u8 {
        if let Some(level) = self.cells.get(&cell) {
            return *level;
        }
        match self.sea_level {
            Some(sea) if cell.y < sea => FULL_LIQUID_LEVEL,
            _ => 0,
        }
    }
}

/// 0 = на swim line, 1 = полностью под водой (+0.075 чтобы не залипать на границе)
pub fn swimline_submergedness(position: Vec3, swimming_offset_y: f32, fluid: &dyn FluidQuery) -> f32 {
    let bottom_submergedness = fluid.water_surface_y(position) - position.y;
    let swimline = (bottom_submergedness - swimming_offset_y).clamp(0.0, 1.0);
    (swimline + 0.075).min(1.0)
}
