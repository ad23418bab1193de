//! ECS Components для существ
//!
//! Организация по доменам:
//! - actor: здоровье, физическое состояние тела, поколение
//! - movement: controls маунта, heading, velocity
//! - attachment: снаряжение маунта (control scheme)
//!
//! Компоненты езды живут в `mount`, stamina: в `stamina`.

pub mod actor;
pub mod attachment;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use attachment::*;
pub use movement::*;
