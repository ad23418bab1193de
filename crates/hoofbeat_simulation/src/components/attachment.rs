//! Attachment компоненты: снаряжение, надетое на маунта (седло, уздечка)
//!
//! Единственное, что locomotion берёт из снаряжения: control scheme.

use bevy::prelude::*;
use std::str::FromStr;

/// Как передаются move клавиши
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum ControlScheme {
    /// Клавишу держим каждый тик
    #[default]
    Hold,
    /// Свежее нажатие переключает, удержание не повторяет
    Press,
}

impl FromStr for ControlScheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hold" | "hold" => Ok(ControlScheme::Hold),
            "Press" | "press" => Ok(ControlScheme::Press),
            _ => Err(()),
        }
    }
}

/// Предмет в слоте снаряжения
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct GearItem {
    pub code: String,
    /// Атрибут предмета `controlScheme` (может быть мусором)
    pub control_scheme: Option<String>,
}

impl GearItem {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            control_scheme: None,
        }
    }

    pub fn with_control_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.control_scheme = Some(scheme.into());
        self
    }
}

/// Слоты снаряжения маунта (None = пустой слот)
///
/// Любая мутация слотов → Changed<AttachedGear> → пересчёт control scheme.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AttachedGear {
    pub slots: Vec<Option<GearItem>>,
}

impl AttachedGear {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    pub fn put(&mut self, slot: usize, item: GearItem) {
        if slot >= self.slots.len() {
            self.slots.resize(slot + 1, None);
        }
        self.slots[slot] = Some(item);
    }

    pub fn take(&mut self, slot: usize) -> Option<GearItem> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Первый предмет с парсящимся `controlScheme`, иначе Hold
    ///
    /// Чистая функция от содержимого: повторный вызов даёт тот же ответ.
    pub fn resolve_control_scheme(&self) -> ControlScheme {
        self.slots
            .iter()
            .flatten()
            .filter_map(|item| item.control_scheme.as_deref())
            .find_map(|raw| raw.parse::<ControlScheme>().ok())
            .unwrap_or_default()
    }
}
