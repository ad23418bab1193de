//! Gait catalog: внешний collaborator (locomotion только читает + просит сменить gait)
//!
//! - `Gait`: именованный tier скорости (walk, trot, gallop, walkback)
//! - `GaitProvider`: интерфейс, через который mount модуль работает с каталогом
//! - `GaitTable`: компонент-каталог с текущим gait
//! - `GaitOrder`: упорядоченная по скорости подпоследовательность для езды

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gait {
    pub code: String,
    #[serde(default)]
    pub move_speed: f32,
    #[serde(default)]
    pub is_sprint: bool,
    #[serde(default)]
    pub is_backwards: bool,
    #[serde(default)]
    pub sound: Option<String>,
}

impl Gait {
    pub fn new(code: impl Into<String>, move_speed: f32) -> Self {
        Self {
            code: code.into(),
            move_speed,
            is_sprint: false,
            is_backwards: false,
            sound: None,
        }
    }

    pub fn backwards(mut self) -> Self {
        self.is_backwards = true;
        self
    }

    pub fn sprint(mut self) -> Self {
        self.is_sprint = true;
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn is_idle(&self) -> bool {
        self.move_speed == 0.0 && !self.is_sprint && !self.is_backwards
    }

    pub fn is_forward(&self) -> bool {
        !self.is_backwards && self.move_speed > 0.0
    }
}

/// Что locomotion нужно от gait каталога
pub trait GaitProvider {
    fn current_gait(&self) -> &Gait;
    fn idle_gait(&self) -> &Gait;
    fn gait(&self, code: &str) -> Option<&Gait>;
    /// false если кода нет в каталоге
    fn set_current(&mut self, code: &str) -> bool;
    fn turn_radius(&self) -> f32;

    fn set_idle(&mut self) {
        let idle = self.idle_gait().code.clone();
        self.set_current(&idle);
    }

    fn is_idle(&self) -> bool {
        self.current_gait().code == self.idle_gait().code
    }

    fn is_forward(&self) -> bool {
        self.current_gait().is_forward()
    }

    fn is_backward(&self) -> bool {
        self.current_gait().is_backwards
    }
}

/// Каталог gait для entity
///
/// Инвариант: ровно один idle gait, коды уникальны, current всегда валидный индекс.
#[derive(Component, Debug, Clone)]
pub struct GaitTable {
    gaits: Vec<Gait>,
    idle: usize,
    current: usize,
    turn_radius: f32,
}

impl GaitTable {
    pub fn new(gaits: Vec<Gait>, turn_radius: f32) -> Result<Self, SetupError> {
        for (i, gait) in gaits.iter().enumerate() {
            if gaits[..i].iter().any(|g| g.code == gait.code) {
                return Err(SetupError::DuplicateGait(gait.code.clone()));
            }
        }

        let idle: Vec<usize> = gaits
            .iter()
            .enumerate()
            .filter(|(_, g)| g.is_idle())
            .map(|(i, _)| i)
            .collect();

        if idle.len() != 1 {
            return Err(SetupError::IdleGaitCount(idle.len()));
        }

        Ok(Self {
            gaits,
            idle: idle[0],
            current: idle[0],
            turn_radius,
        })
    }

    pub fn gaits(&self) -> &[Gait] {
        &self.gaits
    }
}

impl GaitProvider for GaitTable {
    fn current_gait(&self) -> &Gait {
        &self.gaits[self.current]
    }

    fn idle_gait(&self) -> &Gait {
        &self.gaits[self.idle]
    }

    fn gait(&self, code: &str) -> Option<&Gait> {
        self.gaits.iter().find(|g| g.code == code)
    }

    fn set_current(&mut self, code: &str) -> bool {
        match self.gaits.iter().position(|g| g.code == code) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    fn turn_radius(&self) -> f32 {
        self.turn_radius
    }
}

/// Упорядоченные gait коды для езды (строится один раз при spawn)
///
/// Пересечение `rideableGaitOrder` с каталогом: без дублей, без неизвестных кодов.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaitOrder {
    codes: Vec<String>,
}

impl GaitOrder {
    pub fn build(order: &[String], catalog: &impl GaitProvider) -> Self {
        let mut codes: Vec<String> = Vec::with_capacity(order.len());
        for code in order {
            if catalog.gait(code).is_some() && !codes.contains(code) {
                codes.push(code.clone());
            }
        }
        Self { codes }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| c == code)
    }

    /// Первый forward gait по порядку, иначе idle
    pub fn first_forward<'a>(&self, catalog: &'a impl GaitProvider) -> &'a Gait {
        self.codes
            .iter()
            .filter_map(|code| catalog.gait(code))
            .find(|gait| gait.is_forward())
            .unwrap_or_else(|| catalog.idle_gait())
    }

    /// Соседний gait (шаг вверх/вниз)
    ///
    /// Снизу упираемся в первый код. Шаг вверх с последнего кода: на ступень ниже.
    /// Никто не управляет или порядок пуст: idle. Текущего gait нет в порядке:
    /// вверх = первый forward, вниз = idle.
    pub fn next<'a>(
        &self,
        catalog: &'a impl GaitProvider,
        forward: bool,
        controlled: bool,
    ) -> &'a Gait {
        if !controlled || self.codes.is_empty() {
            return catalog.idle_gait();
        }

        let Some(index) = self.index_of(&catalog.current_gait().code) else {
            return if forward {
                self.first_forward(catalog)
            } else {
                catalog.idle_gait()
            };
        };

        let next = if forward {
            if index + 1 >= self.codes.len() {
                index.saturating_sub(1)
            } else {
                index + 1
            }
        } else {
            index.saturating_sub(1)
        };

        catalog
            .gait(&self.codes[next])
            .unwrap_or_else(|| catalog.idle_gait())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elk_gaits() -> GaitTable {
        GaitTable::new(
            vec![
                Gait::new("walkback", 1.0).backwards(),
                Gait::new("idle", 0.0),
                Gait::new("walk", 1.5).with_sound("creature/elk/walk"),
                Gait::new("trot", 3.0).with_sound("creature/elk/trot"),
                Gait::new("gallop", 6.0).sprint().with_sound("creature/elk/gallop"),
            ],
            3.5,
        )
        .unwrap()
    }

    fn order(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_catalog_requires_single_idle() {
        let err = GaitTable::new(vec![Gait::new("walk", 1.0)], 3.5).unwrap_err();
        assert!(matches!(err, SetupError::IdleGaitCount(0)));

        let err = GaitTable::new(vec![Gait::new("idle", 0.0), Gait::new("rest", 0.0)], 3.5)
            .unwrap_err();
        assert!(matches!(err, SetupError::IdleGaitCount(2)));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let err = GaitTable::new(vec![Gait::new("idle", 0.0), Gait::new("idle", 0.0)], 3.5)
            .unwrap_err();
        assert!(matches!(err, SetupError::DuplicateGait(_)));
    }

    #[test]
    fn test_order_skips_unknown_and_duplicates() {
        let gaits = elk_gaits();
        let gait_order = GaitOrder::build(
            &order(&["walkback", "idle", "walk", "walk", "canter", "trot", "gallop"]),
            &gaits,
        );

        assert_eq!(
            gait_order.codes().to_vec(),
            order(&["walkback", "idle", "walk", "trot", "gallop"])
        );
    }

    #[test]
    fn test_next_gait_at_edges() {
        let mut gaits = elk_gaits();
        let order = GaitOrder::build(&order(&["walkback", "idle", "walk", "trot", "gallop"]), &gaits);

        // Сверху: откат на ступень ниже
        gaits.set_current("gallop");
        assert_eq!(order.next(&gaits, true, true).code, "trot");
        assert_eq!(order.next(&gaits, false, true).code, "trot");

        // Снизу: упираемся
        gaits.set_current("walkback");
        assert_eq!(order.next(&gaits, false, true).code, "walkback");

        gaits.set_current("idle");
        assert_eq!(order.next(&gaits, true, true).code, "walk");
        assert_eq!(order.next(&gaits, false, true).code, "walkback");
    }

    #[test]
    fn test_next_gait_without_controller_is_idle() {
        let mut gaits = elk_gaits();
        let order = GaitOrder::build(&order(&["walkback", "idle", "walk", "trot", "gallop"]), &gaits);

        gaits.set_current("trot");
        assert_eq!(order.next(&gaits, true, false).code, "idle");
        assert_eq!(order.next(&gaits, false, false).code, "idle");

        let empty = GaitOrder::default();
        assert_eq!(empty.next(&gaits, true, true).code, "idle");
    }

    #[test]
    fn test_single_gait_order_steps_onto_itself() {
        let mut gaits = elk_gaits();
        let order = GaitOrder::build(&order(&["walk"]), &gaits);

        gaits.set_current("walk");
        assert_eq!(order.next(&gaits, true, true).code, "walk");
    }

    #[test]
    fn test_first_forward_gait() {
        let gaits = elk_gaits();
        let order = GaitOrder::build(&order(&["walkback", "idle", "trot", "walk"]), &gaits);

        // Порядок из конфига, не из каталога
        assert_eq!(order.first_forward(&gaits).code, "trot");

        let empty = GaitOrder::default();
        assert_eq!(empty.first_forward(&gaits).code, "idle");
    }

    #[test]
    fn test_provider_flags() {
        let mut gaits = elk_gaits();
        assert!(gaits.is_idle());

        gaits.set_current("walkback");
        assert!(gaits.is_backward());
        assert!(!gaits.is_forward());

        gaits.set_current("trot");
        assert!(gaits.is_forward());

        gaits.set_idle();
        assert!(gaits.is_idle());
        assert!(!gaits.set_current("fly"));
    }
}
