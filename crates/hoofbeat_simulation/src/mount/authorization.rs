//! Can-ride / can-turn проверки
//!
//! Упорядоченный список предикатов `evaluate(seat) -> Allowed | Denied(reason)`,
//! первый Denied обрывает цепочку. Вето: обычное значение, не ошибка:
//! категория ввода выключается для этого места на один тик.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::logger;
use crate::world_clock::SimSide;

use super::seat::Seat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideVerdict {
    Allowed,
    /// Причина: ключ локализации без префикса (`tooheavy` → `cantride-tooheavy`)
    Denied(String),
}

impl RideVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RideVerdict::Allowed)
    }
}

pub trait RideCheck: Send + Sync + 'static {
    fn evaluate(&self, seat: &Seat) -> RideVerdict;
}

impl<F> RideCheck for F
where
    F: Fn(&Seat) -> RideVerdict + Send + Sync + 'static,
{
    fn evaluate(&self, seat: &Seat) -> RideVerdict {
        self(seat)
    }
}

/// Цепочки проверок маунта
#[derive(Component, Default)]
pub struct RideChecks {
    ride: Vec<Box<dyn RideCheck>>,
    turn: Vec<Box<dyn RideCheck>>,
}

impl RideChecks {
    /// Гейт на jump + move
    pub fn with_ride_check(mut self, check: impl RideCheck) -> Self {
        self.ride.push(Box::new(check));
        self
    }

    /// Гейт на left/right
    pub fn with_turn_check(mut self, check: impl RideCheck) -> Self {
        self.turn.push(Box::new(check));
        self
    }

    pub fn can_ride(&self, seat: &Seat) -> RideVerdict {
        evaluate_chain(&self.ride, seat)
    }

    pub fn can_turn(&self, seat: &Seat) -> RideVerdict {
        evaluate_chain(&self.turn, seat)
    }
}

fn evaluate_chain(chain: &[Box<dyn RideCheck>], seat: &Seat) -> RideVerdict {
    for check in chain {
        let verdict = check.evaluate(seat);
        if !verdict.is_allowed() {
            return verdict;
        }
    }
    RideVerdict::Allowed
}

/// Пассажиру отказано в категории ввода на этом тике
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct RideDenied {
    pub mount: Entity,
    pub passenger: Entity,
    pub reason: String,
}

/// Ошибка, показанная локальному игроку
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct IngameError {
    pub code: String,
    pub message: String,
}

/// Локальный игрок на этом клиенте (None на сервере)
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct LocalPlayer(pub Option<Entity>);

/// Таблица локализации (fallback: сам ключ)
#[derive(Resource, Debug, Clone, Default)]
pub struct Lang {
    entries: HashMap<String, String>,
}

impl Lang {
    pub fn with_entry(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }

    pub fn get(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Система: вето → in-game ошибка, но только у того клиента, кто сидит на месте
pub fn surface_ride_denials(
    mut denials: EventReader<RideDenied>,
    side: Res<SimSide>,
    local: Res<LocalPlayer>,
    lang: Res<Lang>,
    mut errors: EventWriter<IngameError>,
) {
    for denial in denials.read() {
        logger::log(&format!(
            "ride denied for {:?} on {:?}: {}",
            denial.passenger, denial.mount, denial.reason
        ));

        if *side != SimSide::Client || local.0 != Some(denial.passenger) {
            continue;
        }

        errors.write(IngameError {
            code: "cantride".to_string(),
            message: lang.get(&format!("cantride-{}", denial.reason)),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::seat::SeatConfig;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_chain_short_circuits_on_first_denial() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let checks = RideChecks::default()
            .with_ride_check(|_: &Seat| RideVerdict::Allowed)
            .with_ride_check(|_: &Seat| RideVerdict::Denied("tooheavy".into()))
            .with_ride_check(move |_: &Seat| {
                counter.fetch_add(1, Ordering::SeqCst);
                RideVerdict::Allowed
            });

        let seat = Seat::new("front", SeatConfig::default());
        assert_eq!(checks.can_ride(&seat), RideVerdict::Denied("tooheavy".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Turn цепочка пустая: разрешено
        assert!(checks.can_turn(&seat).is_allowed());
    }

    #[test]
    fn test_lang_falls_back_to_key() {
        let lang = Lang::default().with_entry("cantride-tooheavy", "You are too heavy");
        assert_eq!(lang.get("cantride-tooheavy"), "You are too heavy");
        assert_eq!(lang.get("cantride-tired"), "cantride-tired");
    }
}
