//! Animation/sound playback: граница с движком
//!
//! Симуляция только говорит "start X" / "stop X". Реальный плеер живёт на клиенте;
//! здесь `ActiveAnimations`: запись того, что сейчас играет (+ счётчики вызовов,
//! по ним тесты проверяют, что start/stop выдаются только на изменении).

use bevy::prelude::*;
use std::collections::BTreeMap;

/// Что играть: код анимации + скорость затухания
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub code: String,
    pub ease_out_speed: f32,
}

impl AnimationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ease_out_speed: 0.0,
        }
    }
}

pub trait AnimationPlayer {
    fn start(&mut self, request: AnimationRequest);
    fn stop(&mut self, code: &str);
    fn is_playing(&self, code: &str) -> bool;

    fn start_code(&mut self, code: &str) {
        self.start(AnimationRequest::new(code));
    }
}

/// Активные анимации entity
///
/// `variant_suffix`: модель с вариантной частью (рога лося): stop гасит и `code + suffix`.
#[derive(Component, Debug, Clone, Default)]
pub struct ActiveAnimations {
    playing: BTreeMap<String, f32>,
    pub variant_suffix: Option<String>,
    pub start_calls: u32,
    pub stop_calls: u32,
}

impl ActiveAnimations {
    pub fn with_variant_suffix(suffix: impl Into<String>) -> Self {
        Self {
            variant_suffix: Some(suffix.into()),
            ..default()
        }
    }

    pub fn playing(&self) -> impl Iterator<Item = &str> {
        self.playing.keys().map(String::as_str)
    }

    pub fn ease_out_speed(&self, code: &str) -> Option<f32> {
        self.playing.get(code).copied()
    }

    pub fn reset_counters(&mut self) {
        self.start_calls = 0;
        self.stop_calls = 0;
    }
}

impl AnimationPlayer for ActiveAnimations {
    fn start(&mut self, request: AnimationRequest) {
        self.start_calls += 1;
        self.playing.insert(request.code, request.ease_out_speed);
    }

    fn stop(&mut self, code: &str) {
        self.stop_calls += 1;
        self.playing.remove(code);
        if let Some(suffix) = &self.variant_suffix {
            self.playing.remove(&format!("{}{}", code, suffix));
        }
    }

    fn is_playing(&self, code: &str) -> bool {
        self.playing.contains_key(code)
    }
}

/// One-shot звук от entity (jump и т.п.)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SoundPlayed {
    pub entity: Entity,
    pub code: String,
}

/// Состояние зацикленного звука gait (только клиент)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Looping gait sound
///
/// Создаётся заново только при смене кода; позицию двигаем каждый тик.
#[derive(Component, Debug, Clone, Default)]
pub struct GaitSound {
    pub current: Option<String>,
    pub state: LoopState,
    pub position: Vec3,
    /// Сколько секунд маунт не на земле
    pub airborne_secs: f32,
    pub loads: u32,
}

impl GaitSound {
    /// Сменить звук. false если код тот же (ничего не делали)
    pub fn switch_to(&mut self, code: Option<String>) -> bool {
        if code == self.current {
            return false;
        }

        self.state = LoopState::Stopped;
        self.current = code;
        if self.current.is_some() {
            self.loads += 1;
            self.state = LoopState::Playing;
        }
        true
    }

    pub fn pause(&mut self) {
        if self.state == LoopState::Playing {
            self.state = LoopState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == LoopState::Paused {
            self.state = LoopState::Playing;
        }
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_suffix_stops_both() {
        let mut anims = ActiveAnimations::with_variant_suffix("-antlers");
        anims.start_code("walk");
        anims.start_code("walk-antlers");

        anims.stop("walk");
        assert!(!anims.is_playing("walk"));
        assert!(!anims.is_playing("walk-antlers"));
        assert_eq!(anims.stop_calls, 1);
    }

    #[test]
    fn test_gait_sound_switch_only_on_change() {
        let mut sound = GaitSound::default();

        assert!(sound.switch_to(Some("creature/elk/walk".into())));
        assert!(!sound.switch_to(Some("creature/elk/walk".into())));
        assert_eq!(sound.loads, 1);

        sound.pause();
        assert_eq!(sound.state, LoopState::Paused);
        sound.resume();
        assert_eq!(sound.state, LoopState::Playing);

        assert!(sound.switch_to(None));
        assert_eq!(sound.state, LoopState::Stopped);
    }
}
