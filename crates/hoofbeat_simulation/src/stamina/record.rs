//! Stamina запись существа (persisted + синхронизируется клиентам)
//!
//! Инварианты (после каждой мутации):
//! - 0 ≤ current ≤ max × max_stamina_multiplier
//! - exhausted == current / max ≤ threshold (после recompute_exhaustion)
//! - max > 0

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::StaminaConfig;
use crate::logger;

/// Max stamina, если конфиг дал не положительное значение
pub const DEFAULT_MAX_STAMINA: f32 = 100.0;

/// Откуда усталость
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FatigueCause {
    Run,
    Mounted,
    Jump,
    Swim,
    Mental,
    Attack,
    Defense,
    Weather,
}

/// Источник усталости
#[derive(Debug, Clone, PartialEq)]
pub struct FatigueSource {
    pub cause: FatigueCause,
    /// Кто/что утомило (например снаряд)
    pub source_entity: Option<Entity>,
    /// Кто стоит за source_entity (метнувший снаряд)
    pub cause_entity: Option<Entity>,
    pub source_pos: Option<Vec3>,
}

impl FatigueSource {
    pub fn new(cause: FatigueCause) -> Self {
        Self {
            cause,
            source_entity: None,
            cause_entity: None,
            source_pos: None,
        }
    }

    /// Усталость, которую существо причиняет само себе (бег, плавание)
    pub fn internal(cause: FatigueCause, entity: Entity, position: Vec3) -> Self {
        Self {
            cause,
            source_entity: Some(entity),
            cause_entity: Some(entity),
            source_pos: Some(position),
        }
    }

    pub fn from_entity(mut self, entity: Entity) -> Self {
        self.source_entity = Some(entity);
        self
    }

    pub fn caused_by(mut self, entity: Entity) -> Self {
        self.cause_entity = Some(entity);
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.source_pos = Some(position);
        self
    }

    /// Позиция: явная → позиция source entity → ноль
    pub fn position(&self, entity_position: impl FnOnce(Entity) -> Option<Vec3>) -> Vec3 {
        if let Some(pos) = self.source_pos {
            return pos;
        }
        self.source_entity
            .and_then(entity_position)
            .unwrap_or(Vec3::ZERO)
    }

    /// Виновник: cause entity, иначе source entity
    pub fn cause_entity(&self) -> Option<Entity> {
        self.cause_entity.or(self.source_entity)
    }
}

/// Контекст применения усталости
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FatigueContext {
    pub alive: bool,
    pub authoritative: bool,
    pub max_multiplier: f32,
}

/// Stamina запись (ключи как в сохранениях)
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaRecord {
    pub currentstamina: f32,
    pub maxstamina: f32,
    pub exhausted: bool,
    pub sprinting: bool,
    pub fleeing: bool,
    pub sprintfatigue: f32,
    pub swimfatigue: f32,
    pub basefatiguerate: f32,
    pub staminaregenrate: f32,
    pub regenpenaltywounded: f32,
    pub regenpenaltymounted: f32,
    pub exhaustionthreshold: f32,

    /// Бегущий от угрозы без сил останавливается (из конфига, не сохраняется)
    #[serde(skip, default = "default_true")]
    pub dont_flee_when_exhausted: bool,
    /// В этом интервале была усталость → регена нет
    #[serde(skip)]
    pub actively_fatiguing: bool,
    #[serde(skip)]
    dirty: bool,
}

fn default_true() -> bool {
    true
}

impl StaminaRecord {
    /// Новое существо: полная stamina (или `currentstamina` из конфига)
    pub fn seeded(config: &StaminaConfig) -> Self {
        let maxstamina = positive_or_default(config.maxstamina);
        let mut record = Self {
            currentstamina: config.currentstamina.unwrap_or(maxstamina),
            maxstamina,
            exhausted: false,
            sprinting: false,
            fleeing: false,
            sprintfatigue: 0.0,
            swimfatigue: 0.0,
            basefatiguerate: 0.0,
            staminaregenrate: 0.0,
            regenpenaltywounded: 0.0,
            regenpenaltymounted: 0.0,
            exhaustionthreshold: 0.0,
            dont_flee_when_exhausted: true,
            actively_fatiguing: false,
            dirty: false,
        };
        record.refresh_from_config(config);
        record
    }

    /// Загрузка из сохранения: current сохраняется (зажат под новый max), rates из конфига
    pub fn reloaded(persisted: StaminaRecord, config: &StaminaConfig) -> Self {
        let mut record = persisted;
        record.refresh_from_config(config);
        record
    }

    fn refresh_from_config(&mut self, config: &StaminaConfig) {
        if config.maxstamina > 0.0 {
            self.maxstamina = config.maxstamina;
        } else if self.maxstamina <= 0.0 {
            self.maxstamina = DEFAULT_MAX_STAMINA;
        }
        self.currentstamina = self.currentstamina.clamp(0.0, self.maxstamina);
        self.sprintfatigue = config.sprintfatigue;
        self.swimfatigue = config.swimfatigue;
        self.basefatiguerate = config.basefatiguerate;
        self.staminaregenrate = config.staminaregenrate;
        self.regenpenaltywounded = config.regenpenaltywounded;
        self.regenpenaltymounted = config.regenpenaltymounted;
        self.exhaustionthreshold = config.exhaustionthreshold.clamp(0.0, 1.0);
        self.dont_flee_when_exhausted = config.dontfleewhenexhausted;
        self.mark_dirty();
    }

    pub fn adjusted_max(&self, max_multiplier: f32) -> f32 {
        self.maxstamina * max_multiplier
    }

    /// Зажать current в [0, adjusted max] (self-heal битых сохранений)
    pub fn clamp_current(&mut self, max_multiplier: f32) {
        let clamped = self.currentstamina.clamp(0.0, self.adjusted_max(max_multiplier).max(0.0));
        if clamped != self.currentstamina {
            self.currentstamina = clamped;
            self.mark_dirty();
        }
    }

    /// Снять `basefatiguerate × amount`
    ///
    /// Возвращает true, если усталость засчитана (amount > 0, NaN не считается): даже
    /// мёртвому или на клиенте: реген в этом интервале всё равно выключается.
    pub fn apply_fatigue(&mut self, amount: f32, source: &FatigueSource, ctx: FatigueContext) -> bool {
        if amount.is_nan() || amount <= 0.0 {
            return false;
        }
        self.actively_fatiguing = true;

        if !ctx.authoritative || !ctx.alive {
            return true;
        }

        let before = self.currentstamina;
        self.currentstamina = (self.currentstamina - self.basefatiguerate * amount)
            .clamp(0.0, self.adjusted_max(ctx.max_multiplier));
        self.mark_dirty();

        logger::log(&format!(
            "fatigue {:?}: {:.3} → {:.3}",
            source.cause, before, self.currentstamina
        ));
        true
    }

    /// Реген за `elapsed` секунд
    ///
    /// rate = (regen − wounded − mounted) × regen_multiplier, четверть rate на
    /// игровую секунду интервала. Выше adjusted max не поднимаемся.
    #[allow(clippy::too_many_arguments)]
    pub fn regenerate(
        &mut self,
        elapsed: f32,
        time_acceleration: f32,
        wounded: bool,
        mounted: bool,
        regen_multiplier: f32,
        max_multiplier: f32,
    ) {
        let max = self.adjusted_max(max_multiplier);
        if self.currentstamina >= max {
            return;
        }

        let wounded_penalty = if wounded { self.regenpenaltywounded } else { 0.0 };
        let mounted_penalty = if mounted { self.regenpenaltymounted } else { 0.0 };
        let rate = (self.staminaregenrate - wounded_penalty - mounted_penalty) * regen_multiplier;

        let per_quarter_second = 0.25 * rate;
        let game_seconds = elapsed * time_acceleration;

        self.currentstamina = (self.currentstamina + game_seconds * per_quarter_second).clamp(0.0, max);
        self.mark_dirty();
    }

    pub fn recompute_exhaustion(&mut self) {
        self.exhausted = self.currentstamina / self.maxstamina <= self.exhaustionthreshold;
    }

    pub fn info_text(&self, max_multiplier: f32) -> String {
        format!(
            "stamina: {:.1} / {:.1}",
            self.currentstamina,
            self.adjusted_max(max_multiplier)
        )
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Сбросить dirty, вернуть был ли он
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

fn positive_or_default(max: f32) -> f32 {
    if max > 0.0 {
        max
    } else {
        DEFAULT_MAX_STAMINA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: FatigueContext = FatigueContext {
        alive: true,
        authoritative: true,
        max_multiplier: 1.0,
    };

    fn record() -> StaminaRecord {
        StaminaRecord::seeded(&StaminaConfig::default())
    }

    #[test]
    fn test_seeded_full() {
        let record = record();
        assert_eq!(record.currentstamina, 100.0);
        assert_eq!(record.maxstamina, 100.0);
        assert_eq!(record.staminaregenrate, 0.5);
        assert!(record.is_dirty());
    }

    #[test]
    fn test_seeded_with_current_override() {
        let config = StaminaConfig {
            currentstamina: Some(40.0),
            ..default()
        };
        assert_eq!(StaminaRecord::seeded(&config).currentstamina, 40.0);
    }

    #[test]
    fn test_apply_fatigue_scaled_and_clamped() {
        let mut record = record();
        record.basefatiguerate = 2.0;
        let source = FatigueSource::new(FatigueCause::Attack);

        assert!(record.apply_fatigue(10.0, &source, SERVER));
        assert_eq!(record.currentstamina, 80.0);

        record.apply_fatigue(1000.0, &source, SERVER);
        assert_eq!(record.currentstamina, 0.0);
    }

    #[test]
    fn test_apply_fatigue_noops() {
        let mut record = record();
        let source = FatigueSource::new(FatigueCause::Weather);

        assert!(!record.apply_fatigue(0.0, &source, SERVER));
        assert!(!record.apply_fatigue(-5.0, &source, SERVER));
        assert!(!record.actively_fatiguing);

        let dead = FatigueContext { alive: false, ..SERVER };
        assert!(record.apply_fatigue(5.0, &source, dead));
        let replica = FatigueContext { authoritative: false, ..SERVER };
        assert!(record.apply_fatigue(5.0, &source, replica));

        assert_eq!(record.currentstamina, 100.0);
        assert!(record.actively_fatiguing);
    }

    #[test]
    fn test_nan_fatigue_is_ignored() {
        let mut record = record();
        let source = FatigueSource::new(FatigueCause::Attack);

        assert!(!record.apply_fatigue(f32::NAN, &source, SERVER));
        assert!(!record.actively_fatiguing);
        assert_eq!(record.currentstamina, 100.0);

        // Запись не отравлена: дальше всё считается
        assert!(record.apply_fatigue(10.0, &source, SERVER));
        assert_eq!(record.currentstamina, 90.0);
    }

    #[test]
    fn test_regenerate_with_penalties() {
        let mut record = record();
        record.currentstamina = 50.0;

        // 0.25s × 30 ускорение = 7.5 игровых секунд; rate 0.5 − 0.3 (mounted) = 0.2
        record.regenerate(0.25, 30.0, false, true, 1.0, 1.0);
        let expected = 50.0 + 7.5 * 0.25 * 0.2;
        assert!((record.currentstamina - expected).abs() < 1e-4);
    }

    #[test]
    fn test_regenerate_never_exceeds_max() {
        let mut record = record();
        record.currentstamina = 99.99;
        record.regenerate(0.25, 30.0, false, false, 1.0, 1.0);
        assert_eq!(record.currentstamina, 100.0);
    }

    #[test]
    fn test_exhaustion_threshold() {
        let mut record = record();
        record.currentstamina = 19.0;
        record.recompute_exhaustion();
        assert!(record.exhausted);

        record.currentstamina = 20.5;
        record.recompute_exhaustion();
        assert!(!record.exhausted);

        // Ровно на пороге: уже exhausted
        record.currentstamina = 20.0;
        record.recompute_exhaustion();
        assert!(record.exhausted);
    }

    #[test]
    fn test_persisted_keys_and_roundtrip() {
        let mut record = record();
        record.currentstamina = 42.0;
        record.recompute_exhaustion();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["currentstamina"], 42.0);
        assert!(json.get("dirty").is_none());

        let mut restored: StaminaRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored.currentstamina, 42.0);
        assert_eq!(restored.maxstamina, 100.0);
        assert_eq!(restored.swimfatigue, record.swimfatigue);
        assert!(restored.dont_flee_when_exhausted);

        restored.recompute_exhaustion();
        assert_eq!(restored.exhausted, record.exhausted);
    }

    #[test]
    fn test_reload_clamps_to_new_max() {
        let mut persisted = record();
        persisted.currentstamina = 90.0;

        let config = StaminaConfig {
            maxstamina: 60.0,
            staminaregenrate: 1.5,
            ..default()
        };
        let reloaded = StaminaRecord::reloaded(persisted, &config);
        assert_eq!(reloaded.maxstamina, 60.0);
        assert_eq!(reloaded.currentstamina, 60.0);
        assert_eq!(reloaded.staminaregenrate, 1.5);
    }

    #[test]
    fn test_non_positive_max_falls_back() {
        let config = StaminaConfig {
            maxstamina: 0.0,
            ..default()
        };
        let record = StaminaRecord::seeded(&config);
        assert_eq!(record.maxstamina, DEFAULT_MAX_STAMINA);
    }

    #[test]
    fn test_fatigue_source_fallbacks() {
        let horse = Entity::from_raw(3);
        let rider = Entity::from_raw(4);

        let source = FatigueSource::new(FatigueCause::Run).from_entity(horse);
        assert_eq!(source.cause_entity(), Some(horse));
        assert_eq!(source.position(|_| Some(Vec3::X)), Vec3::X);

        let source = source.caused_by(rider).at(Vec3::Y);
        assert_eq!(source.cause_entity(), Some(rider));
        assert_eq!(source.position(|_| Some(Vec3::X)), Vec3::Y);

        assert_eq!(FatigueSource::new(FatigueCause::Mental).position(|_| None), Vec3::ZERO);
    }

    #[test]
    fn test_info_text() {
        assert_eq!(record().info_text(1.5), "stamina: 100.0 / 150.0");
    }
}
