//! Seat-to-Motion translator
//!
//! Ввод всех управляющих мест → один вектор (linear, angular) на тик.
//!
//! Правила:
//! - Controller = первое controllable место с пассажиром
//! - Каждое место с вводом добавляет вклад: первое с весом 1, остальные по 0.5
//! - can-ride гейтит jump/move (проверяется только если нажат jump или move),
//!   can-turn гейтит left/right (только если нажат поворот)
//! - Jump: раз в 1500ms, только живым и на земле (или 150ms coyote window)
//! - Hold: клавишу держим каждый тик. Press: свежее нажатие, удержание не повторяет
//! - Смена gait: свежий forward из idle → первый forward gait, из backward → idle;
//!   sprint при движении вперёд → ступень вверх, backward → ступень вниз (общий cooldown 300ms)
//!
//! Gait меняем только на authoritative стороне, edges/таймеры: на обеих.

use bevy::prelude::*;

use crate::components::ControlScheme;
use crate::gait::{GaitOrder, GaitProvider};
use crate::logger;

use super::authorization::{RideChecks, RideVerdict};
use super::seat::Seats;

pub const JUMP_COOLDOWN_MS: i64 = 1500;
pub const COYOTE_TIME: f32 = 0.15;
pub const GAIT_CHANGE_COOLDOWN_MS: i64 = 300;
/// Вес второго и следующих гребцов
pub const SECONDARY_WEIGHT: f32 = 0.5;

/// Внешние условия тика
#[derive(Debug, Clone, Copy)]
pub struct MotionContext {
    /// Длина шага симуляции (секунды), не render dt
    pub dt: f32,
    pub now_ms: i64,
    pub alive: bool,
    pub on_ground: bool,
    pub authoritative: bool,
}

/// Состояние translator'а, живёт в сессии
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslatorState {
    pub scheme: ControlScheme,
    pub coyote_timer: f32,
    pub last_jump_ms: Option<i64>,
    pub last_gait_change_ms: Option<i64>,
}

impl TranslatorState {
    fn jump_ready(&self, now_ms: i64) -> bool {
        self.last_jump_ms
            .map_or(true, |last| now_ms - last > JUMP_COOLDOWN_MS)
    }

    fn gait_change_ready(&self, now_ms: i64) -> bool {
        self.last_gait_change_ms
            .map_or(true, |last| now_ms - last > GAIT_CHANGE_COOLDOWN_MS)
    }
}

/// Результат тика translator'а
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatMotion {
    /// Знак = направление, модуль ~ dt·2·Σweight
    pub linear: f32,
    /// > 0: налево
    pub angular: f32,
    pub jump: bool,
    pub controller: Option<Entity>,
    pub contributors: u32,
    /// (пассажир, причина): для in-game ошибки
    pub denials: Vec<(Entity, String)>,
}

/// Ступень по порядку gait (speedUp / slowDown)
///
/// false если не authoritative или gait не изменился. Без controller: в idle.
pub fn step_gait(
    gaits: &mut impl GaitProvider,
    order: &GaitOrder,
    forward: bool,
    controlled: bool,
    authoritative: bool,
) -> bool {
    if !authoritative {
        return false;
    }

    let next = order.next(gaits, forward, controlled).code.clone();
    set_gait(gaits, &next)
}

fn set_gait(gaits: &mut impl GaitProvider, code: &str) -> bool {
    if gaits.current_gait().code == code {
        return false;
    }

    logger::log(&format!("gait {} -> {}", gaits.current_gait().code, code));
    gaits.set_current(code)
}

pub fn seats_to_motion(
    state: &mut TranslatorState,
    seats: &mut Seats,
    checks: Option<&RideChecks>,
    gaits: &mut impl GaitProvider,
    order: &GaitOrder,
    ctx: &MotionContext,
) -> SeatMotion {
    let mut motion = SeatMotion::default();

    state.coyote_timer -= ctx.dt;
    if ctx.on_ground {
        state.coyote_timer = COYOTE_TIME;
    }

    for seat in seats.seats.iter_mut() {
        let Some(passenger) = seat.passenger else {
            continue;
        };
        if !seat.config.controllable {
            continue;
        }

        if motion.controller.is_none() {
            motion.controller = Some(passenger);
        }

        let controls = seat.controls;

        let ride = match checks {
            Some(checks) if controls.jump || controls.tries_to_move() => checks.can_ride(seat),
            _ => RideVerdict::Allowed,
        };
        let turn = match checks {
            Some(checks) if controls.turning() => checks.can_turn(seat),
            _ => RideVerdict::Allowed,
        };

        for verdict in [&ride, &turn] {
            if let RideVerdict::Denied(reason) = verdict {
                motion.denials.push((passenger, reason.clone()));
            }
        }

        let can_ride = ride.is_allowed();
        let can_turn = turn.is_allowed();

        // Вклад только от разрешённых категорий; нечего вносить: место не гребёт
        if !can_ride && !(can_turn && controls.turning()) {
            continue;
        }

        if can_ride
            && controls.jump
            && state.jump_ready(ctx.now_ms)
            && ctx.alive
            && (ctx.on_ground || state.coyote_timer > 0.0)
        {
            state.last_jump_ms = Some(ctx.now_ms);
            motion.jump = true;
        }

        if state.scheme == ControlScheme::Hold && !controls.tries_to_move() {
            continue;
        }

        motion.contributors += 1;
        let weight = if motion.contributors == 1 {
            1.0
        } else {
            SECONDARY_WEIGHT
        };

        if can_ride {
            let forward_pressed = controls.forward && !seat.edges.forward;
            let backward_pressed = controls.backward && !seat.edges.backward;
            let sprint_pressed = controls.sprint && !seat.edges.sprint;

            if forward_pressed && gaits.is_idle() && ctx.authoritative {
                let first = order.first_forward(gaits).code.clone();
                set_gait(gaits, &first);
            }

            if forward_pressed && gaits.is_backward() && ctx.authoritative {
                let idle = gaits.idle_gait().code.clone();
                set_gait(gaits, &idle);
            }

            if gaits.is_forward() && sprint_pressed && state.gait_change_ready(ctx.now_ms) {
                step_gait(gaits, order, true, true, ctx.authoritative);
                state.last_gait_change_ms = Some(ctx.now_ms);
            }

            if backward_pressed && state.gait_change_ready(ctx.now_ms) {
                step_gait(gaits, order, false, true, ctx.authoritative);
                state.last_gait_change_ms = Some(ctx.now_ms);
            }

            let press = state.scheme == ControlScheme::Press;
            seat.edges.sprint = controls.sprint;
            seat.edges.forward = press && controls.forward;
            seat.edges.backward = press && controls.backward;
        }

        if can_turn && controls.turning() {
            let dir = if controls.left { 1.0 } else { -1.0 };
            motion.angular += weight * dir * ctx.dt;
        }

        if can_ride && (gaits.is_forward() || gaits.is_backward()) {
            let dir = if gaits.is_forward() { 1.0 } else { -1.0 };
            motion.linear += weight * dir * ctx.dt * 2.0;
        }
    }

    motion
}
