//! Locomotion state machine маунта
//!
//! Состояния: Idle, Swimming, Moving(gait) + ортогональный флаг mid-jump.
//!
//! Каждый тик:
//! 1. `update_angle_and_motion`: translator → forward sign, angular velocity, yaw
//!    (server в FixedUpdate, client в render sampler)
//! 2. `update_riding_state`: turn overlay, descriptor (анимация), jump вход/выход
//! 3. `apply_movement`: walk/fly vectors из descriptor скорости + плавание + climbing
//!
//! Start/stop анимаций: только на изменении (повторный вызов с тем же входом = 0 вызовов).

use bevy::prelude::*;
use std::collections::HashMap;

use crate::animation::{AnimationPlayer, AnimationRequest};
use crate::components::{AttachedGear, BodyState, Heading, MountControls};
use crate::config::{ControlDescriptor, RideableConfig};
use crate::error::SetupError;
use crate::gait::{Gait, GaitOrder, GaitProvider};
use crate::physics::fluid::{swimline_submergedness, FluidQuery};
use crate::world_clock::PHYSICS_FRAME_TIME;

use super::authorization::RideChecks;
use super::motion::{seats_to_motion, step_gait, MotionContext, SeatMotion, TranslatorState};
use super::seat::Seats;

/// Mid-jump держится минимум столько после прыжка
pub const MID_JUMP_MS: i64 = 500;
/// Окно, в котором jump анимация маунта гасится при приземлении
pub const POST_JUMP_STOP_MS: (i64, i64) = (200, 2000);
/// Ease-out jump анимации, если прыгаем на ходу
pub const MOVING_JUMP_EASE_OUT: f32 = 30.0;
/// Yaw интегрируется в "тиках": angular·dt·30
pub const YAW_TICK_RATE: f32 = 30.0;
const TURN_EPSILON: f32 = 0.001;

#[derive(Debug, Clone, PartialEq, Eq, Default, Reflect)]
pub enum LocomotionPhase {
    #[default]
    Idle,
    Swimming,
    Moving(String),
}

/// Смена фазы (Idle → Moving и т.п.)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct LocomotionChanged {
    pub mount: Entity,
    pub from: LocomotionPhase,
    pub to: LocomotionPhase,
}

/// Descriptor, чья анимация сейчас играет на маунте
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDescriptor {
    pub key: String,
    pub animation: String,
    pub ease_out_speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct TurnOverlay {
    base: &'static str,
    /// Реально запущенный код (с `idle-` префиксом на месте)
    started: String,
}

/// Побочные эффекты тика для других entity (пассажиры, звук)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RidingEffects {
    pub passenger_start: Vec<AnimationRequest>,
    pub passenger_stop: Vec<String>,
    pub sounds: Vec<String>,
    pub phase_changed: Option<(LocomotionPhase, LocomotionPhase)>,
}

/// Всё, что state machine трогает на самом маунте
pub struct MountState<'a, G: GaitProvider> {
    pub gaits: &'a mut G,
    pub controls: &'a mut MountControls,
    pub anims: &'a mut dyn AnimationPlayer,
    pub heading: &'a mut Heading,
    pub body: &'a BodyState,
    pub alive: bool,
    pub now_ms: i64,
    pub authoritative: bool,
}

/// Сессия езды: живёт на маунте с момента setup, сбрасывается в idle при высадке
#[derive(Component, Debug, Clone)]
pub struct RideableSession {
    controls: HashMap<String, ControlDescriptor>,
    order: GaitOrder,
    pub translator: TranslatorState,
    /// -1, 0, +1
    pub forward_speed: f32,
    pub angular_velocity: f32,
    /// Прыжок принят translator'ом, ещё не обработан state machine
    pub jump_now: bool,
    pub mid_jump: bool,
    current: Option<ActiveDescriptor>,
    turn: Option<TurnOverlay>,
    /// Что должны играть пассажиры
    pub rider_animation: Option<String>,
    pub phase: LocomotionPhase,
    pub controller: Option<Entity>,
}

impl RideableSession {
    pub fn new(config: &RideableConfig, gaits: &impl GaitProvider) -> Result<Self, SetupError> {
        config.validate()?;

        // Каждый gait из порядка езды (кроме idle) должен иметь свой descriptor,
        // иначе маунт "едет" на месте
        let order = GaitOrder::build(&config.rideable_gait_order, gaits);
        for code in order.codes() {
            let idle = gaits.gait(code).map_or(true, Gait::is_idle);
            if !idle && !config.controls.contains_key(code) {
                return Err(SetupError::MissingControl(code.clone()));
            }
        }

        let rider_animation = config
            .controls
            .get("idle")
            .and_then(|d| d.rider_animation.clone());

        Ok(Self {
            controls: config.controls.clone(),
            order,
            translator: TranslatorState::default(),
            forward_speed: 0.0,
            angular_velocity: 0.0,
            jump_now: false,
            mid_jump: false,
            current: None,
            turn: None,
            rider_animation,
            phase: LocomotionPhase::Idle,
            controller: None,
        })
    }

    pub fn gait_order(&self) -> &GaitOrder {
        &self.order
    }

    pub fn descriptor(&self, key: &str) -> Option<&ControlDescriptor> {
        self.controls.get(key)
    }

    pub fn current_descriptor(&self) -> Option<&ActiveDescriptor> {
        self.current.as_ref()
    }

    pub fn turn_animation(&self) -> Option<&str> {
        self.turn.as_ref().map(|t| t.started.as_str())
    }

    pub fn should_move(&self) -> bool {
        self.forward_speed != 0.0
    }

    pub fn speed_up(&self, gaits: &mut impl GaitProvider, authoritative: bool) -> bool {
        step_gait(gaits, &self.order, true, self.controller.is_some(), authoritative)
    }

    pub fn slow_down(&self, gaits: &mut impl GaitProvider, authoritative: bool) -> bool {
        step_gait(gaits, &self.order, false, self.controller.is_some(), authoritative)
    }

    pub fn first_forward_gait<'g>(&self, gaits: &'g impl GaitProvider) -> &'g Gait {
        self.order.first_forward(gaits)
    }

    /// Control scheme пересчитывается из снаряжения на каждый mount
    pub fn on_mount(&mut self, gear: Option<&AttachedGear>) {
        self.translator.scheme = gear
            .map(AttachedGear::resolve_control_scheme)
            .unwrap_or_default();
    }

    /// Translator → forward sign + angular velocity + yaw
    ///
    /// `dt`: реальный шаг (тик или render кадр), translator всегда считает от физ. кадра.
    pub fn update_angle_and_motion<G: GaitProvider>(
        &mut self,
        dt: f32,
        turn_radius: f32,
        mount: &mut MountState<'_, G>,
        seats: &mut Seats,
        checks: Option<&RideChecks>,
        effects: &mut RidingEffects,
    ) -> SeatMotion {
        let dt = dt.min(0.5);

        let ctx = MotionContext {
            dt: PHYSICS_FRAME_TIME,
            now_ms: mount.now_ms,
            alive: mount.alive,
            on_ground: mount.body.on_ground,
            authoritative: mount.authoritative,
        };
        let motion = seats_to_motion(
            &mut self.translator,
            seats,
            checks,
            &mut *mount.gaits,
            &self.order,
            &ctx,
        );
        self.controller = motion.controller;

        if motion.jump {
            self.jump_now = true;
            self.update_riding_state(mount, seats.any_mounted(), effects);
        }

        self.forward_speed = sign(motion.linear);
        self.angular_velocity = motion.angular * turn_radius;
        mount.heading.rotate(motion.angular * dt * YAW_TICK_RATE);

        if let Some(since) = self.ms_since_jump(mount.now_ms) {
            let (from, to) = POST_JUMP_STOP_MS;
            if since > from && since < to && mount.body.on_ground && mount.anims.is_playing("jump")
            {
                mount.anims.stop("jump");
            }
        }

        motion
    }

    fn ms_since_jump(&self, now_ms: i64) -> Option<i64> {
        self.translator.last_jump_ms.map(|last| now_ms - last)
    }

    /// Анимации + флаги controls из текущего forward/angular/jump
    pub fn update_riding_state<G: GaitProvider>(
        &mut self,
        mount: &mut MountState<'_, G>,
        any_mounted: bool,
        effects: &mut RidingEffects,
    ) {
        if !any_mounted {
            return;
        }

        let swimming = mount.body.swimming;

        // Mid-jump: минимум 500ms и до приземления, в воде не бывает
        let was_mid_jump = self.mid_jump;
        let recent = self
            .ms_since_jump(mount.now_ms)
            .is_some_and(|since| since < MID_JUMP_MS);
        self.mid_jump &= (recent || !mount.body.on_ground) && !swimming;

        if was_mid_jump && !self.mid_jump {
            if let Some(jump) = self.controls.get("jump") {
                if let Some(rider) = &jump.rider_animation {
                    effects.passenger_stop.push(rider.clone());
                }
                mount.anims.stop(&jump.animation);
            }
        }

        let forward_speed = self.forward_speed;
        mount.controls.backward = forward_speed < 0.0;
        mount.controls.forward = forward_speed > 0.0;
        mount.controls.sprint = mount.gaits.current_gait().is_sprint && forward_speed > 0.0;

        self.update_turn_overlay(mount);

        let now = if !self.should_move() && !self.jump_now {
            if self
                .current
                .as_ref()
                .is_some_and(|cur| !(swimming && cur.key == "swim"))
            {
                self.stop(mount);
            }

            let idle_key = if swimming { "swim" } else { "idle" };
            self.rider_animation = self
                .controls
                .get(idle_key)
                .and_then(|d| d.rider_animation.clone());

            if swimming {
                self.active("swim", None)
            } else {
                None
            }
        } else {
            let key = if swimming {
                "swim".to_string()
            } else {
                mount.gaits.current_gait().code.clone()
            };
            mount.controls.jump = self.jump_now;

            if self.jump_now {
                self.mid_jump = true;
                self.jump_now = false;

                let ease = (forward_speed != 0.0).then_some(MOVING_JUMP_EASE_OUT);
                if let Some(rider) = self
                    .controls
                    .get("jump")
                    .and_then(|d| d.rider_animation.clone())
                {
                    effects.passenger_start.push(AnimationRequest::new(rider));
                }
                effects.sounds.push("jump".to_string());

                self.active("jump", ease)
            } else {
                let now = self.active(&key, None);
                if let Some(descriptor) = self.controls.get(&key) {
                    self.rider_animation = descriptor.rider_animation.clone();
                }
                now
            }
        };

        if now.as_ref().map(|d| &d.key) != self.current.as_ref().map(|d| &d.key) {
            if let Some(cur) = &self.current {
                if cur.animation != "jump" {
                    mount.anims.stop(&cur.animation);
                }
            }

            if let Some(next) = &now {
                // idle, запущенный в stop(), не играет под gait
                let idle = self.idle_animation();
                if next.animation != idle && mount.anims.is_playing(&idle) {
                    mount.anims.stop(&idle);
                }
                mount.anims.start(AnimationRequest {
                    code: next.animation.clone(),
                    ease_out_speed: next.ease_out_speed,
                });
            }
            self.current = now;
        }

        let phase = if swimming {
            LocomotionPhase::Swimming
        } else if self.should_move() {
            LocomotionPhase::Moving(mount.gaits.current_gait().code.clone())
        } else {
            LocomotionPhase::Idle
        };
        if phase != self.phase {
            effects.phase_changed = Some((self.phase.clone(), phase.clone()));
            self.phase = phase;
        }
    }

    fn active(&self, key: &str, ease_override: Option<f32>) -> Option<ActiveDescriptor> {
        self.controls.get(key).map(|d| ActiveDescriptor {
            key: key.to_string(),
            animation: d.animation.clone(),
            ease_out_speed: ease_override.unwrap_or(d.ease_out_speed),
        })
    }

    fn update_turn_overlay<G: GaitProvider>(&mut self, mount: &mut MountState<'_, G>) {
        let now: Option<&'static str> = if self.forward_speed >= 0.0 {
            if self.angular_velocity > TURN_EPSILON {
                Some("turn-left")
            } else if self.angular_velocity < -TURN_EPSILON {
                Some("turn-right")
            } else {
                None
            }
        } else {
            None
        };

        if now == self.turn.as_ref().map(|t| t.base) {
            return;
        }

        if let Some(previous) = self.turn.take() {
            mount.anims.stop(&previous.started);
        }

        if let Some(base) = now {
            let started = if self.forward_speed == 0.0 {
                format!("idle-{}", base)
            } else {
                base.to_string()
            };
            mount.anims.start_code(&started);
            self.turn = Some(TurnOverlay { base, started });
        }
    }

    /// Стоп: gait → idle, движение обнулено, играет `idle`
    pub fn stop<G: GaitProvider>(&mut self, mount: &mut MountState<'_, G>) {
        if mount.authoritative {
            mount.gaits.set_idle();
        }
        mount.controls.stop_all_movement();
        self.forward_speed = 0.0;

        if let Some(cur) = self.current.take() {
            if cur.animation != "jump" {
                mount.anims.stop(&cur.animation);
            }
        }
        let idle = self.idle_animation();
        mount.anims.start_code(&idle);
    }

    fn idle_animation(&self) -> String {
        self.controls
            .get("idle")
            .map_or_else(|| "idle".to_string(), |d| d.animation.clone())
    }

    /// Walk/fly vectors из descriptor скорости
    ///
    /// `velocity`: скорость тела, сюда идёт прямой вертикальный толчок в воде.
    pub fn apply_movement<G: GaitProvider>(
        &self,
        mount: &mut MountState<'_, G>,
        position: Vec3,
        velocity: &mut Vec3,
        fluid: &dyn FluidQuery,
        overall_speed_multiplier: f32,
    ) {
        let body = mount.body;

        if !self.should_move() {
            if body.swimming {
                mount.controls.fly_vector.y = 0.2;
            }
            return;
        }

        let Some(descriptor) = self
            .current
            .as_ref()
            .and_then(|cur| self.controls.get(&cur.key))
        else {
            return;
        };

        let speed = descriptor.effective_speed(mount.gaits.current_gait().move_speed);
        let controls = &mut *mount.controls;
        controls.walk_vector =
            mount.heading.forward() * speed * overall_speed_multiplier * self.forward_speed;

        // Вдоль стены, но не в стену (иначе полезет вверх)
        if let Some(face) = body.climbing_face {
            if body.rotate_model_on_climb && controls.is_climbing && mount.alive {
                if sign(face.x) == sign(controls.walk_vector.x) {
                    controls.walk_vector.x = 0.0;
                }
                if sign(face.z) == sign(controls.walk_vector.z) {
                    controls.walk_vector.z = 0.0;
                }
            }
        }

        if body.swimming {
            controls.fly_vector = controls.walk_vector;

            let swimline = swimline_submergedness(position, body.swimming_offset_y, fluid);
            controls.fly_vector.y = controls.fly_vector.y.clamp(0.002, 0.004) * swimline * 3.0;

            if body.collided_horizontally {
                controls.fly_vector.y = 0.05;
            }

            // Толчок в blocks/tick → m/s
            velocity.y += (swimline - 0.1) / 300.0 / PHYSICS_FRAME_TIME;
        }
    }

    /// Высадка: сессия в idle, все анимации сессии остановлены
    ///
    /// `passenger_anims`: анимации уходящего пассажира (если он ещё существует).
    pub fn on_unmount<G: GaitProvider>(
        &mut self,
        mount: &mut MountState<'_, G>,
        passenger_anims: Option<&mut dyn AnimationPlayer>,
    ) {
        self.stop(mount);

        if let Some(turn) = self.turn.take() {
            mount.anims.stop(&turn.started);
        }
        if self.mid_jump {
            if let Some(jump) = self.controls.get("jump") {
                mount.anims.stop(&jump.animation);
            }
        }

        self.angular_velocity = 0.0;
        self.jump_now = false;
        self.mid_jump = false;
        self.controller = None;
        self.rider_animation = self
            .controls
            .get("idle")
            .and_then(|d| d.rider_animation.clone());

        if let Some(anims) = passenger_anims {
            for descriptor in self.controls.values() {
                if let Some(rider) = &descriptor.rider_animation {
                    anims.stop(rider);
                }
            }
        }

        if mount.body.swimming {
            mount.anims.start_code("swim");
            self.phase = LocomotionPhase::Swimming;
        } else {
            self.phase = LocomotionPhase::Idle;
        }
    }
}

/// Знак с нулём: f32::signum(0.0) == 1.0, а нам нужен 0
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
