//! Headless симуляция HOOFBEAT
//!
//! Сценарная поездка на лосе: посадка, разгон по gait'ам, поворот, прыжок,
//! торможение, высадка. Печатает gait/stamina по ходу.

use bevy::prelude::*;
use hoofbeat_simulation::{
    create_headless_app, logger, run_fixed_ticks, spawn_rideable, ActiveAnimations,
    EntityTypeConfig, GaitProvider, GaitTable, MountRequest, Seat, SeatConfig, Seats,
    StaminaRecord,
};

const ELK_JSON: &str = include_str!("../assets/entities/elk.json");

/// (тик, что делает всадник)
#[derive(Debug, Clone, Copy)]
enum Input {
    Forward(bool),
    Sprint(bool),
    Left(bool),
    Jump(bool),
    Backward(bool),
    Dismount,
}

const SCRIPT: &[(usize, Input)] = &[
    (30, Input::Forward(true)),
    (60, Input::Sprint(true)),
    (61, Input::Sprint(false)),
    (90, Input::Sprint(true)),
    (91, Input::Sprint(false)),
    (120, Input::Left(true)),
    (150, Input::Left(false)),
    (180, Input::Jump(true)),
    (181, Input::Jump(false)),
    (240, Input::Forward(false)),
    (250, Input::Backward(true)),
    (251, Input::Backward(false)),
    (300, Input::Dismount),
];

const TOTAL_TICKS: usize = 360;

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    logger::log_info(&format!("Starting HOOFBEAT headless ride (seed: {})", seed));

    let config = match EntityTypeConfig::from_json(ELK_JSON) {
        Ok(config) => config,
        Err(error) => {
            logger::log_error(&format!("elk config: {}", error));
            return;
        }
    };

    let seats = Seats::new(vec![
        Seat::new("front", SeatConfig::default()),
        Seat::new(
            "back",
            SeatConfig {
                controllable: false,
                mount_rotation_y: 0.0,
            },
        ),
    ]);

    let elk = {
        let mut commands = app.world_mut().commands();
        spawn_rideable(&mut commands, &config, seats, Vec3::new(0.0, 0.9, 0.0))
    };
    let elk = match elk {
        Ok(elk) => elk,
        Err(error) => {
            logger::log_error(&format!("spawn elk: {}", error));
            return;
        }
    };
    app.world_mut().flush();

    let rider = app.world_mut().spawn(ActiveAnimations::default()).id();

    // Setup сессии на первом тике
    run_fixed_ticks(&mut app, 1);
    app.world_mut().send_event(MountRequest::Mount {
        passenger: rider,
        mount: elk,
        seat: 0,
    });

    for tick in 0..TOTAL_TICKS {
        for (_, input) in SCRIPT.iter().filter(|(at, _)| *at == tick) {
            apply_input(&mut app, elk, rider, *input);
        }

        run_fixed_ticks(&mut app, 1);

        if tick % 30 == 0 {
            report(&app, elk, tick);
        }
    }

    logger::log_info("Ride complete!");
}

fn apply_input(app: &mut App, elk: Entity, rider: Entity, input: Input) {
    if let Input::Dismount = input {
        app.world_mut()
            .send_event(MountRequest::Dismount { passenger: rider });
        return;
    }

    let Some(mut seats) = app.world_mut().get_mut::<Seats>(elk) else {
        return;
    };
    let Some(seat) = seats.seat_of(rider) else {
        return;
    };
    let Some(controls) = seats.controls_mut(seat) else {
        return;
    };

    match input {
        Input::Forward(down) => controls.forward = down,
        Input::Sprint(down) => controls.sprint = down,
        Input::Left(down) => controls.left = down,
        Input::Jump(down) => controls.jump = down,
        Input::Backward(down) => controls.backward = down,
        Input::Dismount => {}
    }
}

fn report(app: &App, elk: Entity, tick: usize) {
    let world = app.world();
    let gait = world
        .get::<GaitTable>(elk)
        .map(|gaits| gaits.current_gait().code.clone())
        .unwrap_or_default();
    let position = world
        .get::<Transform>(elk)
        .map(|t| t.translation)
        .unwrap_or_default();
    let stamina = world
        .get::<StaminaRecord>(elk)
        .map(|record| record.info_text(1.0))
        .unwrap_or_default();

    logger::log_info(&format!(
        "Tick {}: gait={} pos=({:.2}, {:.2}, {:.2}) {}",
        tick, gait, position.x, position.y, position.z, stamina
    ));
}
