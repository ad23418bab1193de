//! Фатальные ошибки setup реально попадают в лог
//!
//! Logger глобальный на процесс, поэтому здесь один тест на бинарь.

use bevy::prelude::*;
use hoofbeat_simulation::logger::{self, LogLevel, MemoryLogger};
use hoofbeat_simulation::mount::RideableSetupFailed;
use hoofbeat_simulation::*;

const ELK_JSON: &str = include_str!("../assets/entities/elk.json");

#[test]
fn test_setup_failures_are_logged() {
    let memory = MemoryLogger::default();
    logger::set_logger(Box::new(memory.clone()));
    logger::set_log_level(LogLevel::Info);

    let mut app = create_headless_app(5);

    let mut config = EntityTypeConfig::from_json(ELK_JSON).unwrap();
    let healthy = {
        let mut commands = app.world_mut().commands();
        let seats = Seats::new(vec![Seat::new("front", SeatConfig::default())]);
        spawn_rideable(&mut commands, &config, seats, Vec3::new(0.0, 0.9, 0.0)).unwrap()
    };

    config.gait = None;
    let broken = {
        let mut commands = app.world_mut().commands();
        let seats = Seats::new(vec![Seat::new("front", SeatConfig::default())]);
        spawn_rideable(&mut commands, &config, seats, Vec3::new(4.0, 0.9, 0.0)).unwrap()
    };
    app.world_mut().flush();

    run_fixed_ticks(&mut app, 1);

    assert!(app.world().get::<RideableSession>(healthy).is_some());
    assert!(app.world().get::<RideableSession>(broken).is_none());

    assert!(memory.contains(LogLevel::Info, "ready"));
    assert!(memory.contains(LogLevel::Error, "rideable setup failed"));
    assert!(memory.contains(LogLevel::Error, "gait provider"));
    // Debug отфильтрован уровнем
    assert!(!memory.contains(LogLevel::Debug, ""));

    let failed = app.world().resource::<Events<RideableSetupFailed>>();
    let failed: Vec<_> = failed.get_cursor().read(failed).cloned().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].entity, broken);
}
