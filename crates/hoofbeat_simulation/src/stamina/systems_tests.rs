//! Tests for stamina systems.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    use crate::ai::{AiTaskKind, AiTaskManager, TaskScheduler};
    use crate::components::{BodyState, Health};
    use crate::config::{GameplayConstants, StaminaConfig};
    use crate::mount::{Seat, SeatConfig, Seats};
    use crate::stamina::modifiers::FatigueModifiers;
    use crate::stamina::record::{FatigueCause, FatigueSource, StaminaRecord};
    use crate::stamina::systems::*;
    use crate::stamina::StaminaPlugin;
    use crate::world_clock::{SimSide, WorldClock};
    use crate::DeterministicRng;

    fn app(side: SimSide) -> App {
        let mut app = App::new();
        app.insert_resource(Time::<Fixed>::default())
            .insert_resource(side)
            .insert_resource(WorldClock::default())
            .insert_resource(GameplayConstants::default())
            .insert_resource(DeterministicRng::new(42))
            .add_plugins(StaminaPlugin);
        app
    }

    /// Один полный stamina интервал
    fn step(app: &mut App) {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_millis(250));
        app.world_mut().run_schedule(FixedUpdate);
    }

    fn spawn(app: &mut App, current: f32, extra: impl Bundle) -> Entity {
        let mut record = StaminaRecord::seeded(&StaminaConfig::default());
        record.currentstamina = current;
        app.world_mut()
            .spawn((record, StaminaTimer::default(), BodyState::default(), extra))
            .id()
    }

    fn record(app: &App, entity: Entity) -> &StaminaRecord {
        app.world().get::<StaminaRecord>(entity).unwrap()
    }

    #[test]
    fn test_exhausted_fleeing_creature_stops_fleeing_same_cycle() {
        let mut app = app(SimSide::Server);
        let mut tasks = AiTaskManager::default();
        tasks.start_task(AiTaskKind::Flee);
        let deer = spawn(&mut app, 19.0, tasks);

        step(&mut app);

        let stamina = record(&app, deer);
        assert!(stamina.exhausted);
        assert!(!stamina.fleeing);
        // Бегство утомило: 19 − 0.2 × 0.25 × 30
        assert!((stamina.currentstamina - 17.5).abs() < 1e-4);

        let tasks = app.world().get::<AiTaskManager>(deer).unwrap();
        assert!(!tasks.is_active(AiTaskKind::Flee));

        let canceled = app.world().resource::<Events<FleeCanceled>>();
        assert_eq!(canceled.len(), 1);
    }

    #[test]
    fn test_flee_kept_when_allowed_while_exhausted() {
        let mut app = app(SimSide::Server);
        let mut tasks = AiTaskManager::default();
        tasks.start_task(AiTaskKind::Flee);
        let deer = spawn(&mut app, 10.0, tasks);
        app.world_mut()
            .get_mut::<StaminaRecord>(deer)
            .unwrap()
            .dont_flee_when_exhausted = false;

        step(&mut app);

        assert!(record(&app, deer).exhausted);
        assert!(record(&app, deer).fleeing);
        assert!(app.world().get::<AiTaskManager>(deer).unwrap().is_active(AiTaskKind::Flee));
    }

    #[test]
    fn test_swimming_fatigues_instead_of_regen() {
        let mut app = app(SimSide::Server);
        let swimmer = spawn(&mut app, 50.0, ());
        app.world_mut().get_mut::<BodyState>(swimmer).unwrap().swimming = true;

        step(&mut app);

        assert!((record(&app, swimmer).currentstamina - 48.5).abs() < 1e-4);
    }

    #[test]
    fn test_mounted_penalty_slows_regen() {
        let mut app = app(SimSide::Server);
        let rider = app.world_mut().spawn_empty().id();
        let mut seats = Seats::new(vec![Seat::new("front", SeatConfig::default())]);
        seats.seats[0].passenger = Some(rider);
        let elk = spawn(&mut app, 50.0, seats);
        let idle = spawn(&mut app, 50.0, ());

        step(&mut app);

        // 7.5 игровых секунд × 0.25 × (0.5 − 0.3)
        assert!((record(&app, elk).currentstamina - 50.375).abs() < 1e-4);
        assert!((record(&app, idle).currentstamina - 50.9375).abs() < 1e-4);
    }

    #[test]
    fn test_wounded_penalty() {
        let mut app = app(SimSide::Server);
        let mut health = Health::new(100.0);
        health.take_damage(40.0);
        let hurt = spawn(&mut app, 50.0, health);

        step(&mut app);

        assert!((record(&app, hurt).currentstamina - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_dead_entity_keeps_stamina() {
        let mut app = app(SimSide::Server);
        let mut health = Health::new(100.0);
        health.take_damage(100.0);
        let corpse = spawn(&mut app, 10.0, health);
        app.world_mut().get_mut::<BodyState>(corpse).unwrap().swimming = true;

        step(&mut app);

        assert_eq!(record(&app, corpse).currentstamina, 10.0);
        assert!(record(&app, corpse).exhausted);
    }

    #[test]
    fn test_external_fatigue_through_modifiers() {
        let mut app = app(SimSide::Server);
        let halved = FatigueModifiers::default().with(|fatigue: f32, _: &FatigueSource| fatigue * 0.5);
        let elk = spawn(&mut app, 100.0, halved);

        app.world_mut().send_event(FatigueEvent {
            entity: elk,
            amount: 4.0,
            source: FatigueSource::new(FatigueCause::Weather),
        });
        step(&mut app);

        // Усталость в интервале → без регена
        assert!((record(&app, elk).currentstamina - 98.0).abs() < 1e-4);

        step(&mut app);
        assert!(record(&app, elk).currentstamina > 98.0);
    }

    #[test]
    fn test_replica_side_does_not_mutate() {
        let mut app = app(SimSide::Client);
        let swimmer = spawn(&mut app, 50.0, ());
        app.world_mut().get_mut::<BodyState>(swimmer).unwrap().swimming = true;

        for _ in 0..4 {
            step(&mut app);
        }

        assert_eq!(record(&app, swimmer).currentstamina, 50.0);
    }

    #[test]
    fn test_sync_mirrors_into_replica() {
        let mut app = app(SimSide::Server);
        let elk = spawn(&mut app, 30.0, ());

        step(&mut app);

        let current = record(&app, elk).currentstamina;
        let replica = app.world().get::<StaminaReplica>(elk).unwrap();
        assert_eq!(replica.0.currentstamina, current);
        assert!(!record(&app, elk).is_dirty());
    }

    #[test]
    fn test_bounds_and_exhaustion_hold_every_cycle() {
        let mut app = app(SimSide::Server);
        let elk = spawn(&mut app, 25.0, ());

        for cycle in 0..40 {
            let swimming = cycle % 10 < 6;
            app.world_mut().get_mut::<BodyState>(elk).unwrap().swimming = swimming;
            step(&mut app);

            let stamina = record(&app, elk);
            assert!(stamina.currentstamina >= 0.0);
            assert!(stamina.currentstamina <= stamina.maxstamina);
            assert_eq!(
                stamina.exhausted,
                stamina.currentstamina / stamina.maxstamina <= stamina.exhaustionthreshold
            );
        }
    }

    #[test]
    fn test_timer_waits_for_full_interval() {
        let mut app = app(SimSide::Server);
        let swimmer = spawn(&mut app, 50.0, ());
        app.world_mut().get_mut::<BodyState>(swimmer).unwrap().swimming = true;

        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_millis(100));
        app.world_mut().run_schedule(FixedUpdate);

        assert_eq!(record(&app, swimmer).currentstamina, 50.0);
    }

    #[test]
    fn test_random_phase_in_range_and_seeded() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..16 {
            let timer = StaminaTimer::with_random_phase(&mut a);
            assert!((0.0..STAMINA_UPDATE_INTERVAL).contains(&timer.since_last_update));
            assert_eq!(timer, StaminaTimer::with_random_phase(&mut b));
        }
    }

    #[test]
    fn test_new_records_get_timer() {
        let mut app = app(SimSide::Server);
        let elk = app
            .world_mut()
            .spawn(StaminaRecord::seeded(&StaminaConfig::default()))
            .id();

        app.world_mut().run_schedule(FixedUpdate);

        assert!(app.world().get::<StaminaTimer>(elk).is_some());
    }
}
