//! Seating: места на маунте, кто где сидит, посадка/высадка
//!
//! Seating framework внешний по отношению к locomotion: locomotion только читает
//! `Seats` (пассажир + controls на каждом месте) и получает `MountEvent`.

use bevy::prelude::*;

use crate::components::Generation;
use crate::logger;

use super::rider::{RiderAnimation, RiderView};
use super::Rideable;

/// Snapshot клавиш пассажира на месте (пишет input/сеть)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct SeatControls {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Ctrl: ступень gait вверх
    pub sprint: bool,
    pub left_mouse_down: bool,
}

impl SeatControls {
    /// Поворот тоже считается попыткой двигаться
    pub fn tries_to_move(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    pub fn turning(&self) -> bool {
        self.left || self.right
    }
}

/// Статический конфиг места
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SeatConfig {
    pub controllable: bool,
    /// Поворот места относительно маунта (градусы)
    pub mount_rotation_y: f32,
}

impl Default for SeatConfig {
    fn default() -> Self {
        Self {
            controllable: true,
            mount_rotation_y: 0.0,
        }
    }
}

/// Предыдущее состояние клавиш (edge detection, per seat)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct KeyEdges {
    pub forward: bool,
    pub backward: bool,
    pub sprint: bool,
}

#[derive(Debug, Clone, Default, Reflect)]
pub struct Seat {
    pub id: String,
    pub config: SeatConfig,
    pub passenger: Option<Entity>,
    pub controls: SeatControls,
    pub edges: KeyEdges,
}

impl Seat {
    pub fn new(id: impl Into<String>, config: SeatConfig) -> Self {
        Self {
            id: id.into(),
            config,
            ..default()
        }
    }
}

/// Места маунта (порядок = приоритет управления)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Seats {
    pub seats: Vec<Seat>,
}

impl Seats {
    pub fn new(seats: Vec<Seat>) -> Self {
        Self { seats }
    }

    pub fn any_mounted(&self) -> bool {
        self.seats.iter().any(|seat| seat.passenger.is_some())
    }

    pub fn passengers(&self) -> impl Iterator<Item = Entity> + '_ {
        self.seats.iter().filter_map(|seat| seat.passenger)
    }

    pub fn seat_of(&self, passenger: Entity) -> Option<usize> {
        self.seats.iter().position(|seat| seat.passenger == Some(passenger))
    }

    pub fn controls_mut(&mut self, seat_index: usize) -> Option<&mut SeatControls> {
        self.seats.get_mut(seat_index).map(|seat| &mut seat.controls)
    }
}

/// На ком сидит пассажир
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountedOn {
    pub mount: Entity,
    pub seat: usize,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountRequest {
    Mount {
        passenger: Entity,
        mount: Entity,
        seat: usize,
    },
    Dismount {
        passenger: Entity,
    },
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountEvent {
    Mounted {
        passenger: Entity,
        mount: Entity,
        seat: usize,
    },
    Dismounted {
        passenger: Entity,
        mount: Entity,
        seat: usize,
    },
}

/// Снять всех пассажиров (например маунт умер)
pub fn unmount_all_passengers(seats: &Seats, requests: &mut EventWriter<MountRequest>) {
    for passenger in seats.passengers() {
        requests.write(MountRequest::Dismount { passenger });
    }
}

/// Система: обработка запросов посадки/высадки
///
/// Отказ в посадке: место занято/нет такого, поколение маунта < minGeneration,
/// пассажир уже сидит. Отказ = просто log, без события.
pub fn process_mount_requests(
    mut commands: Commands,
    mut requests: EventReader<MountRequest>,
    mut mounts: Query<(&mut Seats, &Rideable, Option<&Generation>)>,
    mounted: Query<&MountedOn>,
    mut events: EventWriter<MountEvent>,
) {
    for request in requests.read() {
        match *request {
            MountRequest::Mount {
                passenger,
                mount,
                seat,
            } => {
                if mounted.contains(passenger) {
                    logger::log(&format!("{:?} already mounted, ignoring mount request", passenger));
                    continue;
                }

                let Ok((mut seats, rideable, generation)) = mounts.get_mut(mount) else {
                    continue;
                };

                let generation = generation.map(|g| g.0).unwrap_or(0);
                if generation < rideable.config.min_generation {
                    logger::log(&format!(
                        "{:?} refused rider {:?}: generation {} < {}",
                        mount, passenger, generation, rideable.config.min_generation
                    ));
                    continue;
                }

                let Some(slot) = seats.seats.get_mut(seat) else {
                    continue;
                };
                if slot.passenger.is_some() {
                    continue;
                }

                slot.passenger = Some(passenger);
                slot.controls = SeatControls::default();
                slot.edges = KeyEdges::default();

                commands.entity(passenger).insert((
                    MountedOn { mount, seat },
                    RiderAnimation::default(),
                    RiderView::default(),
                ));
                events.write(MountEvent::Mounted {
                    passenger,
                    mount,
                    seat,
                });
            }
            MountRequest::Dismount { passenger } => {
                let Ok(mounted_on) = mounted.get(passenger) else {
                    continue;
                };
                let Ok((mut seats, _, _)) = mounts.get_mut(mounted_on.mount) else {
                    continue;
                };

                if let Some(slot) = seats.seats.get_mut(mounted_on.seat) {
                    if slot.passenger == Some(passenger) {
                        slot.passenger = None;
                        slot.controls = SeatControls::default();
                    }
                }

                if let Ok(mut entity) = commands.get_entity(passenger) {
                    entity.remove::<(MountedOn, RiderAnimation, RiderView)>();
                }
                events.write(MountEvent::Dismounted {
                    passenger,
                    mount: mounted_on.mount,
                    seat: mounted_on.seat,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turning_counts_as_moving() {
        let controls = SeatControls {
            left: true,
            ..default()
        };
        assert!(controls.tries_to_move());
        assert!(controls.turning());

        let controls = SeatControls {
            jump: true,
            sprint: true,
            ..default()
        };
        assert!(!controls.tries_to_move());
    }

    #[test]
    fn test_seats_lookup() {
        let passenger = Entity::from_raw(7);
        let mut seats = Seats::new(vec![
            Seat::new("front", SeatConfig::default()),
            Seat::new("back", SeatConfig::default()),
        ]);
        assert!(!seats.any_mounted());

        seats.seats[1].passenger = Some(passenger);
        assert!(seats.any_mounted());
        assert_eq!(seats.seat_of(passenger), Some(1));
        assert_eq!(seats.passengers().collect::<Vec<_>>(), vec![passenger]);
    }
}
