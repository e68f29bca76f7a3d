/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::Elevator;
use crate::shared::{DispatchError, QueueError, Request, Unavailable};

/**
 * Assigns ride requests to elevators.
 *
 * Selection is by proximity only: the car whose current floor is closest to the
 * pick-up floor wins, ties going to the lowest id. Direction and queue depth are
 * not considered. A rejected assignment is reported to the caller and never
 * retried on another car.
 *
 * # Fields
 * - `elevators`:       All cars, in ascending id order.
 * - `min_floor`:       Lowest valid floor.
 * - `max_floor`:       Highest valid floor.
 * - `next_request_id`: Sequence number for the next request.
 */
pub struct Dispatcher {
    elevators: Vec<Arc<Elevator>>,
    min_floor: i32,
    max_floor: i32,
    next_request_id: AtomicU64,
}

impl Dispatcher {
    pub fn new(elevators: Vec<Arc<Elevator>>, min_floor: i32, max_floor: i32) -> Dispatcher {
        Dispatcher {
            elevators,
            min_floor,
            max_floor,
            next_request_id: AtomicU64::new(1),
        }
    }

    pub fn elevators(&self) -> &[Arc<Elevator>] {
        &self.elevators
    }

    pub fn elevator(&self, id: usize) -> Option<&Arc<Elevator>> {
        self.elevators.iter().find(|elevator| elevator.id() == id)
    }

    /// Place a ride on the nearest elevator and return that elevator's id.
    pub fn request(&self, source: i32, destination: i32) -> Result<usize, DispatchError> {
        self.check_floor(source)?;
        self.check_floor(destination)?;

        let mut positions = Vec::with_capacity(self.elevators.len());
        for elevator in &self.elevators {
            positions.push((elevator.id(), elevator.current_floor()?));
        }

        let chosen = select_nearest(&positions, source)
            .and_then(|id| self.elevator(id))
            .ok_or(DispatchError::NoElevatorAvailable(Unavailable::NoElevators))?;

        let request = Request::new(
            self.next_request_id.fetch_add(1, Ordering::Relaxed),
            source,
            destination,
        );
        debug!("optimal elevator for request {}: {}", request.id, chosen.id());

        match chosen.add_request(request) {
            Ok(()) => {
                info!(
                    "request {} ({} -> {}) assigned to elevator {}",
                    request.id,
                    source,
                    destination,
                    chosen.id()
                );
                Ok(chosen.id())
            }
            Err(QueueError::CapacityExceeded { capacity, .. }) => {
                warn!(
                    "request {} rejected: elevator {} is full",
                    request.id,
                    chosen.id()
                );
                Err(DispatchError::NoElevatorAvailable(
                    Unavailable::CapacityExceeded {
                        elevator_id: chosen.id(),
                        capacity,
                    },
                ))
            }
            Err(QueueError::Closed(_)) => Err(DispatchError::NoElevatorAvailable(
                Unavailable::ShutDown {
                    elevator_id: chosen.id(),
                },
            )),
            Err(QueueError::InternalRace) => Err(DispatchError::InternalRace),
        }
    }

    fn check_floor(&self, floor: i32) -> Result<(), DispatchError> {
        if floor < self.min_floor || floor > self.max_floor {
            return Err(DispatchError::OutOfRange {
                floor,
                min: self.min_floor,
                max: self.max_floor,
            });
        }
        Ok(())
    }
}

/// Id of the elevator closest to `source`, lowest id on ties.
pub fn select_nearest(positions: &[(usize, i32)], source: i32) -> Option<usize> {
    positions
        .iter()
        .min_by_key(|(id, floor)| ((i64::from(*floor) - i64::from(source)).abs(), *id))
        .map(|(id, _)| *id)
}
