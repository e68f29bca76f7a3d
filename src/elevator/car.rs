/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::debug;
use std::sync::Mutex;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::RequestQueue;
use crate::shared::{ElevatorState, ElevatorStatus, InternalRaceError, QueueError, Request};

/**
 * One elevator car: its identity, its movement state and its request queue.
 *
 * The movement state and the queue sit behind separate locks. The car's worker is
 * the only writer of the movement state; the dispatcher reads the current floor
 * through `current_floor` and appends through `add_request`, and never touches
 * anything else.
 *
 * # Fields
 * - `id`:          Identifier, unique within one system. Lower ids win dispatch ties.
 * - `state`:       Floor, direction and worker phase.
 * - `queue`:       Requests assigned to this car, bounded by its capacity.
 */
pub struct Elevator {
    id: usize,
    state: Mutex<ElevatorState>,
    queue: RequestQueue,
}

impl Elevator {
    pub fn new(id: usize, capacity: usize, start_floor: i32) -> Elevator {
        Elevator {
            id,
            state: Mutex::new(ElevatorState::new(start_floor)),
            queue: RequestQueue::new(capacity),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn current_floor(&self) -> Result<i32, InternalRaceError> {
        Ok(self.state.lock()?.floor)
    }

    pub fn state(&self) -> Result<ElevatorState, InternalRaceError> {
        Ok(*self.state.lock()?)
    }

    pub fn status(&self) -> Result<ElevatorStatus, InternalRaceError> {
        let state = self.state()?;
        Ok(ElevatorStatus {
            id: self.id,
            floor: state.floor,
            direction: state.direction,
            behaviour: state.behaviour,
            queue_length: self.queue.len()?,
        })
    }

    pub fn add_request(&self, request: Request) -> Result<(), QueueError> {
        self.queue.add(request)?;
        debug!(
            "request {} ({} -> {}) added to elevator {}",
            request.id, request.source, request.destination, self.id
        );
        Ok(())
    }

    /// Apply `change` under the state lock and return the resulting snapshot.
    pub(crate) fn update_state<F>(&self, change: F) -> Result<ElevatorState, InternalRaceError>
    where
        F: FnOnce(&mut ElevatorState),
    {
        let mut state = self.state.lock()?;
        change(&mut state);
        Ok(*state)
    }
}
