/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::Elevator;
use crate::shared::{
    Behaviour, Direction, ElevatorState, EventKind, InternalRaceError, ProgressEvent, Request,
};

/**
 * Drives one elevator car through its queue of rides.
 *
 * The worker blocks on the car's request queue while idle. For every request it
 * travels to the source floor, then to the destination floor, one floor per
 * `travel_time`. Each step updates the car state under its lock and publishes a
 * `ProgressEvent`. The travel delay is spent waiting on `shutdown_rx` with no lock
 * held, so the dispatcher can read the floor and enqueue new work mid trip.
 *
 * # Fields
 * - `elevator`:        The car this worker owns.
 * - `travel_time`:     Simulated time to move one floor.
 * - `event_tx`:        Progress events for an external observer, bounded.
 * - `shutdown_rx`:     Disconnects when the system stops; interrupts travel.
 */
pub struct ElevatorWorker {
    elevator: Arc<Elevator>,
    travel_time: Duration,
    event_tx: cbc::Sender<ProgressEvent>,
    shutdown_rx: cbc::Receiver<()>,
}

enum Trip {
    Completed,
    Interrupted,
}

impl ElevatorWorker {
    pub fn new(
        elevator: Arc<Elevator>,
        travel_time: Duration,
        event_tx: cbc::Sender<ProgressEvent>,
        shutdown_rx: cbc::Receiver<()>,
    ) -> ElevatorWorker {
        ElevatorWorker {
            elevator,
            travel_time,
            event_tx,
            shutdown_rx,
        }
    }

    /// Serve requests until shutdown. Returns the ride that was cut short, if any.
    pub fn run(self) -> Option<Request> {
        let id = self.elevator.id();
        info!("elevator {} starts working", id);

        loop {
            let request = match self.elevator.queue().take_next() {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(e) => {
                    error!("elevator {} stopped: {}", id, e);
                    break;
                }
            };

            match self.serve(&request) {
                Ok(Trip::Completed) => {
                    if let Err(e) = self.elevator.queue().complete() {
                        error!("elevator {} stopped: {}", id, e);
                        break;
                    }
                }
                Ok(Trip::Interrupted) => {
                    self.settle();
                    if let Err(e) = self.elevator.queue().release() {
                        error!("elevator {} failed to release request {}: {}", id, request.id, e);
                    }
                    info!("elevator {} interrupted during request {}", id, request.id);
                    return Some(request);
                }
                Err(e) => {
                    error!("elevator {} stopped during request {}: {}", id, request.id, e);
                    let _ = self.elevator.queue().release();
                    return Some(request);
                }
            }
        }

        self.settle();
        info!("elevator {} stopped", id);
        None
    }

    fn serve(&self, request: &Request) -> Result<Trip, InternalRaceError> {
        info!(
            "elevator {} started processing request {} for source {} destination {}",
            self.elevator.id(),
            request.id,
            request.source,
            request.destination
        );

        self.elevator
            .update_state(|state| state.behaviour = Behaviour::ToSource)?;
        if let Trip::Interrupted = self.travel_to(request, request.source)? {
            return Ok(Trip::Interrupted);
        }

        let state = self
            .elevator
            .update_state(|state| state.behaviour = Behaviour::ToDestination)?;
        self.publish(request, &state, EventKind::PickedUp);

        if let Trip::Interrupted = self.travel_to(request, request.destination)? {
            return Ok(Trip::Interrupted);
        }

        let state = self.elevator.state()?;
        self.publish(request, &state, EventKind::DroppedOff);

        if self.elevator.queue().is_empty()? {
            self.elevator.update_state(|state| {
                state.behaviour = Behaviour::Idle;
                state.direction = Direction::Idle;
            })?;
        }

        Ok(Trip::Completed)
    }

    fn travel_to(&self, request: &Request, target: i32) -> Result<Trip, InternalRaceError> {
        let mut floor = self.elevator.current_floor()?;
        let direction = match Direction::towards(floor, target) {
            Some(direction) => direction,
            None => return Ok(Trip::Completed),
        };

        self.elevator
            .update_state(|state| state.direction = direction)?;

        while floor != target {
            if !self.wait_travel_time() {
                return Ok(Trip::Interrupted);
            }

            let state = self.elevator.update_state(|state| {
                state.floor += direction.step();
                state.direction = direction;
            })?;
            floor = state.floor;

            debug!(
                "currently reached floor : {} for elevator {}",
                floor,
                self.elevator.id()
            );
            self.publish(request, &state, EventKind::Arrived);
        }

        Ok(Trip::Completed)
    }

    // False when the system is shutting down
    fn wait_travel_time(&self) -> bool {
        cbc::select! {
            recv(self.shutdown_rx) -> _ => false,
            default(self.travel_time) => true,
        }
    }

    // Never blocks: a full or unobserved stream loses the event
    fn publish(&self, request: &Request, state: &ElevatorState, kind: EventKind) {
        let event = ProgressEvent::new(self.elevator.id(), request.id, state, kind);
        if let Err(cbc::TrySendError::Full(event)) = self.event_tx.try_send(event) {
            debug!(
                "event buffer full, dropping {:?} of elevator {} at floor {}",
                event.kind, event.elevator_id, event.floor
            );
        }
    }

    fn settle(&self) {
        let _ = self.elevator.update_state(|state| {
            state.behaviour = Behaviour::Idle;
            state.direction = Direction::Idle;
        });
    }
}
