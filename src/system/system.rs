/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{error, info, warn};
use std::io;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{ConfigError, SystemConfig};
use crate::dispatcher::Dispatcher;
use crate::elevator::{Elevator, ElevatorWorker};
use crate::shared::{DispatchError, ElevatorStatus, ProgressEvent, Request, SystemError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/**
 * Registry of all elevators and their workers.
 *
 * Construction only builds the cars; no thread runs until `start`. Requests may be
 * submitted before that and are served once the workers are up. `stop` signals
 * every worker, waits for them and hands back every accepted request that was never
 * served. Dropping a running system stops it.
 *
 * # Fields
 * - `config`:          Layout the system was built from.
 * - `dispatcher`:      Owns the cars and assigns requests to them.
 * - `event_tx`:        Cloned into every worker. Holds at most `event_buffer` events.
 * - `event_rx`:        Handed out by `events`.
 * - `shutdown_tx`:     Dropped on `stop`, which disconnects every worker's receiver.
 * - `shutdown_rx`:     Cloned into every worker.
 * - `workers`:         Join handles, one per car while running.
 */
pub struct ElevatorSystem {
    config: SystemConfig,
    dispatcher: Dispatcher,
    event_tx: cbc::Sender<ProgressEvent>,
    event_rx: cbc::Receiver<ProgressEvent>,
    shutdown_tx: Option<cbc::Sender<()>>,
    shutdown_rx: cbc::Receiver<()>,
    workers: Vec<JoinHandle<Option<Request>>>,
    lifecycle: Lifecycle,
}

impl ElevatorSystem {
    pub fn new(config: SystemConfig) -> Result<ElevatorSystem, ConfigError> {
        config.validate()?;

        let elevators = (1..=config.n_elevators)
            .map(|id| Arc::new(Elevator::new(id, config.capacity, config.start_floor)))
            .collect();
        let dispatcher = Dispatcher::new(elevators, config.min_floor, config.max_floor);

        let (event_tx, event_rx) = cbc::bounded::<ProgressEvent>(config.event_buffer);
        let (shutdown_tx, shutdown_rx) = cbc::unbounded::<()>();

        Ok(ElevatorSystem {
            config,
            dispatcher,
            event_tx,
            event_rx,
            shutdown_tx: Some(shutdown_tx),
            shutdown_rx,
            workers: Vec::new(),
            lifecycle: Lifecycle::Created,
        })
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Spawn one worker thread per elevator.
    pub fn start(&mut self) -> Result<(), SystemError> {
        self.start_with(|name, worker| Builder::new().name(name).spawn(move || worker.run()))
    }

    /**
     * Start the workers through `spawn`. If any spawn fails, the workers already
     * running are stopped and every accepted request comes back in the error.
     */
    pub(crate) fn start_with<F>(&mut self, mut spawn: F) -> Result<(), SystemError>
    where
        F: FnMut(String, ElevatorWorker) -> io::Result<JoinHandle<Option<Request>>>,
    {
        match self.lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Running => return Err(SystemError::AlreadyRunning),
            Lifecycle::Stopped => return Err(SystemError::Stopped),
        }

        let elevators: Vec<Arc<Elevator>> = self.dispatcher.elevators().to_vec();
        for elevator in &elevators {
            let worker = ElevatorWorker::new(
                Arc::clone(elevator),
                self.config.travel_time(),
                self.event_tx.clone(),
                self.shutdown_rx.clone(),
            );

            match spawn(format!("elevator-{}", elevator.id()), worker) {
                Ok(handle) => self.workers.push(handle),
                Err(source) => {
                    error!("failed to spawn worker of elevator {}: {}", elevator.id(), source);
                    self.lifecycle = Lifecycle::Running;
                    let unserved = self.stop();
                    return Err(SystemError::Spawn { source, unserved });
                }
            }
        }

        self.lifecycle = Lifecycle::Running;
        info!(
            "started {} elevators serving floors {}..={}",
            self.workers.len(),
            self.config.min_floor,
            self.config.max_floor
        );
        Ok(())
    }

    /**
     * Stop all workers and return the requests that were accepted but not served:
     * first the rides cut short mid trip, then whatever was still queued. Calling
     * it again returns nothing.
     */
    pub fn stop(&mut self) -> Vec<Request> {
        if self.lifecycle == Lifecycle::Stopped {
            return Vec::new();
        }
        self.lifecycle = Lifecycle::Stopped;

        drop(self.shutdown_tx.take());
        for elevator in self.dispatcher.elevators() {
            if let Err(e) = elevator.queue().close() {
                error!("failed to close queue of elevator {}: {}", elevator.id(), e);
            }
        }

        let mut unserved = Vec::new();
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(Some(request)) => unserved.push(request),
                Ok(None) => {}
                Err(_) => error!("elevator worker panicked"),
            }
        }

        for elevator in self.dispatcher.elevators() {
            match elevator.queue().drain() {
                Ok(requests) => unserved.extend(requests),
                Err(e) => error!("failed to drain elevator {}: {}", elevator.id(), e),
            }
        }

        if !unserved.is_empty() {
            warn!("{} requests were not served before shutdown", unserved.len());
        }
        info!("elevator system stopped");
        unserved
    }

    pub fn request_ride(&self, source: i32, destination: i32) -> Result<usize, DispatchError> {
        self.dispatcher.request(source, destination)
    }

    pub fn query_status(&self, elevator_id: usize) -> Result<ElevatorStatus, SystemError> {
        let elevator = self
            .dispatcher
            .elevator(elevator_id)
            .ok_or(SystemError::UnknownElevator(elevator_id))?;
        Ok(elevator.status()?)
    }

    pub fn statuses(&self) -> Result<Vec<ElevatorStatus>, SystemError> {
        let mut statuses = Vec::with_capacity(self.dispatcher.elevators().len());
        for elevator in self.dispatcher.elevators() {
            statuses.push(elevator.status()?);
        }
        Ok(statuses)
    }

    /// Receiver for the progress stream, holding at most `event_buffer` unread events.
    /// Every clone competes for the same events.
    pub fn events(&self) -> cbc::Receiver<ProgressEvent> {
        self.event_rx.clone()
    }

    /// Block until no elevator has an outstanding ride, or until `timeout`.
    pub fn wait_until_idle(&self, timeout: Duration) -> Result<bool, SystemError> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            for elevator in self.dispatcher.elevators() {
                if !elevator.queue().wait_until_drained(deadline)? {
                    return Ok(false);
                }
            }

            // Cars drained earlier in the pass may have been handed new rides since
            let mut idle = true;
            for elevator in self.dispatcher.elevators() {
                if elevator.queue().outstanding()? > 0 {
                    idle = false;
                    break;
                }
            }
            if idle {
                return Ok(true);
            }
        }
    }
}

impl Drop for ElevatorSystem {
    fn drop(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.stop();
        }
    }
}
