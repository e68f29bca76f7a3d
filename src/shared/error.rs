/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::fmt;
use std::io;
use std::sync::PoisonError;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Request;

/***************************************/
/*            Error types              */
/***************************************/

/// A lock guarding elevator state was poisoned by a panicking thread.
/// Treated as a programming bug, never as a condition a caller can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalRaceError;

impl<T> From<PoisonError<T>> for InternalRaceError {
    fn from(_: PoisonError<T>) -> InternalRaceError {
        InternalRaceError
    }
}

/// Why a request queue refused an `add`. The request is handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    CapacityExceeded { capacity: usize, request: Request },
    Closed(Request),
    InternalRace,
}

/// Why the dispatcher could not place a request on any elevator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    NoElevators,
    CapacityExceeded { elevator_id: usize, capacity: usize },
    ShutDown { elevator_id: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    OutOfRange { floor: i32, min: i32, max: i32 },
    NoElevatorAvailable(Unavailable),
    InternalRace,
}

#[derive(Debug)]
pub enum SystemError {
    AlreadyRunning,
    Stopped,
    UnknownElevator(usize),
    /// Starting failed; every request accepted so far is handed back in `unserved`.
    Spawn {
        source: io::Error,
        unserved: Vec<Request>,
    },
    InternalRace,
}

/***************************************/
/*           Conversions               */
/***************************************/
impl From<InternalRaceError> for QueueError {
    fn from(_: InternalRaceError) -> QueueError {
        QueueError::InternalRace
    }
}

impl From<InternalRaceError> for DispatchError {
    fn from(_: InternalRaceError) -> DispatchError {
        DispatchError::InternalRace
    }
}

impl From<InternalRaceError> for SystemError {
    fn from(_: InternalRaceError) -> SystemError {
        SystemError::InternalRace
    }
}

/***************************************/
/*              Display                */
/***************************************/
impl fmt::Display for InternalRaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "elevator state lock poisoned")
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::CapacityExceeded { capacity, request } => write!(
                f,
                "queue full ({} requests), rejected request {}",
                capacity, request.id
            ),
            QueueError::Closed(request) => {
                write!(f, "queue closed, rejected request {}", request.id)
            }
            QueueError::InternalRace => fmt::Display::fmt(&InternalRaceError, f),
        }
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::NoElevators => write!(f, "no elevators configured"),
            Unavailable::CapacityExceeded {
                elevator_id,
                capacity,
            } => write!(
                f,
                "elevator {} already holds {} queued requests",
                elevator_id, capacity
            ),
            Unavailable::ShutDown { elevator_id } => {
                write!(f, "elevator {} is shut down", elevator_id)
            }
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::OutOfRange { floor, min, max } => {
                write!(f, "floor {} outside [{}, {}]", floor, min, max)
            }
            DispatchError::NoElevatorAvailable(cause) => {
                write!(f, "no elevator available: {}", cause)
            }
            DispatchError::InternalRace => fmt::Display::fmt(&InternalRaceError, f),
        }
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::AlreadyRunning => write!(f, "elevator workers already running"),
            SystemError::Stopped => write!(f, "elevator system has been stopped"),
            SystemError::UnknownElevator(id) => write!(f, "no elevator with id {}", id),
            SystemError::Spawn { source, unserved } => write!(
                f,
                "failed to spawn elevator worker: {} ({} requests not served)",
                source,
                unserved.len()
            ),
            SystemError::InternalRace => fmt::Display::fmt(&InternalRaceError, f),
        }
    }
}

impl std::error::Error for InternalRaceError {}
impl std::error::Error for QueueError {}
impl std::error::Error for Unavailable {}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::NoElevatorAvailable(cause) => Some(cause),
            _ => None,
        }
    }
}

impl std::error::Error for SystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SystemError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
