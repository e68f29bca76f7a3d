/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    /// Direction of travel from `from` towards `to`, `None` when already there.
    pub fn towards(from: i32, to: i32) -> Option<Direction> {
        if to > from {
            Some(Direction::Up)
        } else if to < from {
            Some(Direction::Down)
        } else {
            None
        }
    }

    pub fn step(&self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Idle => 0,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "toSource")]
    ToSource,
    #[serde(rename = "toDestination")]
    ToDestination,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub id: u64,
    pub source: i32,
    pub destination: i32,
}

impl Request {
    pub fn new(id: u64, source: i32, destination: i32) -> Request {
        Request {
            id,
            source,
            destination,
        }
    }
}

/**
 * Movement state of one car. Written only by the car's own worker and read by
 * everybody else through the car's state lock.
 */
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorState {
    pub floor: i32,
    pub direction: Direction,
    pub behaviour: Behaviour,
}

impl ElevatorState {
    pub fn new(floor: i32) -> ElevatorState {
        ElevatorState {
            floor,
            direction: Direction::Idle,
            behaviour: Behaviour::Idle,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ElevatorStatus {
    pub id: usize,
    pub floor: i32,
    pub direction: Direction,
    pub behaviour: Behaviour,
    #[serde(rename = "queueLength")]
    pub queue_length: usize,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Arrived,
    PickedUp,
    DroppedOff,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    #[serde(rename = "elevatorId")]
    pub elevator_id: usize,
    #[serde(rename = "requestId")]
    pub request_id: u64,
    pub floor: i32,
    pub direction: Direction,
    pub kind: EventKind,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
}

impl ProgressEvent {
    pub fn new(
        elevator_id: usize,
        request_id: u64,
        state: &ElevatorState,
        kind: EventKind,
    ) -> ProgressEvent {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        ProgressEvent {
            elevator_id,
            request_id,
            floor: state.floor,
            direction: state.direction,
            kind,
            timestamp_ms,
        }
    }
}

/***************************************/
/*             Unit tests              */
/***************************************/
