pub mod error;
pub mod macros;
pub mod structs;

pub use error::{DispatchError, InternalRaceError, QueueError, SystemError, Unavailable};
pub use structs::Behaviour;
pub use structs::Direction;
pub use structs::ElevatorState;
pub use structs::ElevatorStatus;
pub use structs::EventKind;
pub use structs::ProgressEvent;
pub use structs::Request;
