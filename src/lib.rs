/* Modules */
pub mod config;
pub mod dispatcher;
pub mod elevator;
pub mod shared;
pub mod system;

/* Public API */
pub use config::{Config, ConfigError, SystemConfig};
pub use dispatcher::Dispatcher;
pub use elevator::{Elevator, ElevatorWorker, RequestQueue};
pub use shared::{
    Behaviour, Direction, DispatchError, ElevatorStatus, EventKind, ProgressEvent, Request,
    SystemError, Unavailable,
};
pub use system::ElevatorSystem;
