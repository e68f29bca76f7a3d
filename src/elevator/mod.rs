pub mod car;
pub mod request_queue;
pub mod worker;

mod queue_tests;

pub use car::Elevator;
pub use request_queue::RequestQueue;
pub use worker::ElevatorWorker;
