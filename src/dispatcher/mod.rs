pub mod dispatcher;


pub use dispatcher::select_nearest;
pub use dispatcher::Dispatcher;
