//! V1 API handlers.

mod alarm;
mod requests;

pub use alarm::get_alarm;
pub use requests::{execute_action, process_request};
