//! # Domain Layer
//!
//! Poll Session state machine, configuration and errors. No I/O.

mod config;
mod errors;
mod session;

pub use config::MonitorConfig;
pub use errors::{MonitorError, QueryError};
pub use session::{MonitorState, PollObservation, PollSession, Step};
