//! # Utility Modules
//!
//! Supporting utilities for logging and timing.
//!
//! ## Components
//! - **Logging**: the `EventSink` collaborator sessions report events to
//! - **Timeout**: async timeout wrappers used on every session read/write

pub mod logging;
pub mod timeout;

// Re-export the sink types most callers need
pub use logging::{EventSink, FileSink, Severity, TracingSink};
