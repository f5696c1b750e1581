//! # Error Types
//!
//! Error handling for the vecsum protocol server.
//!
//! This module defines all error variants that can occur while serving a
//! connection, from low-level I/O failures to protocol violations.
//!
//! ## Error Categories
//! - **I/O Errors**: socket and file system failures
//! - **Framing Errors**: short reads, length mismatches, malformed frames
//! - **Authentication Failures**: unknown client or proof mismatch (presented
//!   identically on the wire)
//! - **Startup Errors**: credential directory load and configuration problems
//!
//! All per-connection errors are local to their session; only startup errors
//! are fatal to the process.

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
/// Static strings are borrowed, avoiding heap allocations for common error cases.
pub mod constants {
    /// Framing errors
    pub const ERR_EMPTY_CLIENT_ID: &str = "Client identifier frame is empty";
    pub const ERR_CLIENT_ID_NOT_UTF8: &str = "Client identifier is not valid UTF-8";
    pub const ERR_SHORT_ELEMENT_READ: &str = "Vector element payload ended early";

    /// Connection errors
    pub const ERR_CONNECTION_CLOSED: &str = "Connection closed";
    pub const ERR_TIMEOUT: &str = "Operation timed out";

    /// Credential directory errors
    pub const ERR_DIRECTORY_OPEN: &str = "Failed to open credentials file";
    pub const ERR_DIRECTORY_LINE: &str = "Malformed credentials line (expected id:secret)";
}

/// Primary error type for all server operations.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Framing error: {0}")]
    Framing(String),

    #[error("Oversized frame: {0} exceeds limit of {1}")]
    OversizedFrame(usize, usize),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Credential directory error: {0}")]
    DirectoryError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ServerError {
    /// Whether this error belongs to the fatal startup taxonomy rather than
    /// a single session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigError(_) | Self::DirectoryError(_))
    }
}

/// Type alias for Results using ServerError
pub type Result<T> = std::result::Result<T, ServerError>;
