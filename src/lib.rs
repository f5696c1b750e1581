//! # vecsum
//!
//! Authenticated TCP service computing saturating sums of `i16` vector
//! batches.
//!
//! A client connects, proves knowledge of its shared secret through a salted
//! SHA-256 challenge-response, then streams a batch of fixed-width integer
//! vectors; the server answers each vector with its saturating sum before
//! reading the next one.
//!
//! ## Protocol
//! ```text
//! C -> S   [id_len: u32 LE] [client id: UTF-8]
//! S -> C   "ERR" (unknown id) | 16-char uppercase-hex salt
//! C -> S   32 raw bytes: SHA-256(salt || secret)
//! S -> C   "OK" | "ERR"
//! C -> S   [num_vectors: u32 LE] then per vector [len: u32 LE] [len x i16 LE]
//! S -> C   one [i16 LE] result per vector, streamed
//! ```
//!
//! ## Security
//! - Salt drawn from the OS CSPRNG, fresh per session, never reused
//! - Proof comparison is constant-time
//! - Unknown identifiers and wrong proofs are indistinguishable on the wire
//! - Read timeouts cover every phase, including the pre-auth exchange
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use vecsum::config::ServerConfig;
//! use vecsum::directory::ClientDirectory;
//! use vecsum::transport::tcp;
//! use vecsum::utils::TracingSink;
//!
//! #[tokio::main]
//! async fn main() -> vecsum::error::Result<()> {
//!     let config = ServerConfig::default();
//!     let directory = Arc::new(ClientDirectory::load("clients.db")?);
//!     tcp::start_server(config, directory, Arc::new(TracingSink)).await
//! }
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use config::ServerConfig;
pub use directory::ClientDirectory;
pub use error::{Result, ServerError};
pub use protocol::session::{ConnectionSession, SessionState};
