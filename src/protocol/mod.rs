//! # Protocol Core
//!
//! The per-connection protocol: salted challenge-response authentication
//! followed by the vector-batch exchange.
//!
//! ## Components
//! - **auth**: salt generation, proof derivation, constant-time verification
//! - **batch**: saturating `i16` vector summation
//! - **session**: the state machine driving one socket through both phases
//! - **wire**: frame constants and length-checked read/write helpers
//!
//! ## Wire Format
//! ```text
//! C -> S   [id_len: u32 LE] [id: UTF-8]
//! S -> C   "ERR" (unknown id)  |  salt: 16 ASCII hex bytes
//! C -> S   proof: 32 raw bytes = SHA-256(salt || secret)
//! S -> C   "OK" | "ERR"
//! C -> S   [num_vectors: u32 LE]
//! per vector:
//! C -> S   [length: u32 LE] [length x i16 LE]
//! S -> C   [sum: i16 LE]       (streamed, one per vector)
//! ```

pub mod auth;
pub mod batch;
pub mod session;
pub mod wire;
