//! # Transport Layer
//!
//! TCP listener setup and the per-connection accept loop.

pub mod tcp;
