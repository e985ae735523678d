//! Blinkmouse Common Utilities
//!
//! Shared infrastructure for all Blinkmouse crates:
//! - Error types and result aliases
//! - Session clocks (monotonic and manually driven)
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
