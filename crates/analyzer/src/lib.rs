//! Blinkmouse Analyzer
//!
//! Turns tracked-point displacements and eye-openness probabilities into
//! pointer moves and gesture events:
//! - **Response Curve:** Per-distance acceleration multipliers
//! - **Motion Filter:** Gain, low-pass, acceleration and jitter gating
//! - **Blink State Machine:** Timing-gated detection of blink gestures
//!
//! This crate does no I/O and never reads a clock.
//! Every call receives its timestamp from the caller.

pub mod analyzer;
pub mod blink;
pub mod history;
pub mod motion_filter;
pub mod response_curve;

pub use analyzer::Analyzer;
pub use blink::{BlinkStateMachine, GestureState};
pub use history::OpennessHistory;
pub use motion_filter::{MotionContext, MotionFilter};
pub use response_curve::ResponseTable;
