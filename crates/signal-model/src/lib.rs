//! Blinkmouse Signal Model
//!
//! Defines the data contracts exchanged between producers, the analyzer,
//! and pointer sinks:
//! - **Samples:** Raw displacements and per-eye openness probabilities
//! - **Gestures:** The closed set of blink events and their device actions
//! - **Traces:** Per-tick input records for recording and replay
//!
//! Displacements are in image pixels; probabilities are in `[0.0, 1.0]`.

pub mod gesture;
pub mod sample;
pub mod trace;

pub use gesture::*;
pub use sample::*;
pub use trace::*;
