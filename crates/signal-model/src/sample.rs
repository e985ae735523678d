//! Input samples and pointer output values.

use blinkmouse_common::clock::TimestampMs;
use serde::{Deserialize, Serialize};

/// Probability above which an eye counts as open.
pub const OPEN_THRESHOLD: f64 = 0.5;

/// Per-eye "open" confidence produced by the eye-state classifier.
///
/// Values are expected in `[0.0, 1.0]` but are not validated; anything
/// outside simply lands on one side of [`OPEN_THRESHOLD`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpennessSample {
    pub left: f64,
    pub right: f64,
}

impl OpennessSample {
    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Both eyes fully open. Seeds the openness history.
    pub const fn wide_open() -> Self {
        Self::new(1.0, 1.0)
    }

    pub fn is_left_open(&self) -> bool {
        self.left > OPEN_THRESHOLD
    }

    pub fn is_right_open(&self) -> bool {
        self.right > OPEN_THRESHOLD
    }

    /// Per-eye change from `previous` to `self`, as `(left, right)`.
    pub fn trend_from(&self, previous: &OpennessSample) -> (f64, f64) {
        (self.left - previous.left, self.right - previous.right)
    }
}

impl Default for OpennessSample {
    fn default() -> Self {
        Self::wide_open()
    }
}

/// Raw per-tick displacement of the tracked point, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Displacement {
    pub dx: f64,
    pub dy: f64,
}

impl Displacement {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// Filtered integer pointer displacement handed to the pointer sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerMove {
    pub dx: i32,
    pub dy: i32,
}

impl PointerMove {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn magnitude(&self) -> f64 {
        (self.dx as f64).hypot(self.dy as f64)
    }
}

/// The latest result of the upstream producers, handed to the processing
/// loop as an immutable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionSnapshot {
    /// When the producers finished computing this snapshot.
    pub stamp_ms: TimestampMs,

    /// Tracked point displacement since the previous snapshot.
    pub displacement: Displacement,

    /// Eye openness, if the classifier produced one for this snapshot.
    pub openness: Option<OpennessSample>,
}

impl DetectionSnapshot {
    pub fn new(stamp_ms: TimestampMs, displacement: Displacement) -> Self {
        Self {
            stamp_ms,
            displacement,
            openness: None,
        }
    }

    pub fn with_openness(mut self, openness: OpennessSample) -> Self {
        self.openness = Some(openness);
        self
    }

    /// Age of the snapshot at `now_ms`.
    pub fn age_ms(&self, now_ms: TimestampMs) -> u64 {
        now_ms.saturating_sub(self.stamp_ms)
    }
}
