//! Pointer motion filtering.
//!
//! Maps a raw tracked-point displacement to an integer pointer move:
//!
//! 1. **Gain:** scale by `e^(sensitivity/10)` (Y uses `sensitivity + 2`).
//! 2. **Low-pass:** blend with the previous filtered value.
//! 3. **Acceleration:** multiply by the response table entry for the
//!    displacement magnitude.
//! 4. **Jitter gate:** drop components at or below 0.7 px, round the rest.

use blinkmouse_common::config::AnalyzerSettings;
use blinkmouse_signal_model::sample::{Displacement, PointerMove};

use crate::response_curve::ResponseTable;

/// Components at or below this magnitude are treated as jitter.
pub const JITTER_THRESHOLD: f64 = 0.7;

pub const MIN_SENSITIVITY: f64 = 0.0;
pub const MAX_SENSITIVITY: f64 = 50.0;

/// Extra sensitivity applied to the vertical axis.
const Y_SENSITIVITY_BOOST: f64 = 2.0;

/// Bounds of `smoothness / 2` before it becomes the low-pass weight.
const MIN_SMOOTHING_WINDOW: f64 = 1.05;
const MAX_SMOOTHING_WINDOW: f64 = 9.0;

/// Pointer state shared between the motion filter and the blink state
/// machine.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionContext {
    /// Filtered movement magnitude since the last completed both-eyes
    /// gesture (or single-eye gesture end).
    pub accumulated_movement: f64,

    /// When false the pointer is frozen, e.g. while both eyes are closed.
    pub motion_enabled: bool,
}

impl MotionContext {
    pub fn add_movement(&mut self, magnitude: f64) {
        self.accumulated_movement += magnitude;
    }

    pub fn reset_movement(&mut self) {
        self.accumulated_movement = 0.0;
    }
}

impl Default for MotionContext {
    fn default() -> Self {
        Self {
            accumulated_movement: 0.0,
            motion_enabled: true,
        }
    }
}

/// X and Y gains for a sensitivity value, clamped to `[0, 50]`.
pub fn sensitivity_gains(sensitivity: f64) -> (f64, f64) {
    let sens = sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
    let sens_y = (sens + Y_SENSITIVITY_BOOST).min(MAX_SENSITIVITY);
    ((sens / 10.0).exp(), (sens_y / 10.0).exp())
}

/// Low-pass weight of the previous value for a smoothness setting.
pub fn smoothing_weight(smoothness: f64) -> f64 {
    (smoothness / 2.0)
        .clamp(MIN_SMOOTHING_WINDOW, MAX_SMOOTHING_WINDOW)
        .log10()
}

/// Stateful per-axis motion filter.
#[derive(Debug, Clone)]
pub struct MotionFilter {
    gain_x: f64,
    gain_y: f64,
    /// Weight of the previous filtered value in the low-pass blend.
    weight: f64,
    last: Displacement,
    reverse_x: bool,
    reverse_y: bool,
}

impl MotionFilter {
    pub fn new(settings: &AnalyzerSettings) -> Self {
        let mut filter = Self {
            gain_x: 1.0,
            gain_y: 1.0,
            weight: 0.0,
            last: Displacement::ZERO,
            reverse_x: false,
            reverse_y: false,
        };
        filter.apply_settings(settings);
        filter
    }

    /// Apply gain, smoothing and reversal settings. Low-pass state is kept.
    pub fn apply_settings(&mut self, settings: &AnalyzerSettings) {
        self.set_sensitivity(settings.sensitivity);
        self.set_smoothness(settings.smoothness);
        self.reverse_x = settings.reverse_x;
        self.reverse_y = settings.reverse_y;
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        (self.gain_x, self.gain_y) = sensitivity_gains(sensitivity);
    }

    pub fn set_smoothness(&mut self, smoothness: f64) {
        self.weight = smoothing_weight(smoothness);
    }

    pub fn set_reverse(&mut self, reverse_x: bool, reverse_y: bool) {
        self.reverse_x = reverse_x;
        self.reverse_y = reverse_y;
    }

    pub fn gains(&self) -> (f64, f64) {
        (self.gain_x, self.gain_y)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Last low-pass output (before acceleration).
    pub fn last_filtered(&self) -> Displacement {
        self.last
    }

    /// Filter one raw displacement.
    ///
    /// Always updates the low-pass state. Returns a zero move when motion is
    /// disabled in `ctx`; otherwise a non-zero move adds its accelerated
    /// magnitude to `ctx.accumulated_movement`.
    pub fn filter(
        &mut self,
        raw: Displacement,
        table: &ResponseTable,
        ctx: &mut MotionContext,
    ) -> PointerMove {
        let dx = raw.dx * self.gain_x;
        let dy = raw.dy * self.gain_y;

        let mut dx = dx * (1.0 - self.weight) + self.last.dx * self.weight;
        let mut dy = dy * (1.0 - self.weight) + self.last.dy * self.weight;
        self.last = Displacement::new(dx, dy);

        if !table.is_linear() {
            let factor = table.multiplier(dx.hypot(dy));
            dx *= factor;
            dy *= factor;
        }

        if !ctx.motion_enabled {
            return PointerMove::ZERO;
        }

        let mut output = PointerMove::new(gate_jitter(dx), gate_jitter(dy));
        if !output.is_zero() {
            if self.reverse_x {
                output.dx = -output.dx;
            }
            if self.reverse_y {
                output.dy = -output.dy;
            }
            ctx.add_movement(dx.hypot(dy));
        }
        output
    }
}

fn gate_jitter(value: f64) -> i32 {
    if value.abs() > JITTER_THRESHOLD {
        value.round() as i32
    } else {
        0
    }
}
