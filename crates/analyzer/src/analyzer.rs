//! The combined motion-and-blink analyzer.
//!
//! Owns the response table, the motion filter and the blink state machine,
//! together with the [`MotionContext`] they share: the blink state machine
//! freezes the pointer during gestures and reads the movement accumulated
//! by the filter to recognise natural blinks.

use blinkmouse_common::clock::TimestampMs;
use blinkmouse_common::config::{AnalyzerSettings, BlinkTimings};
use blinkmouse_signal_model::gesture::GestureEvent;
use blinkmouse_signal_model::sample::{Displacement, OpennessSample, PointerMove};

use crate::blink::{BlinkStateMachine, GestureState};
use crate::motion_filter::{MotionContext, MotionFilter};
use crate::response_curve::{ResponseTable, MAX_ACCELERATION_LEVEL};

/// Per-session analyzer. Not shareable between threads without external
/// synchronization; call it from one processing loop.
#[derive(Debug, Clone)]
pub struct Analyzer {
    table: ResponseTable,
    filter: MotionFilter,
    blink: BlinkStateMachine,
    ctx: MotionContext,
}

impl Analyzer {
    /// Create an analyzer for a session starting at `now_ms`.
    pub fn new(settings: &AnalyzerSettings, now_ms: TimestampMs) -> Self {
        Self {
            table: ResponseTable::for_level(settings.acceleration_level),
            filter: MotionFilter::new(settings),
            blink: BlinkStateMachine::new(
                settings.timings.clone(),
                settings.filter_natural_blinks,
                now_ms,
            ),
            ctx: MotionContext::default(),
        }
    }

    /// Create an analyzer with default settings.
    pub fn with_defaults(now_ms: TimestampMs) -> Self {
        Self::new(&AnalyzerSettings::default(), now_ms)
    }

    /// Filter a raw tracked-point displacement into a pointer move.
    pub fn filter_motion(&mut self, dx: f64, dy: f64) -> PointerMove {
        self.filter
            .filter(Displacement::new(dx, dy), &self.table, &mut self.ctx)
    }

    /// Feed an eye-openness sample. Call only while the pointer is
    /// stationary.
    pub fn analyze(&mut self, sample: OpennessSample, now_ms: TimestampMs) -> GestureEvent {
        self.blink.analyze(sample, now_ms, &mut self.ctx)
    }

    /// Apply all user settings; takes effect on the next call. Filter and
    /// gesture state are kept.
    pub fn apply_settings(&mut self, settings: &AnalyzerSettings) {
        self.set_acceleration_level(settings.acceleration_level);
        self.filter.apply_settings(settings);
        self.blink.set_filter_natural_blinks(settings.filter_natural_blinks);
        self.blink.set_timings(settings.timings.clone());
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.filter.set_sensitivity(sensitivity);
    }

    pub fn set_smoothness(&mut self, smoothness: f64) {
        self.filter.set_smoothness(smoothness);
    }

    /// Rebuild the response table; levels above 5 clamp to 5.
    pub fn set_acceleration_level(&mut self, level: u8) {
        if level.min(MAX_ACCELERATION_LEVEL) != self.table.level() {
            self.table = ResponseTable::for_level(level);
            tracing::debug!(level = self.table.level(), "Response table rebuilt");
        }
    }

    pub fn set_natural_blink_filter(&mut self, enabled: bool) {
        self.blink.set_filter_natural_blinks(enabled);
    }

    pub fn set_reverse(&mut self, reverse_x: bool, reverse_y: bool) {
        self.filter.set_reverse(reverse_x, reverse_y);
    }

    pub fn set_timings(&mut self, timings: BlinkTimings) {
        self.blink.set_timings(timings);
    }

    pub fn response_table(&self) -> &ResponseTable {
        &self.table
    }

    pub fn motion_filter(&self) -> &MotionFilter {
        &self.filter
    }

    pub fn blink_state_machine(&self) -> &BlinkStateMachine {
        &self.blink
    }

    pub fn gesture_state(&self) -> GestureState {
        self.blink.state()
    }

    pub fn accumulated_movement(&self) -> f64 {
        self.ctx.accumulated_movement
    }

    pub fn is_motion_enabled(&self) -> bool {
        self.ctx.motion_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_move() {
        let mut analyzer = Analyzer::with_defaults(0);
        assert_eq!(analyzer.filter_motion(0.5, 0.5), PointerMove::new(2, 2));
        assert!(analyzer.accumulated_movement() > 2.8);
    }

    #[test]
    fn test_pointer_frozen_during_both_eyes_gesture() {
        let mut analyzer = Analyzer::with_defaults(0);
        analyzer.analyze(OpennessSample::new(0.0, 0.0), 1_000);
        assert!(!analyzer.is_motion_enabled());
        assert_eq!(analyzer.filter_motion(100.0, 100.0), PointerMove::ZERO);

        analyzer.analyze(OpennessSample::new(1.0, 1.0), 1_100);
        assert!(analyzer.is_motion_enabled());
        assert_ne!(analyzer.filter_motion(100.0, 100.0), PointerMove::ZERO);
    }

    #[test]
    fn test_apply_settings_rebuilds_table() {
        let mut analyzer = Analyzer::with_defaults(0);
        let settings = AnalyzerSettings {
            acceleration_level: 9,
            reverse_y: true,
            ..Default::default()
        };
        analyzer.apply_settings(&settings);
        assert_eq!(analyzer.response_table().level(), 5);
        assert_eq!(analyzer.filter_motion(0.5, 0.5), PointerMove::new(2, -2));
    }

    #[test]
    fn test_level_change_keeps_low_pass_state() {
        let mut analyzer = Analyzer::with_defaults(0);
        analyzer.filter_motion(0.5, 0.5);
        let before = analyzer.motion_filter().last_filtered();
        analyzer.set_acceleration_level(0);
        assert_eq!(analyzer.motion_filter().last_filtered(), before);
        assert!(analyzer.response_table().is_linear());
    }
}
