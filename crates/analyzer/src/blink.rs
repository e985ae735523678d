//! Blink gesture detection.
//!
//! Consumes per-eye openness samples and emits [`GestureEvent`]s using a
//! small state machine:
//!
//! - **Idle → started:** both eyes closed (silent start), or one eye held
//!   closed for two samples while the other stays open (reported at once
//!   as `LeftClosed` / `RightClosed`).
//! - **Started → Idle:** both-eyes gestures are classified when the eyes
//!   reopen (long, natural, double or plain blink); single-eye gestures end
//!   once both eyes have been open for two samples.
//!
//! All detection is suspended for a short interval after each completed
//! both-eyes gesture, single-eye gestures included.

use blinkmouse_common::clock::TimestampMs;
use blinkmouse_common::config::BlinkTimings;
use blinkmouse_signal_model::gesture::GestureEvent;
use blinkmouse_signal_model::sample::OpennessSample;
use tracing::debug;

use crate::history::OpennessHistory;
use crate::motion_filter::MotionContext;

/// Ongoing gesture, tagged with the time it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    BothEyesStarted { start_ms: TimestampMs },
    LeftEyeStarted { start_ms: TimestampMs },
    RightEyeStarted { start_ms: TimestampMs },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eye {
    Left,
    Right,
}

/// One eye's view of the current and previous sample.
#[derive(Debug, Clone, Copy)]
struct EyeReading {
    open: bool,
    open_prev: bool,
    trend: f64,
}

impl EyeReading {
    fn held_open(&self) -> bool {
        self.open && self.open_prev
    }

    fn held_closed(&self) -> bool {
        !self.open && !self.open_prev
    }
}

/// Both eyes for one analysis call.
#[derive(Debug, Clone, Copy)]
struct EyePair {
    left: EyeReading,
    right: EyeReading,
}

impl EyePair {
    fn new(current: &OpennessSample, previous: &OpennessSample) -> Self {
        let (trend_left, trend_right) = current.trend_from(previous);
        Self {
            left: EyeReading {
                open: current.is_left_open(),
                open_prev: previous.is_left_open(),
                trend: trend_left,
            },
            right: EyeReading {
                open: current.is_right_open(),
                open_prev: previous.is_right_open(),
                trend: trend_right,
            },
        }
    }

    /// `(gesturing eye, other eye)`.
    fn split(&self, eye: Eye) -> (EyeReading, EyeReading) {
        match eye {
            Eye::Left => (self.left, self.right),
            Eye::Right => (self.right, self.left),
        }
    }
}

/// Blink gesture state machine.
#[derive(Debug, Clone)]
pub struct BlinkStateMachine {
    timings: BlinkTimings,
    filter_natural_blinks: bool,
    history: OpennessHistory,
    state: GestureState,
    last_both_completed_ms: TimestampMs,
    last_single_completed_ms: TimestampMs,
}

impl BlinkStateMachine {
    /// Create a state machine at `now_ms`. Both cooldowns start at `now_ms`,
    /// so nothing is detected during the first interval of a session.
    pub fn new(timings: BlinkTimings, filter_natural_blinks: bool, now_ms: TimestampMs) -> Self {
        Self {
            timings,
            filter_natural_blinks,
            history: OpennessHistory::new(),
            state: GestureState::Idle,
            last_both_completed_ms: now_ms,
            last_single_completed_ms: now_ms,
        }
    }

    pub fn set_timings(&mut self, timings: BlinkTimings) {
        self.timings = timings;
    }

    pub fn timings(&self) -> &BlinkTimings {
        &self.timings
    }

    pub fn set_filter_natural_blinks(&mut self, enabled: bool) {
        self.filter_natural_blinks = enabled;
    }

    pub fn filter_natural_blinks(&self) -> bool {
        self.filter_natural_blinks
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn history(&self) -> &OpennessHistory {
        &self.history
    }

    pub fn last_both_completed_ms(&self) -> TimestampMs {
        self.last_both_completed_ms
    }

    pub fn last_single_completed_ms(&self) -> TimestampMs {
        self.last_single_completed_ms
    }

    /// Feed one openness sample and return the resulting event.
    ///
    /// The sample always enters the history, even when the call falls
    /// inside the post-gesture interval and returns `None`.
    pub fn analyze(
        &mut self,
        sample: OpennessSample,
        now_ms: TimestampMs,
        ctx: &mut MotionContext,
    ) -> GestureEvent {
        let previous = self.history.latest();
        self.history.push(sample);
        let eyes = EyePair::new(&sample, &previous);

        if elapsed(now_ms, self.last_both_completed_ms) <= self.timings.min_both_interval_ms {
            return GestureEvent::None;
        }

        match self.state {
            GestureState::Idle => self.check_start(&eyes, now_ms, ctx),
            GestureState::BothEyesStarted { start_ms } => {
                self.check_both_end(&eyes, start_ms, now_ms, ctx)
            }
            GestureState::LeftEyeStarted { .. } => {
                self.check_single_end(Eye::Left, &eyes, now_ms, ctx)
            }
            GestureState::RightEyeStarted { .. } => {
                self.check_single_end(Eye::Right, &eyes, now_ms, ctx)
            }
        }
    }

    fn check_start(
        &mut self,
        eyes: &EyePair,
        now_ms: TimestampMs,
        ctx: &mut MotionContext,
    ) -> GestureEvent {
        if !eyes.left.open && !eyes.right.open {
            self.state = GestureState::BothEyesStarted { start_ms: now_ms };
            ctx.motion_enabled = false;
            debug!(at_ms = now_ms, "Both eyes closed");
            return GestureEvent::None;
        }

        for eye in [Eye::Left, Eye::Right] {
            if self.single_eye_starts(eye, eyes, now_ms) {
                return self.start_single(eye, now_ms, ctx);
            }
        }

        GestureEvent::None
    }

    fn single_eye_starts(&self, eye: Eye, eyes: &EyePair, now_ms: TimestampMs) -> bool {
        let (this, other) = eyes.split(eye);
        this.held_closed()
            && other.held_open()
            && other.trend > self.timings.closing_trend
            && elapsed(now_ms, self.last_single_completed_ms) > self.timings.min_single_interval_ms
    }

    fn start_single(
        &mut self,
        eye: Eye,
        now_ms: TimestampMs,
        ctx: &mut MotionContext,
    ) -> GestureEvent {
        debug!(at_ms = now_ms, ?eye, "Single eye closed");
        match eye {
            Eye::Left => {
                self.state = GestureState::LeftEyeStarted { start_ms: now_ms };
                GestureEvent::LeftClosed
            }
            Eye::Right => {
                // Only the right eye freezes the pointer while held.
                self.state = GestureState::RightEyeStarted { start_ms: now_ms };
                ctx.motion_enabled = false;
                GestureEvent::RightClosed
            }
        }
    }

    fn check_both_end(
        &mut self,
        eyes: &EyePair,
        start_ms: TimestampMs,
        now_ms: TimestampMs,
        ctx: &mut MotionContext,
    ) -> GestureEvent {
        if !(eyes.left.open && eyes.right.open) {
            return GestureEvent::None;
        }

        let held_ms = elapsed(now_ms, start_ms);
        let since_last_ms = elapsed(now_ms, self.last_both_completed_ms);
        let event = if held_ms > self.timings.long_blink_ms {
            GestureEvent::LongBlink
        } else if self.filter_natural_blinks
            && since_last_ms > self.timings.natural_blink_ms
            && ctx.accumulated_movement < self.timings.natural_blink_movement
        {
            GestureEvent::NaturalBlink
        } else if since_last_ms < self.timings.double_blink_ms {
            GestureEvent::DoubleBlink
        } else {
            GestureEvent::BothBlink
        };

        debug!(
            %event,
            held_ms,
            since_last_ms,
            movement = ctx.accumulated_movement,
            "Both eyes reopened"
        );

        self.last_both_completed_ms = now_ms;
        ctx.reset_movement();
        ctx.motion_enabled = true;
        self.state = GestureState::Idle;
        event
    }

    fn check_single_end(
        &mut self,
        eye: Eye,
        eyes: &EyePair,
        now_ms: TimestampMs,
        ctx: &mut MotionContext,
    ) -> GestureEvent {
        let (this, other) = eyes.split(eye);
        if !(this.held_open() && other.held_open()) {
            return GestureEvent::None;
        }

        debug!(at_ms = now_ms, ?eye, "Single eye reopened");
        self.last_single_completed_ms = now_ms;
        ctx.reset_movement();
        ctx.motion_enabled = true;
        self.state = GestureState::Idle;
        match eye {
            Eye::Left => GestureEvent::LeftOpened,
            Eye::Right => GestureEvent::RightOpened,
        }
    }
}

fn elapsed(now_ms: TimestampMs, since_ms: TimestampMs) -> u64 {
    now_ms.saturating_sub(since_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: OpennessSample = OpennessSample::new(0.9, 0.9);
    const CLOSED: OpennessSample = OpennessSample::new(0.1, 0.1);
    const LEFT_WINK: OpennessSample = OpennessSample::new(0.1, 0.9);

    fn machine() -> (BlinkStateMachine, MotionContext) {
        (
            BlinkStateMachine::new(BlinkTimings::default(), true, 0),
            MotionContext::default(),
        )
    }

    #[test]
    fn test_nothing_detected_right_after_creation() {
        let (mut sm, mut ctx) = machine();
        assert_eq!(sm.analyze(CLOSED, 100, &mut ctx), GestureEvent::None);
        assert_eq!(sm.analyze(CLOSED, 210, &mut ctx), GestureEvent::None);
        assert!(sm.state().is_idle());
        // Samples are still recorded.
        assert_eq!(sm.history().len(), 3);
        assert_eq!(sm.analyze(CLOSED, 211, &mut ctx), GestureEvent::None);
        assert_eq!(sm.state(), GestureState::BothEyesStarted { start_ms: 211 });
    }

    #[test]
    fn test_both_eyes_start_is_silent_and_freezes_pointer() {
        let (mut sm, mut ctx) = machine();
        assert_eq!(sm.analyze(CLOSED, 1_000, &mut ctx), GestureEvent::None);
        assert!(!ctx.motion_enabled);
        assert_eq!(sm.analyze(OPEN, 1_100, &mut ctx), GestureEvent::BothBlink);
        assert!(ctx.motion_enabled);
        assert_eq!(sm.last_both_completed_ms(), 1_100);
    }

    #[test]
    fn test_single_eye_needs_two_closed_samples() {
        let (mut sm, mut ctx) = machine();
        assert_eq!(sm.analyze(LEFT_WINK, 1_000, &mut ctx), GestureEvent::None);
        assert_eq!(sm.analyze(LEFT_WINK, 1_030, &mut ctx), GestureEvent::LeftClosed);
        assert_eq!(sm.state(), GestureState::LeftEyeStarted { start_ms: 1_030 });
    }

    #[test]
    fn test_closing_other_eye_blocks_single_start() {
        let (mut sm, mut ctx) = machine();
        sm.analyze(OpennessSample::new(0.1, 0.95), 1_000, &mut ctx);
        // Right still open, but dropping by 0.25.
        let event = sm.analyze(OpennessSample::new(0.1, 0.7), 1_030, &mut ctx);
        assert_eq!(event, GestureEvent::None);
        assert!(sm.state().is_idle());
    }

    #[test]
    fn test_single_eye_end_requires_two_open_samples() {
        let (mut sm, mut ctx) = machine();
        sm.analyze(LEFT_WINK, 1_000, &mut ctx);
        sm.analyze(LEFT_WINK, 1_030, &mut ctx);
        assert_eq!(sm.analyze(OPEN, 1_060, &mut ctx), GestureEvent::None);
        assert_eq!(sm.analyze(OPEN, 1_090, &mut ctx), GestureEvent::LeftOpened);
        assert_eq!(sm.last_single_completed_ms(), 1_090);
        assert!(sm.state().is_idle());
    }

    #[test]
    fn test_single_eye_cooldown() {
        let (mut sm, mut ctx) = machine();
        sm.analyze(LEFT_WINK, 1_000, &mut ctx);
        sm.analyze(LEFT_WINK, 1_030, &mut ctx);
        sm.analyze(OPEN, 1_060, &mut ctx);
        assert_eq!(sm.analyze(OPEN, 1_090, &mut ctx), GestureEvent::LeftOpened);

        sm.analyze(LEFT_WINK, 1_200, &mut ctx);
        assert_eq!(sm.analyze(LEFT_WINK, 1_440, &mut ctx), GestureEvent::None);
        assert_eq!(sm.analyze(LEFT_WINK, 1_441, &mut ctx), GestureEvent::LeftClosed);
    }

    #[test]
    fn test_both_eyes_closed_takes_precedence() {
        let (mut sm, mut ctx) = machine();
        sm.analyze(LEFT_WINK, 1_000, &mut ctx);
        assert_eq!(sm.analyze(CLOSED, 1_030, &mut ctx), GestureEvent::None);
        assert_eq!(sm.state(), GestureState::BothEyesStarted { start_ms: 1_030 });
    }

    #[test]
    fn test_natural_blink_filter_can_be_disabled() {
        let (mut sm, mut ctx) = machine();
        sm.set_filter_natural_blinks(false);
        sm.analyze(CLOSED, 7_000, &mut ctx);
        assert_eq!(sm.analyze(OPEN, 7_100, &mut ctx), GestureEvent::BothBlink);
    }

    #[test]
    fn test_end_resets_accumulated_movement() {
        let (mut sm, mut ctx) = machine();
        ctx.add_movement(500.0);
        sm.analyze(CLOSED, 1_000, &mut ctx);
        sm.analyze(OPEN, 1_100, &mut ctx);
        assert_eq!(ctx.accumulated_movement, 0.0);
    }
}
