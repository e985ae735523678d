//! Per-tick processing: analyzer, stationary gate, and sink dispatch.

use blinkmouse_analyzer::Analyzer;
use blinkmouse_common::clock::TimestampMs;
use blinkmouse_common::config::{AnalyzerSettings, SessionSettings};
use blinkmouse_common::error::BlinkmouseResult;
use blinkmouse_signal_model::gesture::GestureEvent;
use blinkmouse_signal_model::sample::{DetectionSnapshot, Displacement, PointerMove};
use serde::Serialize;

use crate::sink::PointerSink;

/// Counters reported when a session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Ticks that ran the analyzer.
    pub ticks: u64,
    /// Ticks skipped for lack of a (recent) snapshot.
    pub skipped_ticks: u64,
    /// Non-zero pointer moves produced.
    pub pointer_moves: u64,
    /// Gesture events other than `None`, natural blinks included.
    pub gestures: u64,
    /// Device actions handed to the sink.
    pub actions: u64,
}

/// Why a tick did not run the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing has been published yet.
    NoDetection,
    /// The newest snapshot is older than the detection timeout.
    StaleDetection,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    Processed {
        movement: PointerMove,
        gesture: GestureEvent,
    },
}

impl TickOutcome {
    pub fn gesture(&self) -> GestureEvent {
        match self {
            Self::Processed { gesture, .. } => *gesture,
            Self::Skipped(_) => GestureEvent::None,
        }
    }
}

/// Runs the analyzer for one tick and forwards its output to the sink.
pub struct TickProcessor {
    analyzer: Analyzer,
    sink: Box<dyn PointerSink>,
    settings: SessionSettings,
    stats: SessionStats,
}

impl TickProcessor {
    pub fn new(
        analyzer: Analyzer,
        sink: Box<dyn PointerSink>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            analyzer,
            sink,
            settings,
            stats: SessionStats::default(),
        }
    }

    /// Process one tick at `now_ms`.
    ///
    /// When `fresh` is false the snapshot was already consumed by an
    /// earlier tick: its displacement is not applied again and its
    /// openness is not re-analysed.
    pub fn process(
        &mut self,
        snapshot: Option<&DetectionSnapshot>,
        fresh: bool,
        now_ms: TimestampMs,
    ) -> BlinkmouseResult<TickOutcome> {
        let Some(snapshot) = snapshot else {
            self.stats.skipped_ticks += 1;
            return Ok(TickOutcome::Skipped(SkipReason::NoDetection));
        };
        if snapshot.age_ms(now_ms) > self.settings.detection_timeout_ms {
            self.stats.skipped_ticks += 1;
            return Ok(TickOutcome::Skipped(SkipReason::StaleDetection));
        }
        self.stats.ticks += 1;

        let raw = if fresh {
            snapshot.displacement
        } else {
            Displacement::ZERO
        };
        let movement = self.analyzer.filter_motion(raw.dx, raw.dy);

        let mut gesture = GestureEvent::None;
        if fresh && movement.magnitude() < self.settings.stationary_threshold_px {
            if let Some(openness) = snapshot.openness {
                gesture = self.analyzer.analyze(openness, now_ms);
            }
        }

        if !movement.is_zero() {
            self.stats.pointer_moves += 1;
        }
        if gesture != GestureEvent::None {
            self.stats.gestures += 1;
            tracing::info!(%gesture, at_ms = now_ms, "Gesture detected");
        }

        if self.settings.capture_enabled {
            self.dispatch(movement, gesture)?;
        }

        Ok(TickOutcome::Processed { movement, gesture })
    }

    /// Hand a tick's output to the sink.
    ///
    /// The analyzer state has already advanced, so every action is attempted
    /// even after a failure and button releases are never lost. Returns the
    /// first error.
    fn dispatch(
        &mut self,
        movement: PointerMove,
        gesture: GestureEvent,
    ) -> BlinkmouseResult<()> {
        let mut failure = None;

        if !movement.is_zero() {
            if let Err(e) = self.sink.move_by(movement) {
                tracing::warn!(error = %e, sink = %self.sink.name(), "Pointer move failed");
                failure = Some(e);
            }
        }

        for action in gesture.actions() {
            match self.sink.apply(*action) {
                Ok(()) => self.stats.actions += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        %action,
                        sink = %self.sink.name(),
                        "Pointer action failed"
                    );
                    failure = failure.or(Some(e));
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Start or stop forwarding to the sink. The analyzer keeps running.
    pub fn set_capture_enabled(&mut self, enabled: bool) {
        if self.settings.capture_enabled != enabled {
            tracing::info!(enabled, sink = %self.sink.name(), "Pointer capture toggled");
        }
        self.settings.capture_enabled = enabled;
    }

    pub fn toggle_capture(&mut self) -> bool {
        self.set_capture_enabled(!self.settings.capture_enabled);
        self.settings.capture_enabled
    }

    pub fn is_capture_enabled(&self) -> bool {
        self.settings.capture_enabled
    }

    /// Apply new analyzer settings; they take effect on the next tick.
    pub fn apply_settings(&mut self, settings: &AnalyzerSettings) {
        self.analyzer.apply_settings(settings);
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}
