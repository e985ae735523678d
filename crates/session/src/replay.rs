//! Offline replay of recorded signal traces.

use blinkmouse_analyzer::Analyzer;
use blinkmouse_common::clock::TimestampMs;
use blinkmouse_common::config::AppConfig;
use blinkmouse_common::error::BlinkmouseResult;
use blinkmouse_signal_model::gesture::GestureEvent;
use blinkmouse_signal_model::trace::Trace;
use serde::Serialize;

use crate::processor::{SessionStats, TickOutcome, TickProcessor};
use crate::sink::PointerSink;

/// A gesture observed during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplayEvent {
    pub at_ms: TimestampMs,
    pub gesture: GestureEvent,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Gestures in order, `None` events omitted.
    pub events: Vec<ReplayEvent>,
    pub stats: SessionStats,
}

impl ReplayReport {
    /// Gestures only, for quick comparisons.
    pub fn gestures(&self) -> Vec<GestureEvent> {
        self.events.iter().map(|e| e.gesture).collect()
    }
}

/// Replay a trace through a fresh analyzer, one tick per record.
///
/// The analyzer starts at the header's `start_ms` and every record counts
/// as freshly published at its own timestamp, so the outcome depends only on
/// the trace and the configuration.
pub fn replay(
    trace: &Trace,
    config: &AppConfig,
    sink: Box<dyn PointerSink>,
) -> BlinkmouseResult<ReplayReport> {
    let analyzer = Analyzer::new(&config.analyzer, trace.start_ms());
    let mut processor = TickProcessor::new(analyzer, sink, config.session.clone());
    let mut events = Vec::new();

    for record in &trace.records {
        let snapshot = record.to_snapshot();
        let outcome = processor.process(Some(&snapshot), true, record.stamp_ms)?;
        if let TickOutcome::Processed { gesture, .. } = outcome {
            if gesture != GestureEvent::None {
                events.push(ReplayEvent {
                    at_ms: record.stamp_ms,
                    gesture,
                });
            }
        }
    }

    tracing::debug!(
        records = trace.records.len(),
        start_ms = trace.start_ms(),
        gestures = events.len(),
        "Replay finished"
    );

    Ok(ReplayReport {
        events,
        stats: processor.stats().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use blinkmouse_signal_model::gesture::{DeviceAction, MouseButton};
    use blinkmouse_signal_model::trace::parse_trace;

    const TRACE: &str = r#"# {"schema_version":"1.0","epoch_wall":"2026-01-01T00:00:00Z","tick_interval_ms":32}
{"t":1000,"dx":0.0,"dy":0.0,"left":0.1,"right":0.1}
{"t":1100,"dx":0.0,"dy":0.0,"left":0.9,"right":0.9}

# a small nudge, then a double blink
{"t":1300,"dx":0.3,"dy":-0.2}
{"t":1400,"dx":0.0,"dy":0.0,"left":0.1,"right":0.1}
{"t":1450,"dx":0.0,"dy":0.0,"left":0.9,"right":0.9}
"#;

    #[test]
    fn test_replay_reports_gestures() {
        let trace = parse_trace(TRACE).unwrap();
        let mut config = AppConfig::default();
        config.session.capture_enabled = true;
        let sink = RecordingSink::new();

        let report = replay(&trace, &config, Box::new(sink.clone())).unwrap();
        assert_eq!(
            report.events,
            vec![
                ReplayEvent {
                    at_ms: 1_100,
                    gesture: GestureEvent::BothBlink
                },
                ReplayEvent {
                    at_ms: 1_450,
                    gesture: GestureEvent::DoubleBlink
                },
            ]
        );
        assert_eq!(
            sink.actions(),
            vec![
                DeviceAction::Click(MouseButton::Left),
                DeviceAction::Click(MouseButton::Middle)
            ]
        );
        assert_eq!(report.stats.ticks, 5);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let trace = parse_trace(TRACE).unwrap();
        let config = AppConfig::default();
        let first = replay(&trace, &config, Box::new(RecordingSink::new())).unwrap();
        let second = replay(&trace, &config, Box::new(RecordingSink::new())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_replay_starts_at_header_time() {
        // Same eyes, but the session started at 900ms: the first blink falls
        // inside the post-start interval and the second one is no longer a
        // double blink.
        let late = TRACE.replacen(
            r#""tick_interval_ms":32"#,
            r#""start_ms":900,"tick_interval_ms":32"#,
            1,
        );
        let trace = parse_trace(&late).unwrap();
        assert_eq!(trace.start_ms(), 900);

        let report = replay(
            &trace,
            &AppConfig::default(),
            Box::new(RecordingSink::new()),
        )
        .unwrap();
        assert_eq!(report.gestures(), vec![GestureEvent::BothBlink]);
        assert_eq!(report.events[0].at_ms, 1_450);
    }
}
