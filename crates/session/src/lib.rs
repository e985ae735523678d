//! Blinkmouse Session
//!
//! Drives an [`Analyzer`](blinkmouse_analyzer::Analyzer) on a fixed tick.
//! Producers (face tracker, eye classifier) publish detection snapshots
//! through the [`handoff`] queue; every tick the session drains it, runs the
//! analyzer, and forwards the result to a [`PointerSink`]:
//!
//! - **Staleness:** ticks are skipped when the newest snapshot is too old
//! - **Stationary gate:** blinks are only analysed while the pointer rests
//! - **Capture toggle:** the sink only receives commands while enabled
//!
//! Ticks can optionally be recorded to a JSONL trace for later [`replay`].

pub mod handoff;
pub mod processor;
pub mod replay;
pub mod sink;
pub mod writer;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blinkmouse_analyzer::Analyzer;
use blinkmouse_common::clock::{Clock, TimestampMs};
use blinkmouse_common::config::AppConfig;
use blinkmouse_common::error::BlinkmouseResult;
use blinkmouse_signal_model::trace::{SignalRecord, TraceHeader};
use tokio::time::MissedTickBehavior;

pub use handoff::{detection_channel, DetectionPublisher, DetectionReceiver, Handoff};
pub use processor::{SessionStats, SkipReason, TickOutcome, TickProcessor};
pub use replay::{replay, ReplayEvent, ReplayReport};
pub use sink::{LogSink, PointerSink, RecordingSink, SinkCommand};
pub use writer::TraceWriter;

/// A live processing session.
pub struct Session {
    processor: TickProcessor,
    receiver: DetectionReceiver,
    clock: Arc<dyn Clock>,
    trace: Option<TraceWriter>,
    start_ms: TimestampMs,
    tick_interval: Duration,
    stop_flag: Arc<AtomicBool>,
}

impl Session {
    /// Create a session. The analyzer's cooldowns start at the clock's
    /// current time.
    pub fn new(
        config: &AppConfig,
        receiver: DetectionReceiver,
        sink: Box<dyn PointerSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let start_ms = clock.now_ms();
        let analyzer = Analyzer::new(&config.analyzer, start_ms);
        Self {
            processor: TickProcessor::new(analyzer, sink, config.session.clone()),
            receiver,
            clock,
            trace: None,
            start_ms,
            tick_interval: Duration::from_millis(config.session.tick_interval_ms.max(1)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Record every processed tick to a trace file.
    pub fn with_trace(mut self, path: PathBuf, epoch_wall: &str) -> BlinkmouseResult<Self> {
        let header = TraceHeader::new(
            epoch_wall,
            self.start_ms,
            self.tick_interval.as_millis() as u64,
        );
        self.trace = Some(TraceWriter::create(path, header)?);
        Ok(self)
    }

    /// Run a single tick at the clock's current time.
    pub fn tick(&mut self) -> BlinkmouseResult<TickOutcome> {
        let now_ms = self.clock.now_ms();
        let handoff = self.receiver.take();
        let outcome = self
            .processor
            .process(handoff.snapshot.as_ref(), handoff.fresh, now_ms)?;

        if let (Some(trace), TickOutcome::Processed { .. }) = (self.trace.as_mut(), &outcome) {
            // Stamp with the tick time and drop consumed inputs, so a replay
            // sees exactly what this tick saw.
            let record = match handoff.snapshot {
                Some(snapshot) if handoff.fresh => SignalRecord {
                    stamp_ms: now_ms,
                    ..SignalRecord::from_snapshot(&snapshot)
                },
                _ => SignalRecord::motion(now_ms, 0.0, 0.0),
            };
            trace.record(&record)?;
        }

        Ok(outcome)
    }

    /// Tick until stopped or until every publisher is gone.
    pub async fn run(&mut self) -> BlinkmouseResult<SessionStats> {
        tracing::info!(
            sink = %self.processor.sink_name(),
            tick_ms = self.tick_interval.as_millis() as u64,
            capture = self.processor.is_capture_enabled(),
            "Session started"
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.stop_flag.load(Ordering::Relaxed) {
            interval.tick().await;
            if let Err(e) = self.tick() {
                tracing::warn!(error = %e, "Tick failed");
            }
            if self.receiver.is_closed() {
                tracing::debug!("All publishers dropped");
                break;
            }
        }

        if let Some(trace) = self.trace.take() {
            let path = trace.path().to_path_buf();
            let records = trace.finish()?;
            tracing::info!(path = %path.display(), records, "Trace written");
        }

        let stats = self.processor.stats().clone();
        tracing::info!(
            ticks = stats.ticks,
            skipped = stats.skipped_ticks,
            gestures = stats.gestures,
            "Session stopped"
        );
        Ok(stats)
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Clock reading the analyzer was created at.
    pub fn start_ms(&self) -> TimestampMs {
        self.start_ms
    }

    pub fn processor(&self) -> &TickProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut TickProcessor {
        &mut self.processor
    }

    pub fn stats(&self) -> &SessionStats {
        self.processor.stats()
    }
}
