//! Run a live session fed with detections on stdin.
//!
//! Each stdin line is a signal record in trace format, written by an external
//! tracker. Its `t` is replaced by the session clock reading on arrival. The
//! session ends on EOF or Ctrl-C.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use blinkmouse_common::clock::{Clock, SessionClock};
use blinkmouse_common::config::AppConfig;
use blinkmouse_session::{detection_channel, DetectionPublisher, LogSink, Session};
use blinkmouse_signal_model::sample::DetectionSnapshot;
use blinkmouse_signal_model::trace::SignalRecord;

pub async fn run(
    mut config: AppConfig,
    capture: bool,
    trace: Option<PathBuf>,
) -> anyhow::Result<()> {
    if capture {
        config.session.capture_enabled = true;
    }

    let clock = Arc::new(SessionClock::start());
    let (publisher, receiver) = detection_channel();
    let mut session = Session::new(&config, receiver, Box::new(LogSink), clock.clone());
    if let Some(path) = &trace {
        session = session
            .with_trace(path.clone(), clock.epoch_wall())
            .map_err(|e| anyhow::anyhow!("Failed to create trace: {e}"))?;
    }

    let stop = session.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping session");
            stop.store(true, Ordering::SeqCst);
        }
    });

    // A plain thread: a blocked stdin read must not hold up shutdown.
    let reader_clock = clock.clone();
    std::thread::spawn(move || read_detections(publisher, reader_clock.as_ref()));

    let stats = session.run().await?;

    println!("Session: {}", clock.epoch_wall());
    println!("  Ticks: {} ({} skipped)", stats.ticks, stats.skipped_ticks);
    println!("  Pointer moves: {}", stats.pointer_moves);
    println!("  Gestures: {}", stats.gestures);
    println!("  Actions sent: {}", stats.actions);
    if let Some(path) = trace {
        println!("  Trace: {}", path.display());
    }

    Ok(())
}

/// Publish every stdin record until EOF or until the session goes away.
fn read_detections(publisher: DetectionPublisher, clock: &dyn Clock) {
    let stdin = std::io::stdin();
    for (idx, line) in stdin.lock().lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: SignalRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "Skipping malformed detection");
                continue;
            }
        };
        let snapshot = DetectionSnapshot {
            stamp_ms: clock.now_ms(),
            ..record.to_snapshot()
        };

        if let Err(e) = publisher.publish(snapshot) {
            if publisher.is_closed() {
                break;
            }
            tracing::warn!(error = %e, "Detection dropped");
        }
    }
    tracing::debug!("Detection input closed");
}
