//! Replay a recorded signal trace.

use std::path::PathBuf;

use blinkmouse_common::config::AppConfig;
use blinkmouse_session::{replay, LogSink};
use blinkmouse_signal_model::trace::parse_trace;

pub fn run(path: PathBuf, mut config: AppConfig, capture: bool, json: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read trace {}: {e}", path.display()))?;
    let trace = parse_trace(&content).map_err(|e| anyhow::anyhow!("Invalid trace: {e}"))?;

    if trace.header.is_none() {
        tracing::warn!(path = %path.display(), "Trace has no header");
    }

    config.session.capture_enabled = capture;
    let report = replay(&trace, &config, Box::new(LogSink))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Trace: {}", path.display());
    if let Some(header) = &trace.header {
        println!("  Recorded: {}", header.epoch_wall);
        println!("  Tick interval: {}ms", header.tick_interval_ms);
        println!("  Session start: {}ms", header.start_ms);
    }
    println!("  Records: {}", trace.records.len());
    println!();

    println!("Gestures:");
    if report.events.is_empty() {
        println!("  (none)");
    }
    for event in &report.events {
        let actions: Vec<String> = event
            .gesture
            .actions()
            .iter()
            .map(|a| a.to_string())
            .collect();
        if actions.is_empty() {
            println!("  {:>8}ms  {}", event.at_ms, event.gesture);
        } else {
            println!(
                "  {:>8}ms  {} -> {}",
                event.at_ms,
                event.gesture,
                actions.join(", ")
            );
        }
    }
    println!();

    let stats = &report.stats;
    println!("Stats:");
    println!("  Ticks: {} ({} skipped)", stats.ticks, stats.skipped_ticks);
    println!("  Pointer moves: {}", stats.pointer_moves);
    println!("  Gestures: {}", stats.gestures);
    println!("  Actions sent: {}", stats.actions);

    Ok(())
}
