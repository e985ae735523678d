//! Signal traces: per-tick producer inputs recorded as JSONL.
//!
//! A trace starts with a `# {header}` comment line followed by one
//! [`SignalRecord`] per line. Blank lines and further `#` lines are ignored,
//! so traces can be annotated by hand.

use blinkmouse_common::clock::TimestampMs;
use serde::{Deserialize, Serialize};

use crate::sample::{DetectionSnapshot, Displacement, OpennessSample};

/// Current trace schema version.
pub const TRACE_SCHEMA_VERSION: &str = "1.0";

/// Recording metadata written as the first line of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time at session start (ISO 8601).
    pub epoch_wall: String,

    /// Session clock reading when the analyzer was created. Cooldowns are
    /// measured from here, so a replay must start from the same point.
    #[serde(default)]
    pub start_ms: TimestampMs,

    /// Nominal tick period of the recording session (ms).
    pub tick_interval_ms: u64,
}

impl TraceHeader {
    pub fn new(
        epoch_wall: impl Into<String>,
        start_ms: TimestampMs,
        tick_interval_ms: u64,
    ) -> Self {
        Self {
            schema_version: TRACE_SCHEMA_VERSION.to_string(),
            epoch_wall: epoch_wall.into(),
            start_ms,
            tick_interval_ms,
        }
    }
}

/// Inputs observed on a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Milliseconds since session start.
    #[serde(rename = "t")]
    pub stamp_ms: TimestampMs,

    /// Raw tracked-point displacement.
    pub dx: f64,
    pub dy: f64,

    /// Left eye openness, when the classifier ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,

    /// Right eye openness, when the classifier ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
}

impl SignalRecord {
    /// A record carrying only a displacement.
    pub fn motion(stamp_ms: TimestampMs, dx: f64, dy: f64) -> Self {
        Self {
            stamp_ms,
            dx,
            dy,
            left: None,
            right: None,
        }
    }

    /// A stationary record carrying an openness pair.
    pub fn eyes(stamp_ms: TimestampMs, left: f64, right: f64) -> Self {
        Self {
            stamp_ms,
            dx: 0.0,
            dy: 0.0,
            left: Some(left),
            right: Some(right),
        }
    }

    pub fn displacement(&self) -> Displacement {
        Displacement::new(self.dx, self.dy)
    }

    /// Openness pair, present only when both eyes were classified.
    pub fn openness(&self) -> Option<OpennessSample> {
        match (self.left, self.right) {
            (Some(left), Some(right)) => Some(OpennessSample::new(left, right)),
            _ => None,
        }
    }

    pub fn to_snapshot(&self) -> DetectionSnapshot {
        DetectionSnapshot {
            stamp_ms: self.stamp_ms,
            displacement: self.displacement(),
            openness: self.openness(),
        }
    }

    pub fn from_snapshot(snapshot: &DetectionSnapshot) -> Self {
        Self {
            stamp_ms: snapshot.stamp_ms,
            dx: snapshot.displacement.dx,
            dy: snapshot.displacement.dy,
            left: snapshot.openness.map(|o| o.left),
            right: snapshot.openness.map(|o| o.right),
        }
    }
}

/// Failure to parse a trace line.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {source}")]
pub struct TraceParseError {
    /// One-based line number.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// A parsed trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    /// Header, if the first line carried one.
    pub header: Option<TraceHeader>,
    pub records: Vec<SignalRecord>,
}

impl Trace {
    /// Analyzer start time for replays; headerless traces start at 0.
    pub fn start_ms(&self) -> TimestampMs {
        self.header.as_ref().map_or(0, |h| h.start_ms)
    }
}

/// Parse a JSONL trace. The header is optional; records must be valid.
pub fn parse_trace(content: &str) -> Result<Trace, TraceParseError> {
    let mut trace = Trace::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if idx == 0 {
                trace.header = serde_json::from_str(comment.trim()).ok();
            }
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| TraceParseError {
            line: idx + 1,
            source,
        })?;
        trace.records.push(record);
    }

    Ok(trace)
}

/// Serialize records to JSONL (no header).
pub fn serialize_records(records: &[SignalRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
