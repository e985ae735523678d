//! Signal trace recording.
//!
//! A trace is the header line followed by the inputs of every processed
//! tick, in tick order. Replays depend on that order, so the writer refuses
//! records stamped before the session start or before the previous record.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use blinkmouse_common::clock::TimestampMs;
use blinkmouse_common::error::{BlinkmouseError, BlinkmouseResult};
use blinkmouse_signal_model::trace::{SignalRecord, TraceHeader};

/// Flush after this many records.
const FLUSH_EVERY: u64 = 500;

pub struct TraceWriter {
    out: BufWriter<File>,
    path: PathBuf,
    header: TraceHeader,
    last_stamp_ms: Option<TimestampMs>,
    records_written: u64,
}

impl TraceWriter {
    /// Create (or truncate) `path` and write the header line.
    pub fn create(path: impl Into<PathBuf>, header: TraceHeader) -> BlinkmouseResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut out = BufWriter::new(file);

        writeln!(out, "# {}", serde_json::to_string(&header)?).map_err(|e| {
            BlinkmouseError::trace(format!("{}: header not written: {e}", path.display()))
        })?;

        Ok(Self {
            out,
            path,
            header,
            last_stamp_ms: None,
            records_written: 0,
        })
    }

    /// Append the inputs of one tick.
    pub fn record(&mut self, record: &SignalRecord) -> BlinkmouseResult<()> {
        let floor = self.last_stamp_ms.unwrap_or(self.header.start_ms);
        if record.stamp_ms < floor {
            return Err(BlinkmouseError::trace(format!(
                "record at {}ms precedes {}ms",
                record.stamp_ms, floor
            )));
        }

        writeln!(self.out, "{}", serde_json::to_string(record)?)
            .map_err(|e| BlinkmouseError::trace(format!("record not written: {e}")))?;
        self.last_stamp_ms = Some(record.stamp_ms);
        self.records_written += 1;

        if self.records_written % FLUSH_EVERY == 0 {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> BlinkmouseResult<()> {
        self.out
            .flush()
            .map_err(|e| BlinkmouseError::trace(format!("flush failed: {e}")))
    }

    /// Flush and close the trace, returning the number of records.
    pub fn finish(mut self) -> BlinkmouseResult<u64> {
        self.flush()?;
        Ok(self.records_written)
    }

    pub fn header(&self) -> &TraceHeader {
        &self.header
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TraceWriter {
    fn drop(&mut self) {
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blinkmouse_signal_model::trace::parse_trace;

    fn temp_trace(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("session.jsonl")
    }

    #[test]
    fn test_written_trace_parses_back() {
        let path = temp_trace("blinkmouse_test_writer");
        let header = TraceHeader::new("2026-01-01T00:00:00Z", 500, 32);

        let mut writer = TraceWriter::create(&path, header.clone()).unwrap();
        writer.record(&SignalRecord::motion(500, 0.5, 0.5)).unwrap();
        writer.record(&SignalRecord::eyes(532, 0.1, 0.1)).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# "));

        let trace = parse_trace(&content).unwrap();
        assert_eq!(trace.header, Some(header));
        assert_eq!(trace.start_ms(), 500);
        assert_eq!(trace.records[1].left, Some(0.1));

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_out_of_order_records_are_refused() {
        let path = temp_trace("blinkmouse_test_writer_order");
        let header = TraceHeader::new("2026-01-01T00:00:00Z", 1_000, 32);
        let mut writer = TraceWriter::create(&path, header).unwrap();

        // Before the session started.
        let err = writer.record(&SignalRecord::motion(999, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, BlinkmouseError::Trace { .. }));

        writer.record(&SignalRecord::motion(1_064, 0.0, 0.0)).unwrap();
        // Same stamp is fine, going back is not.
        writer.record(&SignalRecord::motion(1_064, 0.0, 0.0)).unwrap();
        assert!(writer.record(&SignalRecord::motion(1_032, 0.0, 0.0)).is_err());
        assert_eq!(writer.records_written(), 2);

        drop(writer);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
