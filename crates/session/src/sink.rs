//! Pointer sinks: where filtered moves and gesture actions end up.
//!
//! OS-level injection lives outside this repository; it plugs in by
//! implementing [`PointerSink`]. Two sinks ship here:
//!
//! - **LogSink:** reports everything through `tracing`
//! - **RecordingSink:** keeps commands in memory for replays and tests

use std::sync::{Arc, Mutex};

use blinkmouse_common::error::{BlinkmouseError, BlinkmouseResult};
use blinkmouse_signal_model::gesture::DeviceAction;
use blinkmouse_signal_model::sample::PointerMove;
use serde::Serialize;

/// Consumer of pointer moves and device actions.
pub trait PointerSink: Send {
    /// Move the pointer by a relative amount.
    fn move_by(&mut self, movement: PointerMove) -> BlinkmouseResult<()>;

    /// Perform a button action at the current pointer position.
    fn apply(&mut self, action: DeviceAction) -> BlinkmouseResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// Sink that only logs.
#[derive(Debug, Default)]
pub struct LogSink;

impl PointerSink for LogSink {
    fn move_by(&mut self, movement: PointerMove) -> BlinkmouseResult<()> {
        tracing::trace!(dx = movement.dx, dy = movement.dy, "Pointer move");
        Ok(())
    }

    fn apply(&mut self, action: DeviceAction) -> BlinkmouseResult<()> {
        tracing::info!(%action, "Pointer action");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// A command received by a [`RecordingSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkCommand {
    Move { dx: i32, dy: i32 },
    Action { action: DeviceAction },
}

/// Sink that records every command. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    commands: Arc<Mutex<Vec<SinkCommand>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn commands(&self) -> Vec<SinkCommand> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Only the device actions, in order.
    pub fn actions(&self) -> Vec<DeviceAction> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                SinkCommand::Action { action } => Some(action),
                SinkCommand::Move { .. } => None,
            })
            .collect()
    }

    fn push(&self, command: SinkCommand) -> BlinkmouseResult<()> {
        self.commands
            .lock()
            .map_err(|_| BlinkmouseError::sink("recording sink lock poisoned"))?
            .push(command);
        Ok(())
    }
}

impl PointerSink for RecordingSink {
    fn move_by(&mut self, movement: PointerMove) -> BlinkmouseResult<()> {
        self.push(SinkCommand::Move {
            dx: movement.dx,
            dy: movement.dy,
        })
    }

    fn apply(&mut self, action: DeviceAction) -> BlinkmouseResult<()> {
        self.push(SinkCommand::Action { action })
    }

    fn name(&self) -> &str {
        "recording"
    }
}
