//! Handoff of producer results to the processing loop.
//!
//! Face tracking and eye classification run outside the loop and publish
//! immutable [`DetectionSnapshot`]s into a bounded queue. Each tick drains
//! the queue: displacements published since the previous tick are summed,
//! the newest openness pair wins.

use blinkmouse_common::error::{BlinkmouseError, BlinkmouseResult};
use blinkmouse_signal_model::sample::{DetectionSnapshot, Displacement};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

/// Queue depth between producers and the loop.
pub const DETECTION_QUEUE_CAPACITY: usize = 64;

/// Create a connected publisher/receiver pair.
pub fn detection_channel() -> (DetectionPublisher, DetectionReceiver) {
    let (tx, rx) = mpsc::channel(DETECTION_QUEUE_CAPACITY);
    (
        DetectionPublisher { tx },
        DetectionReceiver {
            rx,
            last: None,
            closed: false,
        },
    )
}

/// Producer side. Cheap to clone; one per producer thread or task.
#[derive(Debug, Clone)]
pub struct DetectionPublisher {
    tx: mpsc::Sender<DetectionSnapshot>,
}

impl DetectionPublisher {
    /// Publish without blocking. Fails if the queue is full or the loop
    /// has gone away; the snapshot is dropped in both cases.
    pub fn publish(&self, snapshot: DetectionSnapshot) -> BlinkmouseResult<()> {
        self.tx.try_send(snapshot).map_err(|e| match e {
            TrySendError::Full(_) => BlinkmouseError::session("detection queue is full"),
            TrySendError::Closed(_) => BlinkmouseError::session("processing loop has stopped"),
        })
    }

    /// True once the receiving loop has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// What a tick sees of the producers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handoff {
    /// Newest known snapshot, merged over everything published since the
    /// previous tick. `None` until the first publication.
    pub snapshot: Option<DetectionSnapshot>,

    /// Whether anything was published since the previous tick.
    pub fresh: bool,
}

/// Consumer side, owned by the processing loop.
#[derive(Debug)]
pub struct DetectionReceiver {
    rx: mpsc::Receiver<DetectionSnapshot>,
    last: Option<DetectionSnapshot>,
    closed: bool,
}

impl DetectionReceiver {
    /// Drain everything published since the last call.
    pub fn take(&mut self) -> Handoff {
        let mut merged: Option<DetectionSnapshot> = None;
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => {
                    merged = Some(match merged {
                        Some(older) => merge(older, snapshot),
                        None => snapshot,
                    });
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }

        match merged {
            Some(snapshot) => {
                self.last = Some(snapshot);
                Handoff {
                    snapshot: Some(snapshot),
                    fresh: true,
                }
            }
            None => Handoff {
                snapshot: self.last,
                fresh: false,
            },
        }
    }

    /// True once every publisher has been dropped and the queue drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

fn merge(older: DetectionSnapshot, newer: DetectionSnapshot) -> DetectionSnapshot {
    DetectionSnapshot {
        stamp_ms: newer.stamp_ms,
        displacement: Displacement::new(
            older.displacement.dx + newer.displacement.dx,
            older.displacement.dy + newer.displacement.dy,
        ),
        openness: newer.openness.or(older.openness),
    }
}
