use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use togif_types::ProgressEvent;
use tracing::trace;

/// Receives progress events from the converter.
///
/// Emitting must never block the pipeline for long.
pub trait ProgressSink {
    fn emit(&self, event: ProgressEvent);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events over a bounded channel to a display on another thread.
///
/// When the buffer is full the event is dropped rather than stalling the
/// pipeline, so a display has to treat a closed channel as the end of the run
/// too. A disconnected receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: SyncSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(sender: SyncSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                trace!(processed = event.processed, "Progress buffer full, event dropped");
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

impl<F: Fn(ProgressEvent)> ProgressSink for F {
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Bounded progress channel; `capacity` is clamped to at least one slot
pub fn progress_channel(capacity: usize) -> (ChannelSink, Receiver<ProgressEvent>) {
    let (sender, receiver) = mpsc::sync_channel(capacity.max(1));
    (ChannelSink::new(sender), receiver)
}
