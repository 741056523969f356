//! Realtime broadcaster port
//!
//! Events are refresh signals only: subscribers re-query the ledgers when one
//! arrives. Publishing happens after the durable write and a failure never
//! undoes that write.

use calibration_domain::{CalibrationEvent, EventChannel};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BroadcastError {
    #[error("Broadcaster closed")]
    Closed,

    #[error("Broadcast failed: {0}")]
    Other(String),
}

/// Best-effort, at-most-once fan-out keyed by [`EventChannel`]
pub trait EventBroadcaster: Send + Sync {
    /// Publish an event on its channel, returning the number of receivers
    /// it was handed to. Zero receivers is not an error.
    fn publish(&self, event: CalibrationEvent) -> Result<usize, BroadcastError>;

    fn subscribe(&self, channel: EventChannel) -> EventSubscription;
}

/// Broadcaster for when nobody listens (batch runs, tests)
pub struct NoBroadcast;

impl EventBroadcaster for NoBroadcast {
    fn publish(&self, _event: CalibrationEvent) -> Result<usize, BroadcastError> {
        Ok(0)
    }

    fn subscribe(&self, channel: EventChannel) -> EventSubscription {
        let (_tx, rx) = broadcast::channel(1);
        EventSubscription::new(channel, rx)
    }
}

/// Receiving end of one channel.
///
/// A subscriber that falls behind skips whatever was dropped and continues
/// with the oldest event still buffered.
pub struct EventSubscription {
    channel: EventChannel,
    receiver: broadcast::Receiver<CalibrationEvent>,
}

impl EventSubscription {
    pub fn new(channel: EventChannel, receiver: broadcast::Receiver<CalibrationEvent>) -> Self {
        Self { channel, receiver }
    }

    pub fn channel(&self) -> EventChannel {
        self.channel
    }

    /// Wait for the next event. `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<CalibrationEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(channel = %self.channel, skipped, "Subscriber lagged, skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`next`](Self::next)
    pub fn try_next(&mut self) -> Option<CalibrationEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
