//! Per-channel event fan-out over `tokio::sync::broadcast`.
//!
//! Each [`EventChannel`] (one per session, plus the grid channel for direct
//! placements) gets its own sender, created lazily on first use. Publishing
//! to a channel nobody listens to is a no-op.

use calibration_application::{BroadcastError, EventBroadcaster, EventSubscription};
use calibration_domain::{CalibrationEvent, EventChannel};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events buffered per channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

pub struct ChannelBroadcaster {
    channels: RwLock<HashMap<EventChannel, broadcast::Sender<CalibrationEvent>>>,
    capacity: usize,
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ChannelBroadcaster {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn sender(&self, channel: EventChannel) -> Result<broadcast::Sender<CalibrationEvent>, BroadcastError> {
        if let Some(sender) = self
            .channels
            .read()
            .map_err(|_| BroadcastError::Other("channel registry poisoned".to_string()))?
            .get(&channel)
        {
            return Ok(sender.clone());
        }

        let mut channels = self
            .channels
            .write()
            .map_err(|_| BroadcastError::Other("channel registry poisoned".to_string()))?;
        Ok(channels
            .entry(channel)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone())
    }

    /// Number of live subscribers on `channel`
    pub fn subscriber_count(&self, channel: EventChannel) -> usize {
        self.channels
            .read()
            .ok()
            .and_then(|channels| channels.get(&channel).map(|s| s.receiver_count()))
            .unwrap_or(0)
    }
}

impl EventBroadcaster for ChannelBroadcaster {
    fn publish(&self, event: CalibrationEvent) -> Result<usize, BroadcastError> {
        let channel = event.channel();
        let sender = self.sender(channel)?;
        // `send` only fails when there are no receivers
        let delivered = sender.send(event).unwrap_or(0);
        trace!(%channel, delivered, "Broadcast event");
        Ok(delivered)
    }

    fn subscribe(&self, channel: EventChannel) -> EventSubscription {
        let receiver = match self.sender(channel) {
            Ok(sender) => sender.subscribe(),
            // Registry poisoned: hand out a closed subscription
            Err(_) => broadcast::channel(1).1,
        };
        EventSubscription::new(channel, receiver)
    }
}
