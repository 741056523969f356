//! Realtime event fan-out

mod broadcaster;

pub use broadcaster::{ChannelBroadcaster, DEFAULT_CHANNEL_CAPACITY};
