//! Live-update broadcast
//!
//! Fire-and-forget fan-out of job events to observers. Delivery is
//! best-effort: a slow or absent subscriber never blocks the writer, and a
//! lagging subscriber misses old events rather than applying backpressure.

use async_trait::async_trait;
use slipway_core::domain::event::JobEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// How many events a channel buffers before lagging subscribers miss some.
const CHANNEL_CAPACITY: usize = 256;

/// Transport trait for publishing job events
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes an event on the named channel
    ///
    /// Best-effort; no acknowledgment is expected from subscribers.
    async fn publish(&self, channel: &str, event: JobEvent) -> anyhow::Result<()>;
}

/// In-process implementation of Publisher
///
/// Backed by one tokio broadcast channel per channel name. `send` never
/// waits for receivers, which keeps appends and completions decoupled from
/// observer speed.
#[derive(Clone, Default)]
pub struct ChannelPublisher {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<JobEvent>>>>,
}

impl ChannelPublisher {
    /// Creates a new publisher with no channels yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a channel, creating it if nothing was published yet
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<JobEvent> {
        self.sender(channel).subscribe()
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<JobEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl Publisher for ChannelPublisher {
    async fn publish(&self, channel: &str, event: JobEvent) -> anyhow::Result<()> {
        // send only errors when nobody is subscribed, which is not a failure
        // for a best-effort transport.
        let _ = self.sender(channel).send(event);
        Ok(())
    }
}
