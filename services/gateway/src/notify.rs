//! Broadcast sink feeding the WebSocket stream

use matching_engine::{MarketEvent, NotificationSink, NotifyError};
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<MarketEvent>,
}

impl BroadcastSink {
    pub fn new(sender: broadcast::Sender<MarketEvent>) -> Self {
        Self { sender }
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError> {
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| NotifyError::NoSubscribers(event.sequence))
    }
}
