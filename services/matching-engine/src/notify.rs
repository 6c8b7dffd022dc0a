//! Notification sink interface
//!
//! Sinks are best-effort and sit outside the consistency path: the engine
//! calls them after all locks are released and only logs their failures.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::events::{EventPayload, MarketEvent};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("No subscribers for event {0}")]
    NoSubscribers(u64),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError>;
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError> {
        (**self).notify(event)
    }
}

/// Logs every event through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError> {
        match &event.payload {
            EventPayload::RequestCreated {
                request,
                eligible_providers,
            } => info!(
                sequence = event.sequence,
                request_id = %request.id,
                service_type = %request.service_type,
                eligible = eligible_providers.as_ref().map_or(0, |e| e.provider_ids.len()),
                "Request created"
            ),
            EventPayload::OfferAccepted {
                offer,
                rejected_offers,
                ..
            } => info!(
                sequence = event.sequence,
                request_id = %offer.request_id,
                offer_id = %offer.id,
                provider_id = %offer.provider_id,
                rejected = rejected_offers.len(),
                "Offer accepted"
            ),
            EventPayload::OfferRejected { offer, .. } => info!(
                sequence = event.sequence,
                offer_id = %offer.id,
                provider_id = %offer.provider_id,
                "Offer rejected"
            ),
            EventPayload::RequestCancelled {
                request,
                rejected_offers,
                ..
            } => info!(
                sequence = event.sequence,
                request_id = %request.id,
                rejected = rejected_offers.len(),
                "Request cancelled"
            ),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn notify(&self, _event: &MarketEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Delivers to every inner sink, even when some of them fail
///
/// Reports the last failure, if any.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for FanoutSink {
    fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError> {
        let mut outcome = Ok(());
        for sink in &self.sinks {
            if let Err(err) = sink.notify(event) {
                outcome = Err(err);
            }
        }
        outcome
    }
}
