//! Event structures for the matching engine
//!
//! Emitted to the notification sink after a transition commits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use types::ids::UserId;
use types::offer::Offer;
use types::provider::EligibleProviders;
use types::request::Request;
use uuid::Uuid;

/// Envelope around every engine event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Unique event identifier (UUID v7)
    pub event_id: Uuid,
    /// Monotonic per engine, no gaps
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventPayload {
    /// A request was posted; `eligible_providers` is set when provider
    /// notification is enabled
    RequestCreated {
        request: Request,
        eligible_providers: Option<EligibleProviders>,
    },

    /// An offer won its request; every sibling that was still pending lost
    OfferAccepted {
        offer: Offer,
        rejected_offers: Vec<Offer>,
        actor_id: UserId,
    },

    OfferRejected {
        offer: Offer,
        actor_id: UserId,
    },

    RequestCancelled {
        request: Request,
        rejected_offers: Vec<Offer>,
        actor_id: UserId,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> &'static str {
        match self {
            EventPayload::RequestCreated { .. } => "request_created",
            EventPayload::OfferAccepted { .. } => "offer_accepted",
            EventPayload::OfferRejected { .. } => "offer_rejected",
            EventPayload::RequestCancelled { .. } => "request_cancelled",
        }
    }
}

/// Hands out event sequence numbers
#[derive(Debug)]
pub struct EventSequencer {
    current: AtomicU64,
}

impl EventSequencer {
    pub fn new(start: u64) -> Self {
        Self {
            current: AtomicU64::new(start),
        }
    }

    pub fn next(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst)
    }

    /// Wrap a payload in a fresh envelope
    pub fn envelope(&self, payload: EventPayload) -> MarketEvent {
        MarketEvent {
            event_id: Uuid::now_v7(),
            sequence: self.next(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

impl Default for EventSequencer {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::Price;
    use types::offer::NewOffer;
    use types::request::NewRequest;

    #[test]
    fn test_sequence_monotonic() {
        let sequencer = EventSequencer::new(10);
        assert_eq!(sequencer.next(), 10);
        assert_eq!(sequencer.next(), 11);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let request = Request::open(NewRequest::new("c1", "plumbing", ""), Utc::now(), 0).unwrap();
        let offer = Offer::pending(
            NewOffer::new(request.id, "t1", Price::from_u64(30)),
            Utc::now(),
            0,
        )
        .unwrap();

        let event = EventSequencer::default().envelope(EventPayload::OfferRejected {
            offer,
            actor_id: UserId::new("c1"),
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["sequence"], 1);
        assert_eq!(json["payload"]["event_type"], "offer_rejected");
        assert_eq!(json["payload"]["offer"]["price"], "30");

        let back: MarketEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
