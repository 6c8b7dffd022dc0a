//! Offer lifecycle types

use crate::errors::{MarketError, Result};
use crate::ids::{OfferId, RequestId, UserId};
use crate::numeric::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offer status
///
/// Pending is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    /// Awaiting the requester's decision
    Pending,
    /// Chosen by the requester (terminal)
    Accepted,
    /// Declined, or auto-rejected when a sibling won (terminal)
    Rejected,
}

impl OfferStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }

    pub fn can_transition_to(&self, next: OfferStatus) -> bool {
        matches!(
            (self, next),
            (OfferStatus::Pending, OfferStatus::Accepted)
                | (OfferStatus::Pending, OfferStatus::Rejected)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "PENDING",
            OfferStatus::Accepted => "ACCEPTED",
            OfferStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unvalidated input for creating an offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOffer {
    pub request_id: RequestId,
    pub provider_id: String,
    pub price: Price,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewOffer {
    pub fn new(request_id: RequestId, provider_id: impl Into<String>, price: Price) -> Self {
        Self {
            request_id,
            provider_id: provider_id.into(),
            price,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A provider's bid against a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub request_id: RequestId,
    pub provider_id: UserId,
    pub price: Price,
    pub message: String,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub sequence: u64,
}

impl Offer {
    /// Validate a draft and build a Pending offer from it
    ///
    /// Does not look at the parent request; that check belongs to the store.
    pub fn pending(draft: NewOffer, created_at: DateTime<Utc>, sequence: u64) -> Result<Self> {
        let provider_id = UserId::try_new(draft.provider_id)
            .ok_or_else(|| MarketError::validation("provider_id is required"))?;

        Ok(Self {
            id: OfferId::new(),
            request_id: draft.request_id,
            provider_id,
            price: draft.price,
            message: draft.message.unwrap_or_default().trim().to_string(),
            status: OfferStatus::Pending,
            created_at,
            sequence,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == OfferStatus::Pending
    }
}
