//! Service request lifecycle types

use crate::errors::{MarketError, Result};
use crate::ids::{OfferId, RequestId, ServiceType, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request status
///
/// Open → Matched → InProgress → Completed, or Open → Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Accepting offers
    Open,
    /// One offer accepted, all siblings rejected
    Matched,
    /// Work started by the external workflow
    InProgress,
    /// Work finished (terminal)
    Completed,
    /// Withdrawn by the requester (terminal)
    Cancelled,
}

impl RequestStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// Statuses in which exactly one offer must be accepted
    pub fn has_accepted_offer(&self) -> bool {
        matches!(
            self,
            RequestStatus::Matched | RequestStatus::InProgress | RequestStatus::Completed
        )
    }

    /// Check whether `self → next` is an edge of the lifecycle
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Open, Matched) | (Open, Cancelled) | (Matched, InProgress) | (InProgress, Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "OPEN",
            RequestStatus::Matched => "MATCHED",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::Completed => "COMPLETED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the service is needed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(MarketError::validation(format!(
                "latitude {} out of range [-90, 90]",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(MarketError::validation(format!(
                "longitude {} out of range [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Unvalidated input for creating a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRequest {
    pub requester_id: String,
    pub service_type: String,
    #[serde(default)]
    pub description: String,
    /// Free-text street address, shown to providers as written
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl NewRequest {
    pub fn new(
        requester_id: impl Into<String>,
        service_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            requester_id: requester_id.into(),
            service_type: service_type.into(),
            description: description.into(),
            address: None,
            location: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

/// A posted need for a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub requester_id: UserId,
    pub service_type: ServiceType,
    pub description: String,
    pub address: Option<String>,
    pub location: Option<Location>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    /// Insertion order, breaks `created_at` ties
    pub sequence: u64,
    pub accepted_offer_id: Option<OfferId>,
}

impl Request {
    /// Validate a draft and build an Open request from it
    pub fn open(draft: NewRequest, created_at: DateTime<Utc>, sequence: u64) -> Result<Self> {
        let requester_id = UserId::try_new(draft.requester_id)
            .ok_or_else(|| MarketError::validation("requester_id is required"))?;
        let service_type = ServiceType::try_new(draft.service_type)
            .ok_or_else(|| MarketError::validation("service_type is required"))?;
        // A blank address counts as none
        let address = draft
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        let location = draft
            .location
            .map(|loc| Location::new(loc.latitude, loc.longitude))
            .transpose()?;

        Ok(Self {
            id: RequestId::new(),
            requester_id,
            service_type,
            description: draft.description.trim().to_string(),
            address,
            location,
            status: RequestStatus::Open,
            created_at,
            sequence,
            accepted_offer_id: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Open
    }
}
