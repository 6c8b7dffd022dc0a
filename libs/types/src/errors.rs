//! Error types for the marketplace
//!
//! Comprehensive error taxonomy using thiserror

use crate::ids::{OfferId, RequestId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result alias used across the marketplace crates
pub type Result<T> = std::result::Result<T, MarketError>;

/// Entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Request,
    Offer,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Request => write!(f, "request"),
            Entity::Offer => write!(f, "offer"),
        }
    }
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    Conflict,
    Validation,
}

/// Top-level marketplace error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("Offer not found: {0}")]
    OfferNotFound(OfferId),

    #[error("Provider not found: {0}")]
    ProviderNotFound(UserId),

    #[error("Invalid state: {entity} {id} is {actual}, expected {expected}")]
    InvalidState {
        entity: Entity,
        id: String,
        actual: String,
        expected: String,
    },

    /// Lost the acceptance race for a request
    #[error("Conflict: request {request_id} is no longer open")]
    Conflict { request_id: RequestId },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl MarketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketError::RequestNotFound(_)
            | MarketError::OfferNotFound(_)
            | MarketError::ProviderNotFound(_) => ErrorKind::NotFound,
            MarketError::InvalidState { .. } => ErrorKind::InvalidState,
            MarketError::Conflict { .. } => ErrorKind::Conflict,
            MarketError::Validation(_) => ErrorKind::Validation,
        }
    }

    pub fn invalid_request_state(
        id: RequestId,
        actual: impl fmt::Display,
        expected: impl fmt::Display,
    ) -> Self {
        MarketError::InvalidState {
            entity: Entity::Request,
            id: id.to_string(),
            actual: actual.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn invalid_offer_state(
        id: OfferId,
        actual: impl fmt::Display,
        expected: impl fmt::Display,
    ) -> Self {
        MarketError::InvalidState {
            entity: Entity::Offer,
            id: id.to_string(),
            actual: actual.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MarketError::Validation(message.into())
    }
}
