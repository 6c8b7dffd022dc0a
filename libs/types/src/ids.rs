//! Unique identifier types for marketplace entities
//!
//! Request and offer IDs use UUID v7 for time-sortable ordering. User IDs
//! are opaque strings handed to us by the identity layer.

use crate::errors::MarketError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a service request
///
/// Uses UUID v7 for time-based sorting. Requests can be efficiently
/// queried in chronological order using the embedded timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new RequestId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(Uuid);

impl OfferId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a requester or provider
///
/// Supplied already validated by the identity layer; the marketplace never
/// interprets it beyond requiring it to be non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a UserId, panicking on a blank value
    ///
    /// # Panics
    /// Panics if the identifier is empty after trimming
    pub fn new(id: impl Into<String>) -> Self {
        Self::try_new(id).expect("UserId must not be blank")
    }

    /// Try to create a UserId, returning None if blank
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let s = id.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for UserId {
    type Error = MarketError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or_else(|| MarketError::validation("user id must not be blank"))
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as Deserialize>::deserialize(deserializer)?;
        UserId::try_new(raw).ok_or_else(|| serde::de::Error::custom("user id must not be blank"))
    }
}

/// Service category a request asks for and a provider offers
///
/// Normalized to trimmed lowercase so "Plumbing" and "plumbing " match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceType(String);

impl ServiceType {
    /// Create a new ServiceType
    ///
    /// # Panics
    /// Panics if the category is empty after trimming
    pub fn new(category: impl Into<String>) -> Self {
        Self::try_new(category).expect("ServiceType must not be blank")
    }

    /// Try to create a ServiceType, returning None if blank
    pub fn try_new(category: impl Into<String>) -> Option<Self> {
        let s = category.into();
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// Get the normalized category string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ServiceType {
    type Error = MarketError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or_else(|| MarketError::validation("service_type must not be blank"))
    }
}

impl<'de> Deserialize<'de> for ServiceType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as Deserialize>::deserialize(deserializer)?;
        ServiceType::try_new(raw)
            .ok_or_else(|| serde::de::Error::custom("service_type must not be blank"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_creation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "RequestIds should be unique");
    }

    #[test]
    fn test_request_id_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_offer_ids_are_time_sortable() {
        let first = OfferId::new();
        let second = OfferId::new();
        assert!(first < second);
    }

    #[test]
    fn test_user_id_trims() {
        let id = UserId::try_new("  alice ").unwrap();
        assert_eq!(id.as_str(), "alice");
        assert!(UserId::try_new("   ").is_none());
        assert!(UserId::try_new("").is_none());
    }

    #[test]
    #[should_panic(expected = "UserId must not be blank")]
    fn test_user_id_blank_panics() {
        UserId::new(" ");
    }

    #[test]
    fn test_service_type_normalizes() {
        let service = ServiceType::new(" Plumbing ");
        assert_eq!(service.as_str(), "plumbing");
        assert_eq!(service, ServiceType::try_from("PLUMBING").unwrap());
        assert!(ServiceType::try_from("  ").is_err());
        assert!(UserId::try_from("").is_err());
        assert!(ServiceType::try_new("\t").is_none());
    }

    #[test]
    fn test_service_type_serialization() {
        let service = ServiceType::new("electrical");
        let json = serde_json::to_string(&service).unwrap();
        assert_eq!(json, "\"electrical\"");
    }

    #[test]
    fn test_deserialize_applies_normalization() {
        let service: ServiceType = serde_json::from_str("\"Plumbing \"").unwrap();
        assert_eq!(service.as_str(), "plumbing");
        let user: UserId = serde_json::from_str("\" bob \"").unwrap();
        assert_eq!(user.as_str(), "bob");

        assert!(serde_json::from_str::<ServiceType>("\"  \"").is_err());
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
