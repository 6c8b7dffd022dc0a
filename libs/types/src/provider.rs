//! Provider directory entries

use crate::errors::{MarketError, Result};
use crate::ids::{ServiceType, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the service catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub service_type: ServiceType,
    pub active_providers: usize,
}

/// Unvalidated input for registering a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProvider {
    pub id: String,
    pub name: String,
    pub service_type: String,
}

impl NewProvider {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        service_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            service_type: service_type.into(),
        }
    }
}

/// A registered service provider and the category it serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: UserId,
    pub name: String,
    pub service_type: ServiceType,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl Provider {
    pub fn register(draft: NewProvider, registered_at: DateTime<Utc>) -> Result<Self> {
        let id = UserId::try_new(draft.id)
            .ok_or_else(|| MarketError::validation("provider id is required"))?;
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(MarketError::validation("provider name is required"));
        }
        let service_type = ServiceType::try_new(draft.service_type)
            .ok_or_else(|| MarketError::validation("service_type is required"))?;

        Ok(Self {
            id,
            name,
            service_type,
            active: true,
            registered_at,
        })
    }

    pub fn serves(&self, service_type: &ServiceType) -> bool {
        self.active && &self.service_type == service_type
    }
}

/// Providers that should hear about a new request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleProviders {
    pub service_type: ServiceType,
    pub provider_ids: Vec<UserId>,
}
