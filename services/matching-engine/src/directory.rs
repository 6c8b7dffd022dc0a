//! Provider directory
//!
//! Tracks which providers serve which category, so a new request can be
//! announced to the providers able to bid on it.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::info;
use types::errors::{MarketError, Result};
use types::ids::{ServiceType, UserId};
use types::provider::{EligibleProviders, NewProvider, Provider, ServiceSummary};

#[derive(Debug, Default)]
pub struct ProviderDirectory {
    providers: RwLock<HashMap<UserId, Provider>>,
}

impl ProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, or update and reactivate an existing one
    pub fn register(&self, draft: NewProvider) -> Result<Provider> {
        let candidate = Provider::register(draft, Utc::now())?;
        let mut providers = self.providers.write();

        let provider = match providers.get_mut(&candidate.id) {
            Some(existing) => {
                existing.name = candidate.name;
                existing.service_type = candidate.service_type;
                existing.active = true;
                existing.clone()
            }
            None => {
                providers.insert(candidate.id.clone(), candidate.clone());
                candidate
            }
        };

        info!(provider_id = %provider.id, service_type = %provider.service_type, "Provider registered");
        Ok(provider)
    }

    pub fn get(&self, id: &UserId) -> Result<Provider> {
        self.providers
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| MarketError::ProviderNotFound(id.clone()))
    }

    pub fn set_active(&self, id: &UserId, active: bool) -> Result<Provider> {
        let mut providers = self.providers.write();
        let provider = providers
            .get_mut(id)
            .ok_or_else(|| MarketError::ProviderNotFound(id.clone()))?;
        provider.active = active;
        Ok(provider.clone())
    }

    /// All providers in registration order
    pub fn list(&self) -> Vec<Provider> {
        let mut all: Vec<Provider> = self.providers.read().values().cloned().collect();
        all.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }

    /// Service catalog: every category with at least one active provider,
    /// alphabetical
    pub fn services(&self) -> Vec<ServiceSummary> {
        let mut counts: BTreeMap<ServiceType, usize> = BTreeMap::new();
        for provider in self.providers.read().values().filter(|p| p.active) {
            *counts.entry(provider.service_type.clone()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(service_type, active_providers)| ServiceSummary {
                service_type,
                active_providers,
            })
            .collect()
    }

    pub fn eligible(&self, service_type: &ServiceType) -> EligibleProviders {
        let provider_ids = self
            .list()
            .into_iter()
            .filter(|p| p.serves(service_type))
            .map(|p| p.id)
            .collect();
        EligibleProviders {
            service_type: service_type.clone(),
            provider_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::errors::ErrorKind;

    #[test]
    fn test_eligible_filters_by_service_and_active() {
        let directory = ProviderDirectory::new();
        directory.register(NewProvider::new("t1", "Ana", "plumbing")).unwrap();
        directory.register(NewProvider::new("t2", "Luis", "electrical")).unwrap();
        directory.register(NewProvider::new("t3", "Eva", "Plumbing")).unwrap();
        directory.set_active(&UserId::new("t3"), false).unwrap();

        let eligible = directory.eligible(&ServiceType::new("plumbing"));
        assert_eq!(eligible.provider_ids, vec![UserId::new("t1")]);
    }

    #[test]
    fn test_reregister_updates_and_reactivates() {
        let directory = ProviderDirectory::new();
        let first = directory.register(NewProvider::new("t1", "Ana", "plumbing")).unwrap();
        directory.set_active(&first.id, false).unwrap();

        let updated = directory.register(NewProvider::new("t1", "Ana M.", "electrical")).unwrap();

        assert!(updated.active);
        assert_eq!(updated.name, "Ana M.");
        assert_eq!(updated.registered_at, first.registered_at);
        assert_eq!(directory.list().len(), 1);
    }

    #[test]
    fn test_service_catalog_counts_active_providers() {
        let directory = ProviderDirectory::new();
        directory.register(NewProvider::new("t1", "Ana", "plumbing")).unwrap();
        directory.register(NewProvider::new("t2", "Luis", "Electrical")).unwrap();
        directory.register(NewProvider::new("t3", "Eva", "plumbing")).unwrap();
        directory.register(NewProvider::new("t4", "Raúl", "gardening")).unwrap();
        directory.set_active(&UserId::new("t4"), false).unwrap();

        let catalog: Vec<_> = directory
            .services()
            .into_iter()
            .map(|s| (s.service_type.as_str().to_string(), s.active_providers))
            .collect();
        assert_eq!(
            catalog,
            vec![("electrical".to_string(), 1), ("plumbing".to_string(), 2)]
        );
    }

    #[test]
    fn test_unknown_provider() {
        let directory = ProviderDirectory::new();
        let err = directory.set_active(&UserId::new("ghost"), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(directory.get(&UserId::new("ghost")).is_err());
    }

    #[test]
    fn test_invalid_registration() {
        let directory = ProviderDirectory::new();
        let err = directory.register(NewProvider::new("t1", "", "plumbing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(directory.list().is_empty());
    }
}
