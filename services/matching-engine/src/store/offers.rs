//! Offer store
//!
//! Keyed by offer id, indexed by request and by provider.

use chrono::Utc;
use std::collections::HashMap;
use types::errors::{MarketError, Result};
use types::ids::{OfferId, RequestId, UserId};
use types::offer::{NewOffer, Offer, OfferStatus};
use types::request::RequestStatus;

use super::requests::RequestStore;

#[derive(Debug, Default)]
pub struct OfferStore {
    offers: HashMap<OfferId, Offer>,
    by_request: HashMap<RequestId, Vec<OfferId>>,
    by_provider: HashMap<UserId, Vec<OfferId>>,
    next_sequence: u64,
}

impl OfferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a Pending offer against an Open request
    ///
    /// `requests` must be borrowed from the same write guard as `self`, so
    /// the parent check and the insert form a single transaction.
    pub fn create(&mut self, requests: &RequestStore, draft: NewOffer) -> Result<Offer> {
        let parent = requests
            .get_ref(&draft.request_id)
            .ok_or(MarketError::RequestNotFound(draft.request_id))?;
        if !parent.is_open() {
            return Err(MarketError::invalid_request_state(
                parent.id,
                parent.status,
                RequestStatus::Open,
            ));
        }

        let offer = Offer::pending(draft, Utc::now(), self.next_sequence)?;
        self.next_sequence += 1;

        self.by_request
            .entry(offer.request_id)
            .or_default()
            .push(offer.id);
        self.by_provider
            .entry(offer.provider_id.clone())
            .or_default()
            .push(offer.id);
        self.offers.insert(offer.id, offer.clone());

        Ok(offer)
    }

    pub fn get(&self, id: &OfferId) -> Result<Offer> {
        self.offers
            .get(id)
            .cloned()
            .ok_or(MarketError::OfferNotFound(*id))
    }

    pub(crate) fn status(&self, id: &OfferId) -> Option<OfferStatus> {
        self.offers.get(id).map(|o| o.status)
    }

    /// Offers for a request, cheapest first; ties go to the earlier offer
    pub fn list_for_request(&self, request_id: &RequestId) -> Vec<Offer> {
        let mut offers = self.collect(self.by_request.get(request_id));
        offers.sort_by(|a, b| {
            a.price
                .cmp(&b.price)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        offers
    }

    /// Offers made by a provider, newest first
    pub fn list_for_provider(&self, provider_id: &UserId) -> Vec<Offer> {
        let mut offers = self.collect(self.by_provider.get(provider_id));
        offers.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        offers
    }

    pub(crate) fn pending_for_request(&self, request_id: &RequestId) -> Vec<OfferId> {
        self.by_request
            .get(request_id)
            .into_iter()
            .flatten()
            .filter(|id| self.status(id) == Some(OfferStatus::Pending))
            .copied()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Offer> {
        self.offers.values()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Compare-and-swap on the offer status
    ///
    /// Terminal statuses never change: any attempt returns false.
    pub(crate) fn transition(&mut self, id: OfferId, from: OfferStatus, to: OfferStatus) -> bool {
        if !from.can_transition_to(to) {
            return false;
        }
        match self.offers.get_mut(&id) {
            Some(offer) if offer.status == from => {
                offer.status = to;
                true
            }
            _ => false,
        }
    }

    fn collect(&self, ids: Option<&Vec<OfferId>>) -> Vec<Offer> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.offers.get(id))
            .cloned()
            .collect()
    }
}
