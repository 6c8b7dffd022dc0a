//! Request store
//!
//! Keyed by request id with a secondary index per requester. All status
//! changes go through [`RequestStore::transition`].

use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use types::errors::{MarketError, Result};
use types::ids::{OfferId, RequestId, ServiceType, UserId};
use types::request::{NewRequest, Request, RequestStatus};

#[derive(Debug, Default)]
pub struct RequestStore {
    requests: HashMap<RequestId, Request>,
    by_requester: HashMap<UserId, Vec<RequestId>>,
    next_sequence: u64,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and insert a new Open request
    pub fn create(&mut self, draft: NewRequest) -> Result<Request> {
        let request = Request::open(draft, Utc::now(), self.next_sequence)?;
        self.next_sequence += 1;

        self.by_requester
            .entry(request.requester_id.clone())
            .or_default()
            .push(request.id);
        self.requests.insert(request.id, request.clone());

        Ok(request)
    }

    pub fn get(&self, id: &RequestId) -> Result<Request> {
        self.get_ref(id)
            .cloned()
            .ok_or(MarketError::RequestNotFound(*id))
    }

    pub(crate) fn get_ref(&self, id: &RequestId) -> Option<&Request> {
        self.requests.get(id)
    }

    pub(crate) fn status(&self, id: &RequestId) -> Option<RequestStatus> {
        self.requests.get(id).map(|r| r.status)
    }

    /// Open requests, newest first, optionally restricted to one service type
    pub fn list_open(&self, service_type: Option<&ServiceType>) -> Vec<Request> {
        let mut open: Vec<Request> = self
            .requests
            .values()
            .filter(|r| r.is_open())
            .filter(|r| service_type.map_or(true, |st| &r.service_type == st))
            .cloned()
            .collect();
        open.sort_by(newest_first);
        open
    }

    /// Every request posted by `requester_id`, newest first
    pub fn list_by_requester(&self, requester_id: &UserId) -> Vec<Request> {
        let mut owned: Vec<Request> = self
            .by_requester
            .get(requester_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.requests.get(id))
            .cloned()
            .collect();
        owned.sort_by(newest_first);
        owned
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.values()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Compare-and-swap on the request status
    ///
    /// Applies only when the current status is `from` and `from → to` is a
    /// lifecycle edge. `accepted_offer_id` is recorded when moving to Matched.
    /// Returns false, without touching anything, on any mismatch.
    pub(crate) fn transition(
        &mut self,
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
        accepted_offer_id: Option<OfferId>,
    ) -> bool {
        if !from.can_transition_to(to) {
            return false;
        }
        if to == RequestStatus::Matched && accepted_offer_id.is_none() {
            return false;
        }
        match self.requests.get_mut(&id) {
            Some(request) if request.status == from => {
                request.status = to;
                if to == RequestStatus::Matched {
                    request.accepted_offer_id = accepted_offer_id;
                }
                true
            }
            _ => false,
        }
    }
}

fn newest_first(a: &Request, b: &Request) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.sequence.cmp(&a.sequence))
}
