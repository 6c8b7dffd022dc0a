//! In-memory stores behind a single reader/writer lock
//!
//! A write guard on the [`Ledger`] is the transaction boundary: every
//! multi-entity update happens under one guard, so readers only ever see
//! committed cross-entity state.

pub mod offers;
pub mod requests;

pub use offers::OfferStore;
pub use requests::RequestStore;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use types::ids::RequestId;
use types::offer::OfferStatus;
use types::request::RequestStatus;

/// Both stores, always locked together
#[derive(Debug, Default)]
pub struct Tables {
    pub requests: RequestStore,
    pub offers: OfferStore,
}

impl Tables {
    /// Check the cross-entity invariants over the whole data set
    ///
    /// Returns a description of the first violation found.
    pub fn verify_invariants(&self) -> Result<(), String> {
        let mut accepted: HashMap<RequestId, usize> = HashMap::new();
        for offer in self.offers.iter() {
            if self.requests.get_ref(&offer.request_id).is_none() {
                return Err(format!("offer {} has no parent request", offer.id));
            }
            if offer.status == OfferStatus::Accepted {
                *accepted.entry(offer.request_id).or_default() += 1;
            }
        }

        for request in self.requests.iter() {
            let siblings = self.offers.list_for_request(&request.id);
            let accepted_count = accepted.get(&request.id).copied().unwrap_or(0);

            if accepted_count > 1 {
                return Err(format!(
                    "request {} has {} accepted offers",
                    request.id, accepted_count
                ));
            }

            match request.status {
                status if status.has_accepted_offer() => {
                    let Some(winner) = request.accepted_offer_id else {
                        return Err(format!("request {} is {} without an offer", request.id, status));
                    };
                    for offer in &siblings {
                        let expected = if offer.id == winner {
                            OfferStatus::Accepted
                        } else {
                            OfferStatus::Rejected
                        };
                        if offer.status != expected {
                            return Err(format!(
                                "offer {} of {} request {} is {}, expected {}",
                                offer.id, status, request.id, offer.status, expected
                            ));
                        }
                    }
                    if accepted_count != 1 {
                        return Err(format!("request {} winner is not among its offers", request.id));
                    }
                }
                RequestStatus::Open | RequestStatus::Cancelled => {
                    if request.accepted_offer_id.is_some() || accepted_count != 0 {
                        return Err(format!(
                            "{} request {} has an accepted offer",
                            request.status, request.id
                        ));
                    }
                    if request.status == RequestStatus::Cancelled
                        && siblings.iter().any(|o| o.status == OfferStatus::Pending)
                    {
                        return Err(format!("cancelled request {} has pending offers", request.id));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Lock-guarded owner of the request and offer stores
///
/// Read access is public; write access is reserved for the engine.
#[derive(Debug, Default)]
pub struct Ledger {
    tables: RwLock<Tables>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent snapshot of both stores
    pub fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write()
    }
}
