//! Matching engine core
//!
//! Owns the request/offer state machines. Every status change happens here,
//! under the request's lock and inside a single ledger write guard, so the
//! accept + reject-siblings + advance-request sequence is never observed
//! half-applied.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use types::errors::{MarketError, Result};
use types::ids::{OfferId, RequestId, ServiceType, UserId};
use types::offer::{NewOffer, Offer, OfferStatus};
use types::request::{NewRequest, Request, RequestStatus};

use crate::directory::ProviderDirectory;
use crate::events::{EventPayload, EventSequencer, MarketEvent};
use crate::guard::{RequestGuard, RequestLocks};
use crate::notify::{NotificationSink, NotifyError};
use crate::store::{Ledger, OfferStore, Tables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Attach the eligible providers to `RequestCreated` events
    pub notify_eligible_providers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            notify_eligible_providers: true,
        }
    }
}

/// Outcome of a successful `accept_offer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acceptance {
    pub request: Request,
    pub accepted: Offer,
    /// Siblings this acceptance moved from Pending to Rejected
    pub rejected: Vec<Offer>,
}

/// Main matching engine
pub struct MatchingEngine {
    config: EngineConfig,
    ledger: Ledger,
    locks: RequestLocks,
    directory: ProviderDirectory,
    sink: Arc<dyn NotificationSink>,
    sequencer: EventSequencer,
}

impl MatchingEngine {
    pub fn new(config: EngineConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            ledger: Ledger::new(),
            locks: RequestLocks::new(),
            directory: ProviderDirectory::new(),
            sink,
            sequencer: EventSequencer::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only access to the stores
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn directory(&self) -> &ProviderDirectory {
        &self.directory
    }

    #[instrument(skip(self, draft), fields(requester_id = %draft.requester_id, service_type = %draft.service_type))]
    pub fn create_request(&self, draft: NewRequest) -> Result<Request> {
        // Resolved before the write guard; the directory has its own lock
        let eligible_providers = if self.config.notify_eligible_providers {
            ServiceType::try_new(draft.service_type.as_str()).map(|st| self.directory.eligible(&st))
        } else {
            None
        };

        let (request, event) = {
            let mut tables = self.ledger.write();
            let request = tables.requests.create(draft)?;
            let event = self.sequencer.envelope(EventPayload::RequestCreated {
                request: request.clone(),
                eligible_providers,
            });
            (request, event)
        };

        info!(request_id = %request.id, "Request opened");
        self.dispatch(event);

        Ok(request)
    }

    pub fn get_request(&self, id: RequestId) -> Result<Request> {
        self.ledger.read().requests.get(&id)
    }

    pub fn list_open_requests(&self, service_type: Option<&ServiceType>) -> Vec<Request> {
        self.ledger.read().requests.list_open(service_type)
    }

    pub fn list_requests_by_requester(&self, requester_id: &UserId) -> Vec<Request> {
        self.ledger.read().requests.list_by_requester(requester_id)
    }

    #[instrument(skip(self, draft), fields(request_id = %draft.request_id, provider_id = %draft.provider_id))]
    pub fn create_offer(&self, draft: NewOffer) -> Result<Offer> {
        let _guard = self.lock_existing(draft.request_id)?;
        let mut tables = self.ledger.write();
        let Tables { requests, offers } = &mut *tables;
        let offer = offers.create(requests, draft)?;

        info!(offer_id = %offer.id, price = %offer.price, "Offer placed");
        Ok(offer)
    }

    pub fn get_offer(&self, id: OfferId) -> Result<Offer> {
        self.ledger.read().offers.get(&id)
    }

    /// Offers for a request, cheapest first
    pub fn list_offers_for_request(&self, request_id: RequestId) -> Result<Vec<Offer>> {
        let tables = self.ledger.read();
        tables.requests.get(&request_id)?;
        Ok(tables.offers.list_for_request(&request_id))
    }

    pub fn list_offers_for_provider(&self, provider_id: &UserId) -> Vec<Offer> {
        self.ledger.read().offers.list_for_provider(provider_id)
    }

    /// Accept one offer, rejecting every pending sibling and matching the request
    ///
    /// The request's Open → Matched compare-and-swap is the linearization
    /// point: of all concurrent callers on one request, exactly one wins and
    /// the rest get `Conflict` with nothing changed.
    #[instrument(skip(self), fields(actor_id = %actor_id))]
    pub fn accept_offer(&self, offer_id: OfferId, actor_id: &UserId) -> Result<Acceptance> {
        let request_id = self.check_acceptable(offer_id)?;

        let (acceptance, event) = {
            let _guard = self.locks.lock(request_id);
            self.commit_acceptance(offer_id, request_id, actor_id)?
        };

        info!(
            request_id = %request_id,
            provider_id = %acceptance.accepted.provider_id,
            rejected = acceptance.rejected.len(),
            "Offer accepted, request matched"
        );
        self.dispatch(event);

        Ok(acceptance)
    }

    /// Reject a single pending offer; the request stays as it is
    #[instrument(skip(self), fields(actor_id = %actor_id))]
    pub fn reject_offer(&self, offer_id: OfferId, actor_id: &UserId) -> Result<Offer> {
        let request_id = self.ledger.read().offers.get(&offer_id)?.request_id;

        let (offer, event) = {
            let _guard = self.locks.lock(request_id);
            let mut tables = self.ledger.write();
            if !tables
                .offers
                .transition(offer_id, OfferStatus::Pending, OfferStatus::Rejected)
            {
                let current = tables.offers.get(&offer_id)?;
                return Err(MarketError::invalid_offer_state(
                    offer_id,
                    current.status,
                    OfferStatus::Pending,
                ));
            }
            let offer = tables.offers.get(&offer_id)?;
            let event = self.sequencer.envelope(EventPayload::OfferRejected {
                offer: offer.clone(),
                actor_id: actor_id.clone(),
            });
            (offer, event)
        };

        info!(request_id = %request_id, "Offer rejected");
        self.dispatch(event);

        Ok(offer)
    }

    /// Withdraw an Open request, rejecting all of its pending offers
    ///
    /// Matched and later requests cannot be cancelled.
    #[instrument(skip(self), fields(actor_id = %actor_id))]
    pub fn cancel_request(&self, request_id: RequestId, actor_id: &UserId) -> Result<Request> {
        let (request, event) = {
            let _guard = self.lock_existing(request_id)?;
            let mut tables = self.ledger.write();
            let Tables { requests, offers } = &mut *tables;

            let current = requests.get(&request_id)?;
            if !requests.transition(request_id, RequestStatus::Open, RequestStatus::Cancelled, None) {
                return Err(MarketError::invalid_request_state(
                    request_id,
                    current.status,
                    RequestStatus::Open,
                ));
            }
            let rejected_offers = reject_pending(offers, &request_id)?;
            let request = requests.get(&request_id)?;
            info!(rejected = rejected_offers.len(), "Request cancelled");

            let event = self.sequencer.envelope(EventPayload::RequestCancelled {
                request: request.clone(),
                rejected_offers,
                actor_id: actor_id.clone(),
            });
            (request, event)
        };

        self.dispatch(event);

        Ok(request)
    }

    /// External workflow: the matched provider started working
    pub fn start_request(&self, request_id: RequestId, actor_id: &UserId) -> Result<Request> {
        self.advance(request_id, RequestStatus::Matched, RequestStatus::InProgress, actor_id)
    }

    /// External workflow: the work is done
    pub fn complete_request(&self, request_id: RequestId, actor_id: &UserId) -> Result<Request> {
        self.advance(request_id, RequestStatus::InProgress, RequestStatus::Completed, actor_id)
    }

    #[instrument(skip(self), fields(actor_id = %actor_id))]
    fn advance(
        &self,
        request_id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
        actor_id: &UserId,
    ) -> Result<Request> {
        let _guard = self.lock_existing(request_id)?;
        let mut tables = self.ledger.write();

        let current = tables.requests.get(&request_id)?;
        if !tables.requests.transition(request_id, from, to, None) {
            return Err(MarketError::invalid_request_state(request_id, current.status, from));
        }

        info!(status = %to, "Request advanced");
        tables.requests.get(&request_id)
    }

    /// Take the lock of a request known to exist
    ///
    /// Requests are never removed, so the existence check stays valid once
    /// the lock is held.
    fn lock_existing(&self, request_id: RequestId) -> Result<RequestGuard> {
        self.ledger.read().requests.get(&request_id)?;
        Ok(self.locks.lock(request_id))
    }

    /// Steps 1-3: the offer exists and is Pending, its request is Open
    fn check_acceptable(&self, offer_id: OfferId) -> Result<RequestId> {
        let tables = self.ledger.read();
        let offer = tables.offers.get(&offer_id)?;
        if !offer.is_pending() {
            return Err(MarketError::invalid_offer_state(
                offer_id,
                offer.status,
                OfferStatus::Pending,
            ));
        }
        let request = tables.requests.get(&offer.request_id)?;
        if !request.is_open() {
            return Err(MarketError::invalid_request_state(
                request.id,
                request.status,
                RequestStatus::Open,
            ));
        }
        Ok(request.id)
    }

    /// Steps 4-5, all inside one write guard. Caller holds the request lock.
    ///
    /// The event is sequenced before the guard drops, so event order follows
    /// commit order.
    fn commit_acceptance(
        &self,
        offer_id: OfferId,
        request_id: RequestId,
        actor_id: &UserId,
    ) -> Result<(Acceptance, MarketEvent)> {
        let mut tables = self.ledger.write();
        let Tables { requests, offers } = &mut *tables;

        // The offer may have been rejected on its own while the request stayed
        // Open; that is the caller's mistake, not a lost race.
        if requests.status(&request_id) == Some(RequestStatus::Open) {
            if let Some(status) = offers.status(&offer_id) {
                if status != OfferStatus::Pending {
                    return Err(MarketError::invalid_offer_state(
                        offer_id,
                        status,
                        OfferStatus::Pending,
                    ));
                }
            }
        }

        if !requests.transition(
            request_id,
            RequestStatus::Open,
            RequestStatus::Matched,
            Some(offer_id),
        ) {
            debug!(request_id = %request_id, offer_id = %offer_id, "Lost acceptance race");
            return Err(MarketError::Conflict { request_id });
        }

        let won = offers.transition(offer_id, OfferStatus::Pending, OfferStatus::Accepted);
        debug_assert!(won, "winning offer must still be pending under the write guard");
        let rejected = reject_pending(offers, &request_id)?;

        let acceptance = Acceptance {
            request: requests.get(&request_id)?,
            accepted: offers.get(&offer_id)?,
            rejected,
        };
        let event = self.sequencer.envelope(EventPayload::OfferAccepted {
            offer: acceptance.accepted.clone(),
            rejected_offers: acceptance.rejected.clone(),
            actor_id: actor_id.clone(),
        });

        Ok((acceptance, event))
    }

    /// Hand a committed event to the sink; callers hold no lock here
    fn dispatch(&self, event: MarketEvent) {
        let event_type = event.payload.event_type();
        match self.sink.notify(&event) {
            Ok(()) => {}
            Err(NotifyError::NoSubscribers(sequence)) => {
                debug!(event_type, sequence, "No notification subscribers")
            }
            Err(err) => {
                warn!(event_type, sequence = event.sequence, error = %err, "Notification failed")
            }
        }
    }
}

/// Sweep every still-pending offer of a request to Rejected
fn reject_pending(offers: &mut OfferStore, request_id: &RequestId) -> Result<Vec<Offer>> {
    let mut rejected = Vec::new();
    for sibling in offers.pending_for_request(request_id) {
        if offers.transition(sibling, OfferStatus::Pending, OfferStatus::Rejected) {
            rejected.push(offers.get(&sibling)?);
        }
    }
    Ok(rejected)
}
