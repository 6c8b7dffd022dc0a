//! Property tests: random operation sequences never break the ledger invariants

use matching_engine::{EngineConfig, MatchingEngine, NoopSink};
use proptest::prelude::*;
use std::sync::Arc;
use types::ids::{OfferId, RequestId, UserId};
use types::numeric::Price;
use types::offer::{NewOffer, OfferStatus};
use types::request::{NewRequest, RequestStatus};

#[derive(Debug, Clone)]
enum Op {
    CreateRequest { service: usize },
    CreateOffer { request: usize, price: u64 },
    Accept { offer: usize },
    Reject { offer: usize },
    Cancel { request: usize },
    Start { request: usize },
    Complete { request: usize },
}

const SERVICES: [&str; 3] = ["plumbing", "electrical", "cleaning"];

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (0..SERVICES.len()).prop_map(|service| Op::CreateRequest { service }),
        4 => (0usize..16, 1u64..500).prop_map(|(request, price)| Op::CreateOffer { request, price }),
        2 => (0usize..32).prop_map(|offer| Op::Accept { offer }),
        1 => (0usize..32).prop_map(|offer| Op::Reject { offer }),
        1 => (0usize..16).prop_map(|request| Op::Cancel { request }),
        1 => (0usize..16).prop_map(|request| Op::Start { request }),
        1 => (0usize..16).prop_map(|request| Op::Complete { request }),
    ]
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[index % items.len()])
    }
}

proptest! {
    #[test]
    fn test_ledger_invariants_hold(ops in prop::collection::vec(op(), 1..80)) {
        let engine = MatchingEngine::new(EngineConfig::default(), Arc::new(NoopSink));
        let actor = UserId::new("client-1");
        let mut requests: Vec<RequestId> = Vec::new();
        let mut offers: Vec<OfferId> = Vec::new();

        for op in ops {
            match op {
                Op::CreateRequest { service } => {
                    let request = engine
                        .create_request(NewRequest::new("client-1", SERVICES[service], ""))
                        .unwrap();
                    requests.push(request.id);
                }
                Op::CreateOffer { request, price } => {
                    if let Some(id) = pick(&requests, request) {
                        let was_open = engine.get_request(id).unwrap().status == RequestStatus::Open;
                        let result = engine.create_offer(NewOffer::new(
                            id,
                            format!("tech-{}", price % 7),
                            Price::from_u64(price),
                        ));
                        prop_assert_eq!(result.is_ok(), was_open);
                        if let Ok(offer) = result {
                            offers.push(offer.id);
                        }
                    }
                }
                Op::Accept { offer } => {
                    if let Some(id) = pick(&offers, offer) {
                        if let Ok(acceptance) = engine.accept_offer(id, &actor) {
                            prop_assert_eq!(acceptance.request.accepted_offer_id, Some(id));
                            prop_assert!(acceptance
                                .rejected
                                .iter()
                                .all(|o| o.status == OfferStatus::Rejected));
                        }
                    }
                }
                Op::Reject { offer } => {
                    if let Some(id) = pick(&offers, offer) {
                        let _ = engine.reject_offer(id, &actor);
                    }
                }
                Op::Cancel { request } => {
                    if let Some(id) = pick(&requests, request) {
                        let _ = engine.cancel_request(id, &actor);
                    }
                }
                Op::Start { request } => {
                    if let Some(id) = pick(&requests, request) {
                        let _ = engine.start_request(id, &actor);
                    }
                }
                Op::Complete { request } => {
                    if let Some(id) = pick(&requests, request) {
                        let _ = engine.complete_request(id, &actor);
                    }
                }
            }

            let tables = engine.ledger().read();
            prop_assert_eq!(tables.verify_invariants(), Ok(()));
        }

        prop_assert!(engine
            .list_open_requests(None)
            .iter()
            .all(|r| r.status == RequestStatus::Open));

        for id in &requests {
            let listed = engine.list_offers_for_request(*id).unwrap();
            let prices: Vec<_> = listed.iter().map(|o| o.price).collect();
            let mut sorted = prices.clone();
            sorted.sort();
            prop_assert_eq!(prices, sorted);
        }
    }

    #[test]
    fn test_terminal_offers_never_change(price in 1u64..1000, accept_first in any::<bool>()) {
        let engine = MatchingEngine::new(EngineConfig::default(), Arc::new(NoopSink));
        let actor = UserId::new("client-1");
        let request = engine
            .create_request(NewRequest::new("client-1", "plumbing", ""))
            .unwrap();
        let offer = engine
            .create_offer(NewOffer::new(request.id, "tech-1", Price::from_u64(price)))
            .unwrap();

        if accept_first {
            engine.accept_offer(offer.id, &actor).unwrap();
        } else {
            engine.reject_offer(offer.id, &actor).unwrap();
        }
        let settled = engine.get_offer(offer.id).unwrap();

        prop_assert!(engine.accept_offer(offer.id, &actor).is_err());
        prop_assert!(engine.reject_offer(offer.id, &actor).is_err());
        prop_assert_eq!(engine.get_offer(offer.id).unwrap(), settled);
    }
}
