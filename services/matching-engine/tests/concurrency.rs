//! Concurrency test
//!
//! Many threads race to accept different offers of the same request. Exactly
//! one may win; every loser must leave no trace.

use matching_engine::{
    EngineConfig, MarketEvent, MatchingEngine, NoopSink, NotificationSink, NotifyError,
};
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::thread;
use types::errors::ErrorKind;
use types::ids::{OfferId, UserId};
use types::numeric::Price;
use types::offer::{NewOffer, OfferStatus};
use types::provider::NewProvider;
use types::request::{NewRequest, Request, RequestStatus};

fn engine() -> Arc<MatchingEngine> {
    Arc::new(MatchingEngine::new(EngineConfig::default(), Arc::new(NoopSink)))
}

fn request_with_offers(engine: &MatchingEngine, count: u64) -> (Request, Vec<OfferId>) {
    let request = engine
        .create_request(NewRequest::new("client-1", "plumbing", "burst pipe"))
        .unwrap();
    let offers = (0..count)
        .map(|i| {
            engine
                .create_offer(NewOffer::new(
                    request.id,
                    format!("tech-{}", i),
                    Price::from_u64(100 + i),
                ))
                .unwrap()
                .id
        })
        .collect();
    (request, offers)
}

#[test]
fn test_concurrent_accepts_have_one_winner() {
    for _round in 0..50 {
        let engine = engine();
        let (request, offers) = request_with_offers(&engine, 8);
        let barrier = Arc::new(Barrier::new(offers.len()));

        let handles: Vec<_> = offers
            .iter()
            .map(|&offer_id| {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (offer_id, engine.accept_offer(offer_id, &UserId::new("client-1")))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners: Vec<OfferId> = results
            .iter()
            .filter(|(_, r)| r.is_ok())
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(winners.len(), 1, "exactly one accept must succeed");
        let winner = winners[0];

        for (_, result) in results.iter().filter(|(_, r)| r.is_err()) {
            let kind = result.as_ref().unwrap_err().kind();
            // Losers either lost the CAS or arrived after their offer was swept
            assert!(
                matches!(kind, ErrorKind::Conflict | ErrorKind::InvalidState),
                "unexpected loser error {:?}",
                kind
            );
        }

        let stored = engine.get_request(request.id).unwrap();
        assert_eq!(stored.status, RequestStatus::Matched);
        assert_eq!(stored.accepted_offer_id, Some(winner));
        for offer_id in &offers {
            let expected = if *offer_id == winner {
                OfferStatus::Accepted
            } else {
                OfferStatus::Rejected
            };
            assert_eq!(engine.get_offer(*offer_id).unwrap().status, expected);
        }
        assert!(engine.ledger().read().verify_invariants().is_ok());
    }
}

#[test]
fn test_readers_never_see_partial_acceptance() {
    let engine = engine();
    let mut requests = Vec::new();
    for _ in 0..20 {
        requests.push(request_with_offers(&engine, 4));
    }

    let writer = {
        let engine = Arc::clone(&engine);
        let targets: Vec<OfferId> = requests.iter().map(|(_, offers)| offers[2]).collect();
        thread::spawn(move || {
            for offer_id in targets {
                engine.accept_offer(offer_id, &UserId::new("client-1")).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let ids: Vec<_> = requests.iter().map(|(r, _)| r.id).collect();
            thread::spawn(move || {
                for _ in 0..200 {
                    let tables = engine.ledger().read();
                    assert!(tables.verify_invariants().is_ok());
                    for id in &ids {
                        let request = tables.requests.get(id).unwrap();
                        let accepted = tables
                            .offers
                            .list_for_request(id)
                            .iter()
                            .filter(|o| o.status == OfferStatus::Accepted)
                            .count();
                        match request.status {
                            RequestStatus::Open => assert_eq!(accepted, 0),
                            RequestStatus::Matched => assert_eq!(accepted, 1),
                            other => panic!("unexpected status {}", other),
                        }
                    }
                    drop(tables);
                    assert!(engine
                        .list_open_requests(None)
                        .iter()
                        .all(|r| r.status == RequestStatus::Open));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert!(engine.list_open_requests(None).is_empty());
}

#[test]
fn test_cancel_races_accept() {
    for _round in 0..50 {
        let engine = engine();
        let (request, offers) = request_with_offers(&engine, 2);
        let barrier = Arc::new(Barrier::new(2));

        let accept = {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            let offer_id = offers[0];
            thread::spawn(move || {
                barrier.wait();
                engine.accept_offer(offer_id, &UserId::new("client-1")).is_ok()
            })
        };
        let cancel = {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine.cancel_request(request.id, &UserId::new("client-1")).is_ok()
            })
        };

        let accepted = accept.join().unwrap();
        let cancelled = cancel.join().unwrap();
        assert!(accepted ^ cancelled, "exactly one of accept/cancel must win");

        let status = engine.get_request(request.id).unwrap().status;
        if accepted {
            assert_eq!(status, RequestStatus::Matched);
        } else {
            assert_eq!(status, RequestStatus::Cancelled);
        }
        assert!(engine.ledger().read().verify_invariants().is_ok());
    }
}

#[test]
fn test_offers_race_acceptance_without_leaking_pending() {
    for _round in 0..20 {
        let engine = engine();
        let (request, offers) = request_with_offers(&engine, 1);
        let barrier = Arc::new(Barrier::new(5));

        let bidders: Vec<_> = (0..4)
            .map(|i| {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let _ = engine.create_offer(NewOffer::new(
                        request.id,
                        format!("late-{}", i),
                        Price::from_u64(10),
                    ));
                })
            })
            .collect();

        barrier.wait();
        engine.accept_offer(offers[0], &UserId::new("client-1")).unwrap();
        for bidder in bidders {
            bidder.join().unwrap();
        }

        // Offers placed before the match were swept; later ones were refused
        let pending = engine
            .list_offers_for_request(request.id)
            .unwrap()
            .into_iter()
            .filter(|o| o.status == OfferStatus::Pending)
            .count();
        assert_eq!(pending, 0);
        assert!(engine.ledger().read().verify_invariants().is_ok());
    }
}

#[derive(Default)]
struct SequenceLog(Mutex<Vec<(&'static str, u64)>>);

impl SequenceLog {
    fn sequence_of(&self, event_type: &str) -> u64 {
        self.0
            .lock()
            .iter()
            .find(|(t, _)| *t == event_type)
            .map(|(_, seq)| *seq)
            .unwrap()
    }
}

impl NotificationSink for SequenceLog {
    fn notify(&self, event: &MarketEvent) -> Result<(), NotifyError> {
        self.0
            .lock()
            .push((event.payload.event_type(), event.sequence));
        Ok(())
    }
}

#[test]
fn test_event_sequence_follows_commit_order() {
    for _round in 0..20 {
        let log = Arc::new(SequenceLog::default());
        let engine = Arc::new(MatchingEngine::new(EngineConfig::default(), log.clone()));
        // Many eligible providers make each event slow to build and deliver
        for i in 0..2_000 {
            engine
                .directory()
                .register(NewProvider::new(format!("tech-{}", i), "Tech", "plumbing"))
                .unwrap();
        }

        let racer = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || loop {
                if let Some(request) = engine.list_open_requests(None).into_iter().next() {
                    let offer = engine
                        .create_offer(NewOffer::new(request.id, "tech-0", Price::from_u64(10)))
                        .unwrap();
                    engine.accept_offer(offer.id, &UserId::new("client-1")).unwrap();
                    break;
                }
                thread::yield_now();
            })
        };

        engine
            .create_request(NewRequest::new("client-1", "plumbing", "fast racer"))
            .unwrap();
        racer.join().unwrap();

        assert!(log.sequence_of("request_created") < log.sequence_of("offer_accepted"));
    }
}
