//! Matching Engine Service
//!
//! Coordinates the request/offer marketplace: providers bid on open
//! requests, and the requester accepts exactly one bid.
//!
//! **Key Invariants:**
//! - At most one accepted offer per request
//! - A matched request has one accepted offer and every sibling rejected
//! - Offer statuses are monotonic; Accepted and Rejected are terminal
//! - Offers are only created against Open requests

pub mod directory;
pub mod engine;
pub mod events;
pub mod guard;
pub mod notify;
pub mod store;

pub use directory::ProviderDirectory;
pub use engine::{Acceptance, EngineConfig, MatchingEngine};
pub use events::{EventPayload, MarketEvent};
pub use notify::{FanoutSink, NoopSink, NotificationSink, NotifyError, TracingSink};
