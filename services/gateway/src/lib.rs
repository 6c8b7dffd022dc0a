//! Gateway Service
//!
//! HTTP and WebSocket front door for the marketplace. Authenticates callers
//! with HS256 bearer tokens and drives the in-process matching engine.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod router;
pub mod state;

pub use config::Config;
pub use router::create_router;
pub use state::AppState;
