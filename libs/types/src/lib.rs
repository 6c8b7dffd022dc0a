//! Types library for the service marketplace
//!
//! This library provides the core type definitions shared by the matching
//! engine and the gateway: identifiers, prices, the Request/Offer lifecycle
//! and the error taxonomy.
//!
//! # Modules
//! - `ids`: Unique identifiers (RequestId, OfferId, UserId, ServiceType)
//! - `numeric`: Decimal price type
//! - `request`: Request lifecycle types
//! - `offer`: Offer lifecycle types
//! - `provider`: Provider directory entries
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod request;
pub mod offer;
pub mod provider;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::request::*;
    pub use crate::offer::*;
    pub use crate::provider::*;
    pub use crate::errors::*;
}
