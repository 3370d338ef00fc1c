//! Outbound fetch subsystem.
//!
//! # Data Flow
//! ```text
//! TargetUri + method + Accept
//!     → client.rs (pooled reqwest client, deadline)
//!     → redirect.rs (widened predicate, Location resolution) per hop
//!     → OutboundResponse (status, content type, pending body)
//!       or FetchError
//! ```

pub mod client;
pub mod error;
pub mod redirect;

pub use client::{Fetcher, OutboundResponse};
pub use error::FetchError;
