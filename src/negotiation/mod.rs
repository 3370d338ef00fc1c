//! Negotiation builder.
//!
//! # Data Flow
//! ```text
//! caller Accept header(s)
//!     → joined into one value
//!     → disallowed check (html / application/json substring)
//!     → media_type.rs (lenient list parse, order preserved)
//!     → NegotiatedAccept → forwarded upstream as one header value
//! ```
//!
//! # Design Decisions
//! - The disallowed check is textual, not a structured media-type match
//! - No re-sorting by quality; upstream sees the caller's order
//! - An absent or empty header means "anything"

pub mod media_type;

use axum::http::{header::ACCEPT, HeaderMap};
use thiserror::Error;

pub use media_type::{parse_media_ranges, MediaRange};

/// Forwarded when the caller expressed no usable preference.
pub const ACCEPT_ANY: &str = "*/*";

const DISALLOWED: [&str; 2] = ["html", "application/json"];

/// The caller asked for something this relay refuses to fetch.
///
/// The `Display` text is the response body sent to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NegotiationError {
    #[error("Only RDF formats can be requested")]
    NonRdfRequested,
}

/// Media ranges forwarded upstream, in the caller's order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NegotiatedAccept {
    ranges: Vec<MediaRange>,
}

impl NegotiatedAccept {
    /// Serialize into a single `Accept` value.
    pub fn to_header_value(&self) -> String {
        if self.ranges.is_empty() {
            return ACCEPT_ANY.to_string();
        }
        self.ranges
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Derive the outbound `Accept` from the caller's headers.
pub fn negotiate(headers: &HeaderMap) -> Result<NegotiatedAccept, NegotiationError> {
    let requested = joined_accept(headers);
    let lowered = requested.to_ascii_lowercase();
    if DISALLOWED.iter().any(|needle| lowered.contains(needle)) {
        tracing::debug!(accept = %requested, "Rejecting non-RDF Accept");
        return Err(NegotiationError::NonRdfRequested);
    }

    let negotiated = NegotiatedAccept {
        ranges: parse_media_ranges(&requested),
    };
    tracing::debug!(accept = %negotiated.to_header_value(), "Requesting RDF");
    Ok(negotiated)
}

// Lossy so that obs-text lines are still inspected, never skipped.
fn joined_accept(headers: &HeaderMap) -> String {
    headers
        .get_all(ACCEPT)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .collect::<Vec<_>>()
        .join(", ")
}
