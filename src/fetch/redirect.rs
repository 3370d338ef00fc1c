//! Redirect predicate.
//!
//! A hop is followed when the status is in 301..=399 or when the response
//! carries a `Location` header at all, whatever its status. This is wider
//! than what HTTP clients do by default; some RDF publishers answer with a
//! 200 or 201 plus `Location`, or with 303 which many clients skip.
//!
//! Following any `Location` means the relay can be bounced to hosts the
//! caller never named. The hop limit is the only bound.

use axum::http::{header::LOCATION, HeaderMap, StatusCode};
use url::Url;

/// Whether a response should be treated as a redirect.
pub fn should_follow(status: StatusCode, headers: &HeaderMap) -> bool {
    (301..=399).contains(&status.as_u16()) || headers.contains_key(LOCATION)
}

/// Next URL to fetch, or `None` when this response is final.
///
/// A redirect-looking response without a usable `Location` is final.
pub fn next_hop(current: &Url, status: StatusCode, headers: &HeaderMap) -> Option<Url> {
    if !should_follow(status, headers) {
        return None;
    }

    let location = match headers.get(LOCATION).map(|v| v.to_str()) {
        Some(Ok(location)) => location,
        Some(Err(_)) => {
            tracing::warn!(url = %current, %status, "Redirect Location is not valid text");
            return None;
        }
        None => return None,
    };

    match current.join(location) {
        Ok(next) => Some(next),
        Err(e) => {
            tracing::warn!(url = %current, %status, location, error = %e, "Unresolvable redirect Location");
            None
        }
    }
}
