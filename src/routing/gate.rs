//! Request gate: target URI extraction.
//!
//! # Responsibilities
//! - Recognise the `/r/` routing prefix
//! - Percent-decode the remainder into the outbound target
//! - Reject blank targets before anything leaves the process
//!
//! # Design Decisions
//! - No URI validation here; malformed targets fail at fetch time
//! - The decoded target is forwarded verbatim (no trimming)

use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;

/// Routing prefix in front of every relayed URI.
pub const RELAY_PREFIX: &str = "/r/";

/// Why a path could not yield a target.
///
/// The `Display` text is the response body sent to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    /// The path is not under the relay prefix at all.
    #[error("Not found")]
    NotRouted,

    /// The remainder after the prefix is empty or whitespace.
    #[error("Pass the RDF document URI after /r/")]
    BlankTarget,
}

/// The URI to fetch, as extracted from the request path. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUri(String);

impl TargetUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip the relay prefix from a raw request path and decode the rest.
pub fn extract_target(path: &str) -> Result<TargetUri, GateError> {
    let remainder = match path.strip_prefix(RELAY_PREFIX) {
        Some(rest) => rest,
        None if path == RELAY_PREFIX.trim_end_matches('/') => "",
        None => return Err(GateError::NotRouted),
    };

    let target = percent_decode_str(remainder).decode_utf8_lossy();
    if target.trim().is_empty() {
        return Err(GateError::BlankTarget);
    }

    tracing::debug!(target = %target, "Extracted relay target");
    Ok(TargetUri(target.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_escaped_target() {
        let target = extract_target("/r/http%3A%2F%2Fexample.org%2Fdata.ttl").unwrap();
        assert_eq!(target.as_str(), "http://example.org/data.ttl");
    }

    #[test]
    fn keeps_unescaped_target() {
        let target = extract_target("/r/https://example.org/a/b#frag").unwrap();
        assert_eq!(target.as_str(), "https://example.org/a/b#frag");
    }

    #[test]
    fn blank_remainders_are_rejected() {
        for path in ["/r/", "/r", "/r/%20%20", "/r/%09"] {
            assert_eq!(extract_target(path), Err(GateError::BlankTarget), "{path}");
        }
    }

    #[test]
    fn other_paths_are_not_routed() {
        for path in ["/", "/rdf", "/x/http://example.org", "/R/http://example.org"] {
            assert_eq!(extract_target(path), Err(GateError::NotRouted), "{path}");
        }
    }

    #[test]
    fn error_text_is_the_response_body() {
        assert_eq!(
            GateError::BlankTarget.to_string(),
            "Pass the RDF document URI after /r/"
        );
    }
}
