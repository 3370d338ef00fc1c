//! Cross-origin header injection.
//!
//! Applied to every response the relay produces, error responses included,
//! so browser callers can always read status and body.

use axum::http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, VARY,
    },
    HeaderMap, HeaderName, HeaderValue,
};

use crate::config::CorsConfig;

/// Methods the relay answers.
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Request headers browsers may send, lower-cased.
pub const BASE_ALLOWED_HEADERS: [&str; 7] = [
    "accept",
    "content-type",
    "origin",
    "authorization",
    "oslc-core-version",
    "configuration-context",
    "oslc-configuration-context",
];

/// Diagnostic headers browsers may read.
pub const EXPOSED_HEADERS: &str = "x-content-type, x-status-code";

/// Precomputed CORS header values.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_headers: HeaderValue,
    max_age: Option<HeaderValue>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::new(&CorsConfig::default())
    }
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Self {
        let mut names: Vec<String> = BASE_ALLOWED_HEADERS.iter().map(|h| h.to_string()).collect();
        for extra in &config.extra_allowed_headers {
            match HeaderName::from_bytes(extra.trim().as_bytes()) {
                Ok(name) if !names.iter().any(|n| n == name.as_str()) => {
                    names.push(name.as_str().to_string());
                }
                Ok(_) => {}
                Err(_) => tracing::warn!(header = %extra, "Ignoring invalid allowed header"),
            }
        }

        let allow_headers = HeaderValue::try_from(names.join(", "))
            .unwrap_or_else(|_| HeaderValue::from_static("accept, content-type, origin"));

        Self {
            allow_headers,
            max_age: config.preflight_max_age_secs.map(HeaderValue::from),
        }
    }

    /// Add the CORS headers for a caller's `Origin` to `headers`.
    ///
    /// The origin is reflected when present, otherwise `*` is sent.
    pub fn apply(&self, origin: Option<&HeaderValue>, preflight: bool, headers: &mut HeaderMap) {
        match origin {
            Some(origin) => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
                if !preflight {
                    headers.append(VARY, HeaderValue::from_static("origin"));
                }
            }
            None => {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
            }
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());

        if preflight {
            if let Some(max_age) = &self.max_age {
                headers.insert(ACCESS_CONTROL_MAX_AGE, max_age.clone());
            }
        } else {
            headers.insert(
                ACCESS_CONTROL_EXPOSE_HEADERS,
                HeaderValue::from_static(EXPOSED_HEADERS),
            );
        }
    }
}
