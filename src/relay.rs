//! The relay pipeline.
//!
//! ```text
//! IncomingRequest
//!     → OPTIONS?  preflight 204 ─────────────────────────────┐
//!     → GET/HEAD? else 405                                    │
//!     → routing::gate      (404 / 400 blank target)           │
//!     → negotiation        (400 non-RDF Accept)               │
//!     → fetch::Fetcher     (redirect chain, deadline)         │
//!     → http::response::classify (relay / 422 / 599)          │
//!     → security::cors ◀──────────────────────────────────────┘
//!     → ProxyResponse
//! ```
//!
//! Every request maps to exactly one response; nothing is shared between
//! requests except the fetcher's connection pool.

use axum::http::{header::ALLOW, HeaderValue, Method, StatusCode};

use crate::config::RelayConfig;
use crate::fetch::{FetchError, Fetcher};
use crate::http::request::IncomingRequest;
use crate::http::response::{classify, Outcome, ProxyResponse, METHOD_NOT_ALLOWED};
use crate::negotiation::negotiate;
use crate::routing::{extract_target, GateError};
use crate::security::cors::{CorsPolicy, ALLOWED_METHODS};

/// Request-independent pipeline state.
#[derive(Debug, Clone)]
pub struct Relay {
    fetcher: Fetcher,
    cors: CorsPolicy,
}

impl Relay {
    pub fn new(fetcher: Fetcher, cors: CorsPolicy) -> Self {
        Self { fetcher, cors }
    }

    /// Build the pipeline from a validated configuration.
    pub fn from_config(config: &RelayConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            Fetcher::new(&config.upstream)?,
            CorsPolicy::new(&config.cors),
        ))
    }

    /// Produce the response for one inbound request.
    pub async fn handle(&self, request: &IncomingRequest) -> ProxyResponse {
        let preflight = request.method() == Method::OPTIONS;
        let mut response = if preflight {
            ProxyResponse::preflight()
        } else {
            self.dispatch(request).await
        };

        self.cors
            .apply(request.origin(), preflight, &mut response.headers);
        response
    }

    async fn dispatch(&self, request: &IncomingRequest) -> ProxyResponse {
        let method = request.method();
        if method != Method::GET && method != Method::HEAD {
            let mut response = ProxyResponse::text(
                StatusCode::METHOD_NOT_ALLOWED,
                METHOD_NOT_ALLOWED,
                Outcome::MethodNotAllowed,
            );
            response
                .headers
                .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
            return response;
        }

        let target = match extract_target(request.path()) {
            Ok(target) => target,
            Err(e @ GateError::NotRouted) => {
                return ProxyResponse::text(
                    StatusCode::NOT_FOUND,
                    e.to_string(),
                    Outcome::NotFound,
                );
            }
            Err(e @ GateError::BlankTarget) => {
                return ProxyResponse::text(
                    StatusCode::BAD_REQUEST,
                    e.to_string(),
                    Outcome::BlankTarget,
                );
            }
        };

        if let Some(query) = request.query() {
            tracing::warn!(
                target = %target,
                query,
                "Query string on relayed URI; the target was probably not escaped"
            );
        }

        let accept = match negotiate(request.headers()) {
            Ok(accept) => accept,
            Err(e) => {
                return ProxyResponse::text(
                    StatusCode::BAD_REQUEST,
                    e.to_string(),
                    Outcome::NonRdfAccept,
                );
            }
        };

        let outcome = self
            .fetcher
            .fetch(method, target.as_str(), &accept.to_header_value())
            .await;
        classify(outcome)
    }
}
