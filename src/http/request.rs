//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Capture the parts of the inbound request the pipeline needs
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The pipeline works on an immutable snapshot, never on the axum request

use axum::http::{
    header::ORIGIN, request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Request,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID of a request, or `-` before one was assigned.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// What the relay sees of an inbound request.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
}

impl IncomingRequest {
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Raw, undecoded path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string, if non-empty.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn origin(&self) -> Option<&HeaderValue> {
        self.headers.get(ORIGIN)
    }
}

impl From<Parts> for IncomingRequest {
    fn from(parts: Parts) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            headers: parts.headers,
        }
    }
}
