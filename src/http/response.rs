//! Response classification and the relay's response type.
//!
//! # Responsibilities
//! - Map an upstream outcome to one of three response modes
//! - Attach `X-Status-Code` / `X-Content-Type` diagnostics
//! - Stream the upstream body through untouched on success
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Only `Content-Type` is taken from upstream; other headers stay behind
//! - Upstream failure of any kind is 599, a non-standard code callers can
//!   tell apart from the relay's own errors

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::fetch::{FetchError, OutboundResponse};

/// Raw upstream content type.
pub const X_CONTENT_TYPE: HeaderName = HeaderName::from_static("x-content-type");
/// Raw upstream status code.
pub const X_STATUS_CODE: HeaderName = HeaderName::from_static("x-status-code");

pub const UPSTREAM_FAILED: &str = "Error fetching the resource";
pub const NOT_RDF: &str = "Server did not return any RDF";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Upstream fetch failed or answered with an error.
pub const UPSTREAM_ERROR_STATUS: u16 = 599;

/// Which branch of the pipeline produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Preflight,
    Relayed,
    BlankTarget,
    NonRdfAccept,
    NotRdf,
    UpstreamError,
    NotFound,
    MethodNotAllowed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Preflight => "preflight",
            Outcome::Relayed => "relayed",
            Outcome::BlankTarget => "blank_target",
            Outcome::NonRdfAccept => "non_rdf_accept",
            Outcome::NotRdf => "not_rdf",
            Outcome::UpstreamError => "upstream_error",
            Outcome::NotFound => "not_found",
            Outcome::MethodNotAllowed => "method_not_allowed",
        }
    }
}

/// The single response produced for an inbound request.
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
    pub outcome: Outcome,
}

impl ProxyResponse {
    /// A fixed plain-text response.
    pub fn text(status: StatusCode, body: impl Into<String>, outcome: Outcome) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        Self {
            status,
            headers,
            body: Body::from(body.into()),
            outcome,
        }
    }

    /// An empty 204, headers to be filled in by CORS.
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: Body::empty(),
            outcome: Outcome::Preflight,
        }
    }

    fn upstream_error() -> Self {
        Self::text(upstream_error_status(), UPSTREAM_FAILED, Outcome::UpstreamError)
    }
}

impl std::fmt::Debug for ProxyResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

fn upstream_error_status() -> StatusCode {
    StatusCode::from_u16(UPSTREAM_ERROR_STATUS).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Choose the response for a fetch outcome.
pub fn classify(outcome: Result<OutboundResponse, FetchError>) -> ProxyResponse {
    let upstream = match outcome {
        Ok(upstream) => upstream,
        Err(e) => {
            tracing::warn!(error = %e, "Upstream fetch failed");
            return ProxyResponse::upstream_error();
        }
    };

    let status = upstream.status();
    let content_type = upstream.content_type().cloned();
    tracing::info!(
        url = %upstream.url(),
        status = status.as_u16(),
        content_type = ?content_type,
        "Upstream classified"
    );

    let mut response = if status.is_client_error() || status.is_server_error() {
        ProxyResponse::upstream_error()
    } else if content_type.as_ref().is_some_and(is_html) {
        ProxyResponse::text(StatusCode::UNPROCESSABLE_ENTITY, NOT_RDF, Outcome::NotRdf)
    } else {
        let mut headers = HeaderMap::new();
        if let Some(ct) = &content_type {
            headers.insert(CONTENT_TYPE, ct.clone());
        }
        ProxyResponse {
            status,
            headers,
            body: upstream.into_body(),
            outcome: Outcome::Relayed,
        }
    };

    if let Some(ct) = content_type {
        response.headers.insert(X_CONTENT_TYPE, ct);
    }
    response.headers.insert(X_STATUS_CODE, HeaderValue::from(status.as_u16()));
    response
}

fn is_html(content_type: &HeaderValue) -> bool {
    String::from_utf8_lossy(content_type.as_bytes())
        .to_ascii_lowercase()
        .contains("html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(status: u16, content_type: Option<&str>, body: &'static str) -> OutboundResponse {
        let mut builder = axum::http::Response::builder().status(status);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        OutboundResponse::from(reqwest::Response::from(builder.body(body).unwrap()))
    }

    async fn body_text(response: ProxyResponse) -> String {
        let bytes = axum::body::to_bytes(response.body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn rdf_is_passed_through() {
        let response = classify(Ok(upstream(200, Some("text/turtle"), "<s> <p> <o> .")));

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.outcome, Outcome::Relayed);
        assert_eq!(response.headers[CONTENT_TYPE], "text/turtle");
        assert_eq!(response.headers[X_CONTENT_TYPE], "text/turtle");
        assert_eq!(response.headers[X_STATUS_CODE], "200");
        assert_eq!(body_text(response).await, "<s> <p> <o> .");
    }

    #[tokio::test]
    async fn html_is_unprocessable_even_on_200() {
        let response = classify(Ok(upstream(200, Some("Text/HTML; charset=utf-8"), "<html/>")));

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.headers[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers[X_CONTENT_TYPE], "Text/HTML; charset=utf-8");
        assert_eq!(body_text(response).await, NOT_RDF);
    }

    #[tokio::test]
    async fn error_status_is_599_with_diagnostics() {
        for code in [404, 410, 500, 503] {
            let response = classify(Ok(upstream(code, Some("text/html"), "nope")));

            assert_eq!(response.status.as_u16(), 599);
            assert_eq!(response.outcome, Outcome::UpstreamError);
            assert_eq!(response.headers[X_STATUS_CODE], code.to_string().as_str());
            assert_eq!(response.headers[X_CONTENT_TYPE], "text/html");
            assert_eq!(body_text(response).await, UPSTREAM_FAILED);
        }
    }

    #[tokio::test]
    async fn fetch_failure_is_599_without_diagnostics() {
        let response = classify(Err(FetchError::TooManyRedirects(20)));

        assert_eq!(response.status.as_u16(), 599);
        assert!(response.headers.get(X_STATUS_CODE).is_none());
        assert!(response.headers.get(X_CONTENT_TYPE).is_none());
        assert_eq!(body_text(response).await, UPSTREAM_FAILED);
    }

    #[tokio::test]
    async fn non_error_status_is_mirrored() {
        let response = classify(Ok(upstream(203, Some("application/n-triples"), "")));
        assert_eq!(response.status, StatusCode::NON_AUTHORITATIVE_INFORMATION);
        assert_eq!(response.outcome, Outcome::Relayed);
    }

    #[test]
    fn missing_content_type_is_relayed_bare() {
        let response = classify(Ok(upstream(200, None, "data")));
        assert_eq!(response.outcome, Outcome::Relayed);
        assert!(response.headers.get(CONTENT_TYPE).is_none());
        assert!(response.headers.get(X_CONTENT_TYPE).is_none());
    }

    #[test]
    fn into_response_keeps_status_and_headers() {
        let response = ProxyResponse::text(StatusCode::BAD_REQUEST, "no", Outcome::BlankTarget)
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }
}
