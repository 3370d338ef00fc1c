//! Outbound fetcher.
//!
//! # Responsibilities
//! - Issue GET/HEAD to the target with the negotiated `Accept`
//! - Walk the redirect chain with the widened predicate
//! - Bound the chain by a deadline and a hop limit
//! - Hand back the final response with its body still unread
//!
//! # Design Decisions
//! - reqwest's own redirect handling is disabled; the hop loop here owns it
//! - One pooled client shared by all requests; each fetch owns its response
//! - The body is never buffered: dropping it closes the upstream connection

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
};
use futures_util::TryStreamExt;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::UpstreamConfig;
use crate::fetch::error::FetchError;
use crate::fetch::redirect::next_hop;
use crate::observability::metrics;

/// Final upstream response, headers read, body pending.
#[derive(Debug)]
pub struct OutboundResponse {
    status: StatusCode,
    content_type: Option<HeaderValue>,
    url: Url,
    inner: reqwest::Response,
}

impl OutboundResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw upstream `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    /// URL of the hop that produced this response.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Turn the pending upstream body into a streaming response body.
    ///
    /// Chunks are pulled only as fast as the downstream consumes them.
    pub fn into_body(self) -> Body {
        let url = self.url;
        let stream = self.inner.bytes_stream().inspect_err(move |e| {
            tracing::warn!(url = %url, error = %e, "Upstream body stream failed");
        });
        Body::from_stream(stream)
    }
}

impl From<reqwest::Response> for OutboundResponse {
    fn from(inner: reqwest::Response) -> Self {
        Self {
            status: inner.status(),
            content_type: inner.headers().get(CONTENT_TYPE).cloned(),
            url: inner.url().clone(),
            inner,
        }
    }
}

/// Fetches relay targets over a shared connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_redirects: usize,
}

impl Fetcher {
    /// Build a fetcher from upstream settings.
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_redirects: config.max_redirects,
        })
    }

    /// Fetch `target`, following redirects, until a final response arrives.
    pub async fn fetch(
        &self,
        method: &Method,
        target: &str,
        accept: &str,
    ) -> Result<OutboundResponse, FetchError> {
        let url = Url::parse(target).map_err(|source| FetchError::InvalidTarget {
            uri: target.to_string(),
            source,
        })?;

        let start = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.follow(method, url, accept))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        tracing::debug!(
            url = %response.url(),
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream responded"
        );
        Ok(response)
    }

    async fn follow(
        &self,
        method: &Method,
        mut url: Url,
        accept: &str,
    ) -> Result<OutboundResponse, FetchError> {
        let mut hops = 0;
        loop {
            let response = self
                .client
                .request(method.clone(), url.clone())
                .header(ACCEPT, accept)
                .send()
                .await?;

            let Some(next) = next_hop(&url, response.status(), response.headers()) else {
                return Ok(OutboundResponse::from(response));
            };

            hops += 1;
            if hops > self.max_redirects {
                return Err(FetchError::TooManyRedirects(self.max_redirects));
            }

            tracing::debug!(
                from = %url,
                to = %next,
                status = %response.status(),
                hop = hops,
                "Following redirect"
            );
            metrics::record_redirect();
            url = next;
        }
    }
}
