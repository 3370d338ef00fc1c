//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router around the relay pipeline
//! - Wire up middleware (request ID, tracing)
//! - Translate between axum requests/responses and the pipeline types
//! - Serve until the shutdown broadcast fires

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::fetch::FetchError;
use crate::http::request::{request_id, IncomingRequest, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::relay::Relay;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, FetchError> {
        let state = AppState {
            relay: Arc::new(Relay::from_config(&config)?),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Every path and method lands in the relay handler; the pipeline does
    /// its own dispatch so that CORS covers every exit.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(relay_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                                request_id = %request_id(request.headers()),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.upstream.request_timeout_secs,
            max_redirects = self.config.upstream.max_redirects,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Runs the pipeline for every request.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, _body) = request.into_parts();
    let incoming = IncomingRequest::from(parts);

    let response = state.relay.handle(&incoming).await;

    tracing::debug!(
        status = response.status.as_u16(),
        outcome = response.outcome.as_str(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Response headers ready"
    );
    metrics::record_request(
        incoming.method().as_str(),
        response.status.as_u16(),
        response.outcome.as_str(),
        start,
    );

    response.into_response()
}
