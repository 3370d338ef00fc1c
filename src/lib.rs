//! RDF relay library.
//!
//! A single-endpoint HTTP relay that lets browser code fetch RDF documents
//! from servers with missing or broken CORS and content negotiation.
//! `GET /r/<uri>` fetches `<uri>` with the caller's RDF `Accept` preferences,
//! follows redirects generously, and streams the document back with
//! permissive cross-origin headers.

// Pipeline stages
pub mod fetch;
pub mod http;
pub mod negotiation;
pub mod relay;
pub mod routing;
pub mod security;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::Relay;
