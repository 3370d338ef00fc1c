//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing span)
//!     → request.rs (IncomingRequest snapshot)
//!     → relay pipeline
//!     → response.rs (classification, ProxyResponse → axum Response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{IncomingRequest, MakeRequestUuid, X_REQUEST_ID};
pub use response::{classify, Outcome, ProxyResponse};
pub use server::HttpServer;
