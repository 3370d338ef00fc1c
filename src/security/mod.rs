//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every response leaving the relay:
//!     → cors.rs (allow-origin, methods, headers, expose, max-age)
//!     → caller
//! ```
//!
//! # Design Decisions
//! - CORS is applied by the pipeline itself, on every exit path
//! - No caller authentication; the relay is public by design

pub mod cors;

pub use cors::CorsPolicy;
