//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → OPTIONS: preflight, never reaches the gate
//!     → gate.rs (prefix check, decode, blank check)
//!     → Return: TargetUri or GateError
//! ```
//!
//! # Design Decisions
//! - Single fixed prefix, no route table
//! - No regex in hot path (prefix matching only)
//! - Explicit NotRouted rather than silent default

pub mod gate;

pub use gate::{extract_target, GateError, TargetUri, RELAY_PREFIX};
