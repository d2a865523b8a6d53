//! Poise Common Utilities
//!
//! Shared infrastructure for all Poise crates:
//! - Error types and result aliases
//! - Sampling clock for the frame loop
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
