//! Media Composer Common Utilities
//!
//! Shared infrastructure for all composer crates:
//! - Error types and result aliases
//! - Clock and tick-rate utilities for the draw loop and stroke sweeps
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
