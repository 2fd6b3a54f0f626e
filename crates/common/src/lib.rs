//! camrig Common Utilities
//!
//! Shared infrastructure for all camrig crates:
//! - Error types and result aliases
//! - Fixed-step frame clock for driving rigs outside a game engine
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
