//! Matrix Stats Library
//!
//! Parses a CSV feature comparison matrix, reconciles each competitor's free
//! and pro columns into support ratios, and keeps plugin download statistics
//! fresh through a chain of fallback relays.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
