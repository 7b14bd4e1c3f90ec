//! # Lineage Shared
//!
//! Configuration types and errors used across all Lineage packages.

pub mod config;
pub mod error;

// Re-exports
pub use config::*;
pub use error::*;
