//! Domain module containing the core data types
//!
//! This module defines the shop categories, stock items, snapshots and the
//! per-category history rebuilt from storage.

pub mod types;
pub mod snapshot;

// Re-export public types for easy access
pub use types::*;
pub use snapshot::*;

use thiserror::Error;

/// Errors that can occur when building domain values
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}
