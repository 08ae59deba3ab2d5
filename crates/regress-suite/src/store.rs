//! Baseline storage trait and error types.
//!
//! This module defines the `BaselineStore` trait so the runner can persist and
//! reload a baseline without caring where it lives.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::Suite;

/// Errors that can occur while reading or writing a baseline.
#[derive(Error, Debug)]
pub enum BaselineError {
    /// No baseline exists at the configured location.
    #[error("Baseline not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading or writing the baseline failed.
    #[error("Baseline IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The baseline document could not be decoded.
    #[error("Unreadable baseline document at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The suite could not be encoded.
    #[error("Failed to serialize baseline: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The query catalog is missing, unreadable or empty.
    #[error("Query catalog error: {0}")]
    Catalog(String),
}

/// Trait for baseline storage operations.
///
/// A baseline is always written and read wholesale; there is no partial update.
#[async_trait]
pub trait BaselineStore: Send + Sync {
    /// Replace the stored baseline with `suite`.
    ///
    /// Transient record identifiers are never persisted.
    async fn save(&self, suite: &Suite) -> Result<(), BaselineError>;

    /// Load the stored baseline.
    ///
    /// Returns `BaselineError::NotFound` when nothing has been stored yet.
    async fn load(&self) -> Result<Suite, BaselineError>;

    /// Human-readable location of the baseline, for reporting.
    fn location(&self) -> String;
}
