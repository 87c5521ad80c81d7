//! Error types for the audit-resolver crate.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Fatal conditions only. Per-token degradation (missing rows, failed
/// lookups, malformed tokens) never surfaces here — the resolver renders
/// those as empty values and keeps going.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot read audit log {path}: {source}")]
    InputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write output file {path}: {source}")]
    OutputOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("audit log iteration failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}
