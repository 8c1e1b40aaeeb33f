//! Error types for schema pruning

use std::path::PathBuf;

use thiserror::Error;

/// Result type for prune operations
pub type Result<T> = std::result::Result<T, PruneError>;

/// Schema pruning errors
#[derive(Error, Debug)]
pub enum PruneError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Rule file error: {0}")]
    RuleFile(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
