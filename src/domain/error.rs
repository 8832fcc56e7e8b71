//! Domain-level errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors building a forest from an external source.
///
/// Path classification and flag mutation never fail; only loading does.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("cannot walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("invalid tree json: {0}")]
    InvalidTree(#[from] serde_json::Error),
}
