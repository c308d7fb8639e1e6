//! Error types for root-jailed file handling.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem-facing errors raised by [`crate::file::VirtualFile`] and its collaborators.
///
/// Path algebra never fails; missing entries degrade to neutral values instead of
/// surfacing here.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Extension not allowed: {0:?}")]
    NotAllowed(String),

    #[error("No free name for {path:?} after {attempts} attempts")]
    ConflictExhausted { path: PathBuf, attempts: usize },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Configuration and logging setup errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
