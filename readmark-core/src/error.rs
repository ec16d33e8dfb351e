//! Error types for Readmark Core

use thiserror::Error;

/// Result type alias using ProgressError
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Top-level error type for Readmark operations that are allowed to fail
///
/// The progress APIs themselves never return these; they collapse every
/// failure to `None` and report the cause through `tracing`.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid EPUB: {0}")]
    Epub(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Faults raised by a navigation resolver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Malformed location: {0}")]
    Malformed(String),

    #[error("Location out of range: {0}")]
    OutOfRange(String),

    #[error("Resolver failure: {0}")]
    Internal(String),
}

/// Errors that occur while producing a section document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Section not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Errors in progress engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
