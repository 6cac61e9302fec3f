//! Error types for scriptpack
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scriptpack operations
pub type ScriptpackResult<T> = Result<T, ScriptpackError>;

/// Main error type for scriptpack operations
#[derive(Error, Debug)]
pub enum ScriptpackError {
    /// Invalid configuration file
    #[error("invalid configuration in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Invalid asset manifest
    #[error("invalid asset manifest {file}: {message}")]
    InvalidManifest { file: PathBuf, message: String },

    /// Duplicate handle in one registry snapshot
    #[error("duplicate asset handle '{handle}' in manifest")]
    DuplicateHandle { handle: String },

    /// Configured site URL is unusable
    #[error("invalid site URL '{url}': {message}")]
    InvalidSiteUrl { url: String, message: String },

    /// Cache root cannot be created or written
    #[error("cache root {root} is not writable")]
    CacheNotWritable { root: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
