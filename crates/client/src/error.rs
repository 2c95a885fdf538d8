//! Unified error handling for the sync engine.
//!
//! Each concern keeps its own error enum (`ApiError`, `StorageError`,
//! `ConfigError`); this module unifies them at the library boundary. Remote
//! failures on the fire-and-forget paths never reach this type - they are
//! logged and swallowed where they occur so a failed push cannot corrupt the
//! in-memory collections.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::persist::StorageError;

/// Top-level error type for the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote account API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable local store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;
