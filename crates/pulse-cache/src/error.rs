//! Cache error types

use thiserror::Error;

/// Cache error type
#[derive(Debug, Error)]
pub enum CacheError {
    /// Entity (de)serialization failed during a keyed merge
    #[error("Entity decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
