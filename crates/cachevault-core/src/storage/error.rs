use thiserror::Error;

use super::backend::BackendError;

/// Errors visible to callers of the storage facade and backend selection.
/// Backend faults during read/write/clear never surface here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Caller supplied an absent payload or an incomplete configuration.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    /// No backend exists for the running operating system.
    #[error("unsupported platform: {os}")]
    UnsupportedPlatform { os: String },
    /// The backend failed to round-trip the persistence marker.
    #[error("persistence check failed: {reason}")]
    PersistenceCheckFailed {
        reason: String,
        #[source]
        source: Option<BackendError>,
    },
}

impl StorageError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}
