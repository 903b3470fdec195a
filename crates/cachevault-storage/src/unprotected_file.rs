use std::path::{Path, PathBuf};

use cachevault_core::storage::{BackendError, CacheBackend, VALIDATION_SUFFIX};
use tracing::instrument;

use crate::file_io;

/// Plain file backend for hosts without a usable secret store. Only chosen
/// when the configuration asks for it; protection is limited to owner-only
/// file permissions on unix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnprotectedFileBackend {
    path: PathBuf,
}

impl UnprotectedFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheBackend for UnprotectedFileBackend {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn read(&self) -> Result<Vec<u8>, BackendError> {
        Ok(file_io::read_if_exists(&self.path)?.unwrap_or_default())
    }

    #[instrument(skip_all, fields(path = %self.path.display(), len = data.len()))]
    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        file_io::write_atomic(&self.path, data)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), BackendError> {
        file_io::remove_if_exists(&self.path)
    }

    fn create_for_persistence_validation(&self) -> Result<Self, BackendError> {
        Ok(Self::new(file_io::with_suffix(&self.path, VALIDATION_SUFFIX)))
    }

    fn describe(&self) -> String {
        format!("unprotected file {}", self.path.display())
    }
}
