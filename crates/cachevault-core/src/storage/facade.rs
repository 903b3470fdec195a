use std::sync::Arc;

use super::{
    backend::{BackendError, CacheBackend},
    error::StorageError,
    validation,
};
use crate::{config::StorageConfiguration, logging::CacheLogger};

/// Caller-facing storage for the credential cache.
///
/// Backend failures during read, write and clear are logged and absorbed: a
/// failed read looks exactly like an empty cache, a failed write or clear
/// looks like success. Only [`Self::write_data`] with an absent payload and
/// [`Self::verify_persistence`] report errors.
///
/// Nothing is cached between calls; concurrent callers are serialized only
/// as far as the backend's native store serializes them.
pub struct CacheStorage<B: CacheBackend> {
    config: StorageConfiguration,
    backend: B,
    logger: Arc<dyn CacheLogger>,
}

impl<B: CacheBackend> CacheStorage<B> {
    pub fn new(config: StorageConfiguration, backend: B, logger: Arc<dyn CacheLogger>) -> Self {
        Self {
            config,
            backend,
            logger,
        }
    }

    pub fn config(&self) -> &StorageConfiguration {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read the stored cache. Unreadable storage is cleared and reported as
    /// empty.
    pub fn read_data(&self) -> Vec<u8> {
        let exists = self.config.cache_file_path().exists();
        self.logger.info(&format!(
            "reading cache from {} (cache file exists: {exists})",
            self.backend.describe()
        ));

        match self.absorb("read", self.backend.read()) {
            Some(data) => {
                self.logger.info(&format!("read {} bytes from cache", data.len()));
                data
            }
            None => {
                self.logger.info("clearing cache storage after failed read");
                self.clear();
                Vec::new()
            }
        }
    }

    /// Persist `data`, replacing any prior cache. `None` is rejected before
    /// any backend I/O; backend failures are only logged.
    pub fn write_data(&self, data: Option<&[u8]>) -> Result<(), StorageError> {
        let data =
            data.ok_or_else(|| StorageError::invalid_argument("cache data must be present"))?;

        self.logger.info(&format!(
            "writing {} bytes to {}",
            data.len(),
            self.backend.describe()
        ));
        if self.absorb("write", self.backend.write(data)).is_some() {
            self.logger.info("cache written");
        }
        Ok(())
    }

    /// Remove the stored cache. Failures are only logged.
    pub fn clear(&self) {
        self.logger.info(&format!("clearing {}", self.backend.describe()));
        if self.absorb("clear", self.backend.clear()).is_some() {
            self.logger.info("cache cleared");
        }
    }

    /// Always `true`. Finer-grained change detection (timestamps, hashes)
    /// produced inconsistent caches across processes, so consumers must
    /// re-read on every access.
    pub fn has_changed(&self) -> bool {
        true
    }

    /// Prove the backend can round-trip data, using an isolated instance.
    pub fn verify_persistence(&self) -> Result<(), StorageError> {
        validation::verify_persistence(&self.backend, self.logger.as_ref())
    }

    /// The single place where backend errors are logged and dropped.
    fn absorb<T>(&self, operation: &str, result: Result<T, BackendError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.logger.error(&format!(
                    "cache {operation} failed on {}: {err}",
                    self.backend.describe()
                ));
                None
            }
        }
    }
}
