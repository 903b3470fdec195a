//! Round-trip check proving a backend can persist data before real secrets
//! are entrusted to it.
//!
//! The check runs against an isolated instance obtained from
//! [`CacheBackend::create_for_persistence_validation`]: write the marker,
//! read it back, compare, and always clear the isolated instance afterwards.
//! Every failure is reported as a single [`StorageError::PersistenceCheckFailed`].

use std::fmt;

use super::{
    backend::{BackendError, CacheBackend},
    error::StorageError,
};
use crate::logging::CacheLogger;

/// Payload written to and read back from the isolated instance.
pub const PERSISTENCE_MARKER: &str = "cachevault_persistence_check";

/// Appended to every identifier of a validation instance.
pub const VALIDATION_SUFFIX: &str = ".persistence-check";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CreateInstance,
    Write,
    Read,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CreateInstance => "creating the validation instance",
            Step::Write => "writing the marker",
            Step::Read => "reading the marker back",
        };
        f.write_str(name)
    }
}

/// Clears the isolated instance when dropped, on every exit path.
struct CleanupGuard<'a, B: CacheBackend> {
    backend: B,
    logger: &'a dyn CacheLogger,
}

impl<B: CacheBackend> Drop for CleanupGuard<'_, B> {
    fn drop(&mut self) {
        if let Err(err) = self.backend.clear() {
            self.logger.error(&format!(
                "persistence check: failed to clear validation storage ({}): {err}",
                self.backend.describe()
            ));
        }
    }
}

/// Run the check against an isolated sibling of `production`.
pub fn verify_persistence<B: CacheBackend>(
    production: &B,
    logger: &dyn CacheLogger,
) -> Result<(), StorageError> {
    let isolated = production
        .create_for_persistence_validation()
        .map_err(|err| backend_failure(Step::CreateInstance, err))?;
    let guard = CleanupGuard {
        backend: isolated,
        logger,
    };

    logger.info(&format!(
        "persistence check: testing {}",
        guard.backend.describe()
    ));
    let outcome = round_trip(&guard.backend);
    match &outcome {
        Ok(()) => logger.info("persistence check: marker round-tripped"),
        Err(err) => logger.error(&err.to_string()),
    }
    outcome
}

fn round_trip<B: CacheBackend>(backend: &B) -> Result<(), StorageError> {
    backend
        .write(PERSISTENCE_MARKER.as_bytes())
        .map_err(|err| backend_failure(Step::Write, err))?;

    let read_back = backend
        .read()
        .map_err(|err| backend_failure(Step::Read, err))?;

    if read_back.is_empty() {
        return Err(StorageError::PersistenceCheckFailed {
            reason: "data was written but could not be read back (write succeeded, read empty); \
                     the secret store may be unreachable from this session"
                .to_string(),
            source: None,
        });
    }

    let actual = String::from_utf8_lossy(&read_back);
    if actual != PERSISTENCE_MARKER {
        return Err(StorageError::PersistenceCheckFailed {
            reason: format!(
                "data read back differs from data written: \
                 expected '{PERSISTENCE_MARKER}', actual '{actual}'"
            ),
            source: None,
        });
    }

    Ok(())
}

fn backend_failure(step: Step, err: BackendError) -> StorageError {
    StorageError::PersistenceCheckFailed {
        reason: format!("{step} failed: {err}"),
        source: Some(err),
    }
}
