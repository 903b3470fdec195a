//! Whole-file helpers shared by the file backends.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::Path,
};

use cachevault_core::storage::BackendError;
use tempfile::NamedTempFile;

/// Replace `path` atomically with `bytes`. The temp file lives in the same
/// directory so the final rename cannot cross file systems; on unix it is
/// created with mode 0600.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let parent = path.parent().ok_or_else(|| BackendError::Io {
        reason: format!("invalid storage path: {}", path.display()),
    })?;
    fs::create_dir_all(parent).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Contents of `path`, or `None` when it does not exist.
pub(crate) fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, BackendError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(err)),
    }
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<(), BackendError> {
    match fs::remove_file(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(err)),
    }
}

/// `path` with `suffix` appended to its final component.
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    name.into()
}

pub(crate) fn io_err<E: ToString>(err: E) -> BackendError {
    BackendError::Io {
        reason: err.to_string(),
    }
}
