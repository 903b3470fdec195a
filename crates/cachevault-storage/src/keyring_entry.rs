//! Blob operations on a `keyring::Entry`, shared by the keychain and
//! secret-service backends.

use cachevault_core::storage::BackendError;
use keyring::Entry;

/// Stored secret, or an empty vector when the entry does not exist.
pub(crate) fn read_secret(entry: &Entry) -> Result<Vec<u8>, BackendError> {
    match entry.get_secret() {
        Ok(secret) => Ok(secret),
        Err(keyring::Error::NoEntry) => Ok(Vec::new()),
        Err(err) => Err(keyring_err(err)),
    }
}

pub(crate) fn write_secret(entry: &Entry, data: &[u8]) -> Result<(), BackendError> {
    entry.set_secret(data).map_err(keyring_err)
}

pub(crate) fn delete_secret(entry: &Entry) -> Result<(), BackendError> {
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => Err(keyring_err(err)),
    }
}

pub(crate) fn keyring_err(err: keyring::Error) -> BackendError {
    match err {
        keyring::Error::BadEncoding(_) => BackendError::Corrupt {
            reason: "stored secret has an unexpected encoding".to_string(),
        },
        other => BackendError::Keyring {
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_without_leaking_bytes() {
        let err = keyring_err(keyring::Error::BadEncoding(b"secret-bytes".to_vec()));
        assert!(matches!(err, BackendError::Corrupt { .. }));
        assert!(!err.to_string().contains("secret-bytes"));

        let err = keyring_err(keyring::Error::NoStorageAccess("locked".into()));
        assert!(matches!(err, BackendError::Keyring { .. }));
    }
}
