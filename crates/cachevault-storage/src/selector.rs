use std::{fmt, sync::Arc};

use cachevault_core::{
    config::StorageConfiguration,
    logging::CacheLogger,
    storage::{BackendError, CacheBackend, CacheStorage, StorageError},
};
use tracing::debug;

use crate::{
    encrypted_file::EncryptedFileBackend, key_provider::KeyringProvider,
    keychain::KeychainBackend, secret_service::SecretServiceBackend,
    unprotected_file::UnprotectedFileBackend,
};

/// Operating system the process runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    Other(String),
}

impl HostOs {
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` style name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => f.write_str("windows"),
            Self::MacOs => f.write_str("macos"),
            Self::Linux => f.write_str("linux"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// The one backend active for this process.
#[derive(Debug, Clone)]
pub enum PlatformBackend {
    EncryptedFile(EncryptedFileBackend<KeyringProvider>),
    Keychain(KeychainBackend),
    SecretService(SecretServiceBackend),
    UnprotectedFile(UnprotectedFileBackend),
}

impl CacheBackend for PlatformBackend {
    fn read(&self) -> Result<Vec<u8>, BackendError> {
        match self {
            Self::EncryptedFile(backend) => backend.read(),
            Self::Keychain(backend) => backend.read(),
            Self::SecretService(backend) => backend.read(),
            Self::UnprotectedFile(backend) => backend.read(),
        }
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        match self {
            Self::EncryptedFile(backend) => backend.write(data),
            Self::Keychain(backend) => backend.write(data),
            Self::SecretService(backend) => backend.write(data),
            Self::UnprotectedFile(backend) => backend.write(data),
        }
    }

    fn clear(&self) -> Result<(), BackendError> {
        match self {
            Self::EncryptedFile(backend) => backend.clear(),
            Self::Keychain(backend) => backend.clear(),
            Self::SecretService(backend) => backend.clear(),
            Self::UnprotectedFile(backend) => backend.clear(),
        }
    }

    fn create_for_persistence_validation(&self) -> Result<Self, BackendError> {
        Ok(match self {
            Self::EncryptedFile(backend) => {
                Self::EncryptedFile(backend.create_for_persistence_validation()?)
            }
            Self::Keychain(backend) => Self::Keychain(backend.create_for_persistence_validation()?),
            Self::SecretService(backend) => {
                Self::SecretService(backend.create_for_persistence_validation()?)
            }
            Self::UnprotectedFile(backend) => {
                Self::UnprotectedFile(backend.create_for_persistence_validation()?)
            }
        })
    }

    fn describe(&self) -> String {
        match self {
            Self::EncryptedFile(backend) => backend.describe(),
            Self::Keychain(backend) => backend.describe(),
            Self::SecretService(backend) => backend.describe(),
            Self::UnprotectedFile(backend) => backend.describe(),
        }
    }
}

/// Pick the backend for `os` from the fields of `config` that platform
/// needs. Performs no I/O.
pub fn select_backend(
    config: &StorageConfiguration,
    os: HostOs,
) -> Result<PlatformBackend, StorageError> {
    if config.use_unprotected_file() {
        return Ok(PlatformBackend::UnprotectedFile(UnprotectedFileBackend::new(
            config.cache_file_path(),
        )));
    }

    match os {
        HostOs::Windows => {
            let key = config.file_key();
            Ok(PlatformBackend::EncryptedFile(EncryptedFileBackend::new(
                config.cache_file_path(),
                KeyringProvider::new(key.service.clone(), key.account.clone()),
            )))
        }
        HostOs::MacOs => {
            let identity = config.keychain().ok_or_else(|| {
                StorageError::invalid_argument("keychain service and account are required on macos")
            })?;
            Ok(PlatformBackend::Keychain(KeychainBackend::from_identity(identity)))
        }
        HostOs::Linux => {
            let identity = config.keyring().ok_or_else(|| {
                StorageError::invalid_argument(
                    "keyring collection, schema name and label are required on linux",
                )
            })?;
            Ok(PlatformBackend::SecretService(SecretServiceBackend::new(
                identity.clone(),
            )))
        }
        HostOs::Other(os) => Err(StorageError::UnsupportedPlatform { os }),
    }
}

/// Build the facade for the running OS.
pub fn open_storage(
    config: StorageConfiguration,
    logger: Arc<dyn CacheLogger>,
) -> Result<CacheStorage<PlatformBackend>, StorageError> {
    let os = HostOs::current();
    let backend = select_backend(&config, os.clone())?;
    debug!(%os, backend = %backend.describe(), "selected cache backend");
    Ok(CacheStorage::new(config, backend, logger))
}
