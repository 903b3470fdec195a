use std::path::{Path, PathBuf};

use crate::storage::StorageError;

/// Collection alias that persists across login sessions.
pub const DEFAULT_COLLECTION: &str = "default";
/// Collection alias that is discarded when the login session ends.
pub const SESSION_COLLECTION: &str = "session";

const DEFAULT_FILE_KEY_SERVICE: &str = "cachevault";
const MAX_KEYRING_ATTRIBUTES: usize = 2;

/// Identifies an entry in the OS credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeychainIdentity {
    pub service: String,
    pub account: String,
}

/// Identifies a secret in a secret-service collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyringIdentity {
    pub collection: String,
    pub schema_name: String,
    pub label: String,
    /// At most two key/value pairs.
    pub attributes: Vec<(String, String)>,
}

/// Immutable description of where the credential cache lives on every
/// supported platform. Which parts are required depends on the backend
/// chosen for the running OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfiguration {
    cache_file_path: PathBuf,
    file_key: KeychainIdentity,
    keychain: Option<KeychainIdentity>,
    keyring: Option<KeyringIdentity>,
    use_unprotected_file: bool,
}

impl StorageConfiguration {
    pub fn builder(
        cache_file_name: impl Into<String>,
        cache_directory: impl Into<PathBuf>,
    ) -> StorageConfigurationBuilder {
        StorageConfigurationBuilder {
            cache_file_name: cache_file_name.into(),
            cache_directory: cache_directory.into(),
            file_key: None,
            keychain: None,
            keyring: None,
            keyring_attributes: Vec::new(),
            use_unprotected_file: false,
        }
    }

    /// Path of the cache file; also the storage identity for every backend.
    pub fn cache_file_path(&self) -> &Path {
        &self.cache_file_path
    }

    /// Credential-store entry holding the data key of the encrypted file.
    pub fn file_key(&self) -> &KeychainIdentity {
        &self.file_key
    }

    pub fn keychain(&self) -> Option<&KeychainIdentity> {
        self.keychain.as_ref()
    }

    pub fn keyring(&self) -> Option<&KeyringIdentity> {
        self.keyring.as_ref()
    }

    pub fn use_unprotected_file(&self) -> bool {
        self.use_unprotected_file
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfigurationBuilder {
    cache_file_name: String,
    cache_directory: PathBuf,
    file_key: Option<KeychainIdentity>,
    keychain: Option<KeychainIdentity>,
    keyring: Option<KeyringIdentity>,
    keyring_attributes: Vec<(String, String)>,
    use_unprotected_file: bool,
}

impl StorageConfigurationBuilder {
    /// Override the credential-store entry that protects the encrypted file.
    pub fn with_file_key(
        mut self,
        service: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        self.file_key = Some(KeychainIdentity {
            service: service.into(),
            account: account.into(),
        });
        self
    }

    pub fn with_keychain(
        mut self,
        service: impl Into<String>,
        account: impl Into<String>,
    ) -> Self {
        self.keychain = Some(KeychainIdentity {
            service: service.into(),
            account: account.into(),
        });
        self
    }

    /// Configure the secret-service secret. Attributes are added with
    /// [`Self::with_keyring_attribute`], before or after this call.
    pub fn with_keyring(
        mut self,
        collection: impl Into<String>,
        schema_name: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        self.keyring = Some(KeyringIdentity {
            collection: collection.into(),
            schema_name: schema_name.into(),
            label: label.into(),
            attributes: Vec::new(),
        });
        self
    }

    /// Add an attribute pair to the keyring secret. `build()` rejects
    /// attributes without a [`Self::with_keyring`] call.
    pub fn with_keyring_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.keyring_attributes.push((key.into(), value.into()));
        self
    }

    /// Store the cache as a plain file on every platform.
    pub fn with_unprotected_file(mut self) -> Self {
        self.use_unprotected_file = true;
        self
    }

    pub fn build(self) -> Result<StorageConfiguration, StorageError> {
        if self.cache_file_name.trim().is_empty() {
            return Err(StorageError::invalid_argument(
                "cache file name must not be empty",
            ));
        }

        let keyring = match self.keyring {
            Some(mut keyring) => {
                keyring.attributes = self.keyring_attributes;
                validate_keyring(&keyring)?;
                Some(keyring)
            }
            None if !self.keyring_attributes.is_empty() => {
                return Err(StorageError::invalid_argument(
                    "keyring attributes require a keyring collection, schema name and label",
                ));
            }
            None => None,
        };

        let file_key = self.file_key.unwrap_or_else(|| KeychainIdentity {
            service: DEFAULT_FILE_KEY_SERVICE.to_string(),
            account: self.cache_file_name.clone(),
        });

        Ok(StorageConfiguration {
            cache_file_path: self.cache_directory.join(&self.cache_file_name),
            file_key,
            keychain: self.keychain,
            keyring,
            use_unprotected_file: self.use_unprotected_file,
        })
    }
}

fn validate_keyring(keyring: &KeyringIdentity) -> Result<(), StorageError> {
    if keyring.attributes.len() > MAX_KEYRING_ATTRIBUTES {
        return Err(StorageError::invalid_argument(format!(
            "at most {MAX_KEYRING_ATTRIBUTES} keyring attributes are supported, got {}",
            keyring.attributes.len()
        )));
    }
    if keyring.collection.is_empty() || keyring.schema_name.is_empty() || keyring.label.is_empty()
    {
        return Err(StorageError::invalid_argument(
            "keyring collection, schema name and label must not be empty",
        ));
    }
    if keyring.attributes.iter().any(|(key, _)| key.is_empty()) {
        return Err(StorageError::invalid_argument(
            "keyring attribute keys must not be empty",
        ));
    }
    Ok(())
}
