use std::collections::HashMap;

use cachevault_core::{
    config::KeyringIdentity,
    storage::{BackendError, CacheBackend, VALIDATION_SUFFIX},
};
use keyring::Entry;
use tracing::instrument;

use crate::keyring_entry;

/// Stores the blob in a secret-service collection reached over D-Bus.
///
/// The collection is the entry target and the schema name its service. The
/// label and attribute pairs together form the entry user, so two caches that
/// differ in any of them never share a secret. The attribute pairs are also
/// set on the stored item after every write. The daemon decides how
/// concurrent writers are ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretServiceBackend {
    identity: KeyringIdentity,
}

impl SecretServiceBackend {
    pub fn new(identity: KeyringIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &KeyringIdentity {
        &self.identity
    }

    /// Entry user composed from label and attributes, e.g.
    /// `My cache;version=1;product=app`.
    pub fn entry_user(&self) -> String {
        let mut user = self.identity.label.clone();
        for (key, value) in &self.identity.attributes {
            user.push(';');
            user.push_str(key);
            user.push('=');
            user.push_str(value);
        }
        user
    }

    /// Configured attribute pairs as set on the secret-service item.
    pub fn attribute_map(&self) -> HashMap<&str, &str> {
        self.identity
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    fn entry(&self) -> Result<Entry, BackendError> {
        Entry::new_with_target(
            &self.identity.collection,
            &self.identity.schema_name,
            &self.entry_user(),
        )
        .map_err(keyring_entry::keyring_err)
    }
}

impl CacheBackend for SecretServiceBackend {
    #[instrument(
        skip_all,
        fields(collection = %self.identity.collection, schema = %self.identity.schema_name)
    )]
    fn read(&self) -> Result<Vec<u8>, BackendError> {
        keyring_entry::read_secret(&self.entry()?)
    }

    #[instrument(
        skip_all,
        fields(collection = %self.identity.collection, schema = %self.identity.schema_name)
    )]
    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        let entry = self.entry()?;
        keyring_entry::write_secret(&entry, data)?;
        let attributes = self.attribute_map();
        if attributes.is_empty() {
            return Ok(());
        }
        entry
            .update_attributes(&attributes)
            .map_err(keyring_entry::keyring_err)
    }

    #[instrument(
        skip_all,
        fields(collection = %self.identity.collection, schema = %self.identity.schema_name)
    )]
    fn clear(&self) -> Result<(), BackendError> {
        keyring_entry::delete_secret(&self.entry()?)
    }

    /// Same collection and schema; label and attribute values get the
    /// validation suffix.
    fn create_for_persistence_validation(&self) -> Result<Self, BackendError> {
        let identity = KeyringIdentity {
            collection: self.identity.collection.clone(),
            schema_name: self.identity.schema_name.clone(),
            label: format!("{}{VALIDATION_SUFFIX}", self.identity.label),
            attributes: self
                .identity
                .attributes
                .iter()
                .map(|(key, value)| (key.clone(), format!("{value}{VALIDATION_SUFFIX}")))
                .collect(),
        };
        Ok(Self::new(identity))
    }

    fn describe(&self) -> String {
        format!(
            "secret-service secret '{}' in collection '{}'",
            self.identity.label, self.identity.collection
        )
    }
}
