use cachevault_core::{
    config::KeychainIdentity,
    storage::{BackendError, CacheBackend, VALIDATION_SUFFIX},
};
use keyring::Entry;
use tracing::instrument;

use crate::keyring_entry;

/// Stores the blob as a generic password item in the system keychain,
/// addressed by service and account. A fresh entry handle is opened for each
/// operation; the keychain serializes concurrent writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeychainBackend {
    service: String,
    account: String,
}

impl KeychainBackend {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    pub fn from_identity(identity: &KeychainIdentity) -> Self {
        Self::new(identity.service.clone(), identity.account.clone())
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<Entry, BackendError> {
        Entry::new(&self.service, &self.account).map_err(keyring_entry::keyring_err)
    }
}

impl CacheBackend for KeychainBackend {
    #[instrument(skip_all, fields(service = %self.service, account = %self.account))]
    fn read(&self) -> Result<Vec<u8>, BackendError> {
        keyring_entry::read_secret(&self.entry()?)
    }

    #[instrument(skip_all, fields(service = %self.service, account = %self.account))]
    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        keyring_entry::write_secret(&self.entry()?, data)
    }

    #[instrument(skip_all, fields(service = %self.service, account = %self.account))]
    fn clear(&self) -> Result<(), BackendError> {
        keyring_entry::delete_secret(&self.entry()?)
    }

    fn create_for_persistence_validation(&self) -> Result<Self, BackendError> {
        Ok(Self::new(
            format!("{}{VALIDATION_SUFFIX}", self.service),
            format!("{}{VALIDATION_SUFFIX}", self.account),
        ))
    }

    fn describe(&self) -> String {
        format!("keychain item {}/{}", self.service, self.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_instance_has_distinct_identity() {
        let production = KeychainBackend::new("cachevault", "credential-cache");
        let check = production
            .create_for_persistence_validation()
            .expect("validation instance");

        assert_eq!(check.service(), "cachevault.persistence-check");
        assert_eq!(check.account(), "credential-cache.persistence-check");
        assert_ne!(check, production);
    }

    #[test]
    fn description_names_the_item() {
        let backend = KeychainBackend::from_identity(&KeychainIdentity {
            service: "svc".into(),
            account: "acct".into(),
        });
        assert_eq!(backend.describe(), "keychain item svc/acct");
    }
}
