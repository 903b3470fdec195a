use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use thiserror::Error;

use super::validation::VALIDATION_SUFFIX;

/// Errors produced by backend implementations. The facade absorbs these for
/// read/write/clear; only persistence validation surfaces them, as a cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// File system or handle failure.
    #[error("i/o failure: {reason}")]
    Io { reason: String },
    /// Stored content exists but cannot be interpreted.
    #[error("corrupt storage: {reason}")]
    Corrupt { reason: String },
    /// Encryption or decryption failure.
    #[error("crypto failure: {reason}")]
    Crypto { reason: String },
    /// OS credential store (keychain, secret service) failure.
    #[error("keyring failure: {reason}")]
    Keyring { reason: String },
}

/// Capability contract every platform backend satisfies.
///
/// A backend stores exactly one blob at the location its identifiers name.
/// Calls are synchronous and each one is attempted exactly once; any
/// serialization between concurrent writers is whatever the native store
/// provides.
pub trait CacheBackend: Send + Sync {
    /// Fetch the stored bytes. A location that was never written yields an
    /// empty vector.
    fn read(&self) -> Result<Vec<u8>, BackendError>;

    /// Replace the stored bytes.
    fn write(&self, data: &[u8]) -> Result<(), BackendError>;

    /// Remove the stored bytes (idempotent).
    fn clear(&self) -> Result<(), BackendError>;

    /// Build a sibling instance bound to an isolated location so that
    /// validation traffic never touches real cached data.
    fn create_for_persistence_validation(&self) -> Result<Self, BackendError>
    where
        Self: Sized;

    /// Short description for diagnostics. Never includes stored content.
    fn describe(&self) -> String;
}

/// In-memory backend for tests and ephemeral sessions. Instances created via
/// [`CacheBackend::create_for_persistence_validation`] share the underlying
/// map but use their own slot.
/// Not cryptographically secure; values are only masked.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    slot: String,
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBackend {
    pub fn new(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            inner: Arc::default(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Whether any value is held for this instance's slot.
    pub fn is_populated(&self) -> Result<bool, BackendError> {
        let map = self.inner.lock().map_err(poisoned)?;
        Ok(map.contains_key(&self.slot))
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new("cache")
    }
}

impl CacheBackend for InMemoryBackend {
    fn read(&self) -> Result<Vec<u8>, BackendError> {
        let map = self.inner.lock().map_err(poisoned)?;
        Ok(map.get(&self.slot).map(|masked| unmask(masked)).unwrap_or_default())
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        let mut map = self.inner.lock().map_err(poisoned)?;

        // XOR is a placeholder to avoid holding plaintext.
        map.insert(self.slot.clone(), mask(data));
        Ok(())
    }

    fn clear(&self) -> Result<(), BackendError> {
        let mut map = self.inner.lock().map_err(poisoned)?;
        map.remove(&self.slot);
        Ok(())
    }

    fn create_for_persistence_validation(&self) -> Result<Self, BackendError> {
        Ok(Self {
            slot: format!("{}{VALIDATION_SUFFIX}", self.slot),
            inner: Arc::clone(&self.inner),
        })
    }

    fn describe(&self) -> String {
        format!("in-memory slot '{}'", self.slot)
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> BackendError {
    BackendError::Io {
        reason: format!("lock poisoned: {err}"),
    }
}

const MASK_BYTE: u8 = 0xA5;

fn mask(input: &[u8]) -> Vec<u8> {
    input.iter().map(|b| b ^ MASK_BYTE).collect()
}

fn unmask(input: &[u8]) -> Vec<u8> {
    mask(input) // XOR twice restores original.
}
