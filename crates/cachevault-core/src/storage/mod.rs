//! Storage contract, facade, and persistence validation.

pub mod backend;
pub mod error;
pub mod facade;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BackendError, CacheBackend, InMemoryBackend};
pub use error::StorageError;
pub use facade::CacheStorage;
pub use validation::{PERSISTENCE_MARKER, VALIDATION_SUFFIX};
