//! Concrete cache backends and platform selection.
//! The encrypted file uses AES-GCM with a data key held in the OS credential
//! store (or a test double); the keychain and secret-service backends store
//! the blob directly in the OS store via `keyring`.

mod file_io;
mod keyring_entry;

pub mod encrypted_file;
pub mod key_provider;
pub mod keychain;
pub mod secret_service;
pub mod selector;
pub mod unprotected_file;

pub use selector::{open_storage, select_backend, HostOs, PlatformBackend};
