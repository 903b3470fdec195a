use std::path::{Path, PathBuf};

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use cachevault_core::storage::{BackendError, CacheBackend, VALIDATION_SUFFIX};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    file_io,
    key_provider::{KeyError, KeyMaterial, KeyProvider},
};

/// AES-GCM encrypted single-file backend. The data key belongs to the
/// current OS user through a `KeyProvider` (OS credential store in
/// production). Writes replace the file atomically; concurrent writers are
/// last-write-wins.
#[derive(Debug, Clone)]
pub struct EncryptedFileBackend<P: KeyProvider + Clone> {
    path: PathBuf,
    key_provider: P,
}

impl<P: KeyProvider + Clone> EncryptedFileBackend<P> {
    pub fn new(path: impl Into<PathBuf>, key_provider: P) -> Self {
        Self {
            path: path.into(),
            key_provider,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cipher(&self) -> Result<Aes256Gcm, BackendError> {
        let material = self.key_provider.get_or_create().map_err(key_err)?;
        build_cipher(&material)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredBlob {
    nonce: String,
    ciphertext: String,
}

impl<P: KeyProvider + Clone> CacheBackend for EncryptedFileBackend<P> {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn read(&self) -> Result<Vec<u8>, BackendError> {
        let Some(raw) = file_io::read_if_exists(&self.path)? else {
            debug!("cache file absent");
            return Ok(Vec::new());
        };
        let blob: StoredBlob = serde_json::from_slice(&raw).map_err(corrupt)?;

        let nonce_bytes = URL_SAFE_NO_PAD.decode(blob.nonce).map_err(|e| BackendError::Corrupt {
            reason: format!("nonce decode failed: {e}"),
        })?;
        if nonce_bytes.len() != 12 {
            return Err(BackendError::Corrupt {
                reason: format!("expected 12 byte nonce, got {}", nonce_bytes.len()),
            });
        }
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext =
            URL_SAFE_NO_PAD
                .decode(blob.ciphertext)
                .map_err(|e| BackendError::Corrupt {
                    reason: format!("ciphertext decode failed: {e}"),
                })?;

        self.cipher()?
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|e| BackendError::Crypto {
                reason: format!("decrypt failed: {e}"),
            })
    }

    #[instrument(skip_all, fields(path = %self.path.display(), len = data.len()))]
    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        let cipher = self.cipher()?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, data)
            .map_err(|e| BackendError::Crypto {
                reason: format!("encrypt failed: {e}"),
            })?;

        let blob = StoredBlob {
            nonce: URL_SAFE_NO_PAD.encode(nonce.as_slice()),
            ciphertext: URL_SAFE_NO_PAD.encode(ciphertext),
        };
        let json = serde_json::to_vec(&blob).map_err(file_io::io_err)?;
        file_io::write_atomic(&self.path, &json)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn clear(&self) -> Result<(), BackendError> {
        file_io::remove_if_exists(&self.path)
    }

    /// Sibling file next to the cache, sealed with the same user key.
    fn create_for_persistence_validation(&self) -> Result<Self, BackendError> {
        Ok(Self {
            path: file_io::with_suffix(&self.path, VALIDATION_SUFFIX),
            key_provider: self.key_provider.clone(),
        })
    }

    fn describe(&self) -> String {
        format!("encrypted file {}", self.path.display())
    }
}

fn build_cipher(material: &KeyMaterial) -> Result<Aes256Gcm, BackendError> {
    Aes256Gcm::new_from_slice(&material.bytes).map_err(|e| BackendError::Crypto {
        reason: format!("cipher init failed: {e}"),
    })
}

fn key_err(err: KeyError) -> BackendError {
    match err {
        KeyError::Decode(reason) => BackendError::Corrupt {
            reason: format!("stored key: {reason}"),
        },
        other => BackendError::Keyring {
            reason: format!("key provider: {other}"),
        },
    }
}

fn corrupt<E: ToString>(err: E) -> BackendError {
    BackendError::Corrupt {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_provider::InMemoryKeyProvider;

    fn backend(dir: &Path) -> EncryptedFileBackend<InMemoryKeyProvider> {
        EncryptedFileBackend::new(dir.join("cache.bin"), InMemoryKeyProvider::default())
    }

    #[test]
    fn round_trip_encrypts_and_decrypts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend(dir.path());

        backend.write(b"hello-cachevault").expect("write");
        let decrypted = backend.read().expect("read");
        assert_eq!(decrypted, b"hello-cachevault");

        // ensure plaintext is not present on disk
        let stored = std::fs::read_to_string(backend.path()).expect("read ciphertext");
        assert!(
            !stored.contains("hello-cachevault"),
            "plaintext must not be stored"
        );
    }

    #[test]
    fn empty_payload_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend(dir.path());

        backend.write(b"").expect("write");
        assert!(backend.path().exists());
        assert!(backend.read().expect("read").is_empty());
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(backend(dir.path()).read().expect("read").is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend(dir.path());
        backend.write(b"v").expect("write");
        backend.clear().expect("clear");
        backend.clear().expect("clear again");

        assert!(!backend.path().exists());
        assert!(backend.read().expect("read").is_empty());
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend(dir.path());
        std::fs::write(backend.path(), b"not json").expect("seed garbage");

        let err = backend.read().expect_err("garbage should fail");
        assert!(matches!(err, BackendError::Corrupt { .. }));
    }

    #[test]
    fn foreign_key_fails_to_decrypt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.bin");
        EncryptedFileBackend::new(&path, InMemoryKeyProvider::default())
            .write(b"secret")
            .expect("write");

        let err = EncryptedFileBackend::new(&path, InMemoryKeyProvider::default())
            .read()
            .expect_err("other key should fail");
        assert!(matches!(err, BackendError::Crypto { .. }));
    }

    #[test]
    fn validation_instance_uses_sibling_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let production = backend(dir.path());
        production.write(b"real").expect("write");

        let check = production
            .create_for_persistence_validation()
            .expect("validation instance");
        assert_eq!(
            check.path(),
            dir.path().join("cache.bin.persistence-check").as_path()
        );
        check.write(b"marker").expect("check write");
        assert_eq!(check.read().expect("check read"), b"marker");
        check.clear().expect("check clear");

        assert_eq!(production.read().expect("read"), b"real");
    }
}
