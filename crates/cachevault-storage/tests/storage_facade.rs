use std::{path::Path, sync::Arc};

use cachevault_core::{
    config::StorageConfiguration,
    logging::NullLogger,
    storage::{CacheBackend, CacheStorage, StorageError, PERSISTENCE_MARKER},
};
use cachevault_storage::{
    encrypted_file::EncryptedFileBackend, key_provider::InMemoryKeyProvider, select_backend,
    unprotected_file::UnprotectedFileBackend, HostOs, PlatformBackend,
};

fn config(dir: &Path) -> StorageConfiguration {
    StorageConfiguration::builder("cache.bin", dir)
        .build()
        .expect("config")
}

fn encrypted_storage(dir: &Path) -> CacheStorage<EncryptedFileBackend<InMemoryKeyProvider>> {
    let config = config(dir);
    let backend =
        EncryptedFileBackend::new(config.cache_file_path(), InMemoryKeyProvider::default());
    CacheStorage::new(config, backend, Arc::new(NullLogger))
}

#[test]
fn encrypted_file_round_trips_through_the_facade() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = encrypted_storage(dir.path());

    assert!(storage.read_data().is_empty(), "fresh cache is empty");

    let payloads: [&[u8]; 3] = [b"{\"tokens\":[]}", b"", &[0u8, 1, 2, 255]];
    for payload in payloads {
        storage.write_data(Some(payload)).expect("write");
        assert_eq!(storage.read_data(), payload);
    }

    storage.clear();
    storage.clear();
    assert!(storage.read_data().is_empty());
    assert!(!storage.config().cache_file_path().exists());
}

#[test]
fn corrupt_cache_file_is_discarded_on_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = encrypted_storage(dir.path());
    let path = storage.config().cache_file_path().to_path_buf();
    std::fs::write(&path, b"{\"nonce\":\"???\"").expect("seed corrupt file");

    assert!(storage.read_data().is_empty());
    assert!(!path.exists(), "unreadable cache is removed");

    storage.write_data(Some(b"fresh")).expect("write");
    assert_eq!(storage.read_data(), b"fresh");
}

#[test]
fn verify_persistence_cleans_up_and_spares_the_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = encrypted_storage(dir.path());
    storage.write_data(Some(b"real cache")).expect("write");

    storage.verify_persistence().expect("healthy file backend");

    let check = storage
        .backend()
        .create_for_persistence_validation()
        .expect("validation instance");
    assert!(!check.path().exists(), "validation file removed");
    assert!(check.read().expect("read").is_empty());
    assert_eq!(storage.read_data(), b"real cache");
}

#[test]
fn verify_persistence_reports_unwritable_location() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A regular file where the cache directory should be makes every write fail.
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, b"").expect("blocker");
    let config = config(&blocker);
    let backend = UnprotectedFileBackend::new(config.cache_file_path());
    let storage = CacheStorage::new(config, backend, Arc::new(NullLogger));

    storage
        .write_data(Some(b"ignored"))
        .expect("write failures stay silent");
    assert!(storage.read_data().is_empty());

    let err = storage.verify_persistence().expect_err("write should fail");
    match err {
        StorageError::PersistenceCheckFailed { reason, source } => {
            assert!(reason.contains("writing the marker"), "{reason}");
            assert!(source.is_some());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn selected_unprotected_backend_passes_verification() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = StorageConfiguration::builder("cache.bin", dir.path())
        .with_unprotected_file()
        .build()
        .expect("config");
    let backend = select_backend(&config, HostOs::current()).expect("select");
    assert!(matches!(backend, PlatformBackend::UnprotectedFile(_)));

    let storage = CacheStorage::new(config, backend, Arc::new(NullLogger));
    storage.verify_persistence().expect("verify");
    storage.write_data(Some(PERSISTENCE_MARKER.as_bytes())).expect("write");
    assert_eq!(
        std::fs::read(storage.config().cache_file_path()).expect("plain file"),
        PERSISTENCE_MARKER.as_bytes()
    );
    assert!(storage.has_changed());
}
