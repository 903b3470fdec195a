use std::{path::PathBuf, sync::Arc};

use crate::config::Config;
use cachevault_core::{
    config::{StorageConfiguration, DEFAULT_COLLECTION},
    logging::TracingLogger,
    storage::CacheStorage,
};
use cachevault_storage::{open_storage, PlatformBackend};
use color_eyre::Result;
use dirs::data_dir;
use tracing::debug;

const DEFAULT_CACHE_FILE: &str = "cache.bin";
const DEFAULT_KEYCHAIN_SERVICE: &str = "cachevault";
const DEFAULT_KEYCHAIN_ACCOUNT: &str = "credential-cache";
const DEFAULT_SCHEMA_NAME: &str = "cachevault.cache";
const DEFAULT_LABEL: &str = "cachevault credential cache";

/// Resolve the default cache directory.
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("cachevault"))
}

/// Translate the user config into storage identifiers, filling defaults for
/// every platform so the same file works everywhere.
pub fn storage_configuration(config: &Config) -> Result<StorageConfiguration> {
    let cache_dir = match &config.cache_dir {
        Some(dir) => dir.clone(),
        None => default_cache_dir()?,
    };
    let cache_file = config.cache_file.as_deref().unwrap_or(DEFAULT_CACHE_FILE);
    debug!(?cache_dir, cache_file, "resolving storage configuration");

    let mut builder = StorageConfiguration::builder(cache_file, cache_dir);

    if let Some(key) = &config.file_key {
        builder = builder.with_file_key(key.service.clone(), key.account.clone());
    }

    builder = match &config.keychain {
        Some(entry) => builder.with_keychain(entry.service.clone(), entry.account.clone()),
        None => builder.with_keychain(DEFAULT_KEYCHAIN_SERVICE, DEFAULT_KEYCHAIN_ACCOUNT),
    };

    builder = match &config.keyring {
        Some(keyring) => {
            let collection = keyring.collection.as_deref().unwrap_or(DEFAULT_COLLECTION);
            let builder = builder.with_keyring(
                collection,
                keyring.schema_name.clone(),
                keyring.label.clone(),
            );
            keyring.attributes.iter().fold(builder, |builder, attr| {
                builder.with_keyring_attribute(attr.key.clone(), attr.value.clone())
            })
        }
        None => builder
            .with_keyring(DEFAULT_COLLECTION, DEFAULT_SCHEMA_NAME, DEFAULT_LABEL)
            .with_keyring_attribute("purpose", "credential-cache"),
    };

    if config.unprotected_file {
        builder = builder.with_unprotected_file();
    }

    builder
        .build()
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))
}

/// Build the facade for the running OS, logging through `tracing`.
pub fn storage_from_config(config: &Config) -> Result<CacheStorage<PlatformBackend>> {
    let storage_config = storage_configuration(config)?;
    open_storage(storage_config, Arc::new(TracingLogger))
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))
}
