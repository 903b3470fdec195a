mod cli;
mod config;
mod storage;

use std::{
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

use crate::cli::ConfigCommand;
use cachevault_core::storage::{CacheBackend, CacheStorage};
use cachevault_storage::HostOs;
use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_path()?,
    };
    let config = config::load_from_path(&config_path)?;

    match cli.command {
        cli::Command::Info => print_info(&config)?,
        cli::Command::Verify => {
            let storage = storage::storage_from_config(&config)?;
            run_verify(&storage)?;
            println!("Persistence: ok ({})", storage.backend().describe());
        }
        cli::Command::Read { output } => {
            let storage = storage::storage_from_config(&config)?;
            match output {
                Some(path) => read_into(&storage, File::create(path)?)?,
                None => read_into(&storage, io::stdout().lock())?,
            };
        }
        cli::Command::Write { input } => {
            let storage = storage::storage_from_config(&config)?;
            match input {
                Some(path) => write_from(&storage, File::open(path)?)?,
                None => write_from(&storage, io::stdin().lock())?,
            };
        }
        cli::Command::Clear => storage::storage_from_config(&config)?.clear(),
        cli::Command::Config(ConfigCommand::Init) => init_config(&config, &config_path)?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info; logs go to stderr so
    // `read` output on stdout stays clean.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_info(config: &config::Config) -> Result<()> {
    let storage = storage::storage_from_config(config)?;
    println!("cachevault {}", env!("CARGO_PKG_VERSION"));
    println!("Platform: {}", HostOs::current());
    println!("Backend: {}", storage.backend().describe());
    println!(
        "Cache file: {}",
        storage.config().cache_file_path().display()
    );
    Ok(())
}

fn run_verify<B: CacheBackend>(storage: &CacheStorage<B>) -> Result<()> {
    storage
        .verify_persistence()
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))
}

/// Copy the cache to `writer`; returns the number of bytes written.
fn read_into<B: CacheBackend, W: Write>(
    storage: &CacheStorage<B>,
    mut writer: W,
) -> Result<usize> {
    let data = storage.read_data();
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(data.len())
}

/// Replace the cache with everything `reader` yields.
fn write_from<B: CacheBackend, R: Read>(
    storage: &CacheStorage<B>,
    mut reader: R,
) -> Result<usize> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    storage
        .write_data(Some(data.as_slice()))
        .map_err(|e| color_eyre::eyre::eyre!(e.to_string()))?;
    Ok(data.len())
}

fn init_config(config: &config::Config, path: &Path) -> Result<()> {
    let path = config::write_if_missing(config, path)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}
