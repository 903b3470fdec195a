use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CLI surface over the credential cache storage.
#[derive(Parser, Debug)]
#[command(
    name = "cachevault",
    about = "OS-protected storage for a serialized credential cache",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the selected backend and cache location.
    Info,
    /// Check that the backend can round-trip data before trusting it.
    Verify,
    /// Print the cached bytes (raw) to stdout or a file.
    Read {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the cache with bytes from stdin or a file.
    Write {
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Remove the cache.
    Clear,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
