//! Logger collaborator injected into the storage facade.

use tracing::{error, info};

/// Sink for the facade's diagnostic messages. Implementations may discard
/// everything; the facade never depends on a message being delivered.
pub trait CacheLogger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards messages to `tracing` under the `cachevault` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl CacheLogger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "cachevault", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "cachevault", "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl CacheLogger for NullLogger {
    fn info(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}
