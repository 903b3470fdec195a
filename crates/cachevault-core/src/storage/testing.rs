//! Fault-injecting backend and recording logger shared by the facade and
//! validation tests.

use std::sync::{Arc, Mutex};

use super::backend::{BackendError, CacheBackend};
use crate::logging::CacheLogger;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub reads: usize,
    pub writes: usize,
    pub clears: usize,
    pub validation_instances: usize,
}

#[derive(Debug, Default, Clone)]
pub struct Faults {
    pub read: bool,
    pub write: bool,
    pub clear: bool,
    pub create: bool,
    /// Returned by every successful read instead of the stored bytes.
    pub read_returns: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    faults: Faults,
    check_faults: Faults,
    data: Arc<Mutex<Vec<u8>>>,
    calls: Arc<Mutex<Calls>>,
    last_check: Arc<Mutex<Option<ScriptedBackend>>>,
}

impl ScriptedBackend {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        Self {
            faults,
            ..Self::default()
        }
    }

    /// Healthy production instance whose validation instances misbehave.
    pub fn with_check_faults(check_faults: Faults) -> Self {
        Self {
            check_faults,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Calls {
        *self.calls.lock().expect("calls lock")
    }

    pub fn stored(&self) -> Vec<u8> {
        self.data.lock().expect("data lock").clone()
    }

    pub fn last_check(&self) -> Option<ScriptedBackend> {
        self.last_check.lock().expect("check lock").clone()
    }

    fn record(&self, update: impl FnOnce(&mut Calls)) {
        update(&mut self.calls.lock().expect("calls lock"));
    }
}

fn injected(operation: &str) -> BackendError {
    BackendError::Io {
        reason: format!("injected {operation} failure"),
    }
}

impl CacheBackend for ScriptedBackend {
    fn read(&self) -> Result<Vec<u8>, BackendError> {
        self.record(|calls| calls.reads += 1);
        if self.faults.read {
            return Err(injected("read"));
        }
        if let Some(bytes) = &self.faults.read_returns {
            return Ok(bytes.clone());
        }
        Ok(self.stored())
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        self.record(|calls| calls.writes += 1);
        if self.faults.write {
            return Err(injected("write"));
        }
        *self.data.lock().expect("data lock") = data.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<(), BackendError> {
        self.record(|calls| calls.clears += 1);
        if self.faults.clear {
            return Err(injected("clear"));
        }
        self.data.lock().expect("data lock").clear();
        Ok(())
    }

    fn create_for_persistence_validation(&self) -> Result<Self, BackendError> {
        self.record(|calls| calls.validation_instances += 1);
        if self.faults.create {
            return Err(injected("create"));
        }
        let check = Self::with_faults(self.check_faults.clone());
        *self.last_check.lock().expect("check lock") = Some(check.clone());
        Ok(check)
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Default, Clone)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<(Level, String)>>>,
}

impl RecordingLogger {
    pub fn errors(&self) -> Vec<String> {
        self.entries
            .lock()
            .expect("log lock")
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl CacheLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.entries
            .lock()
            .expect("log lock")
            .push((Level::Info, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.entries
            .lock()
            .expect("log lock")
            .push((Level::Error, message.to_string()));
    }
}
