//! Core abstractions for cachevault: the backend capability contract, storage
//! configuration, and the facade callers use to persist a credential cache.
//! Concrete platform backends live in `cachevault-storage`.

pub mod config;
pub mod logging;
pub mod storage;
