//! Core domain logic for ProjTrack.
//! This crate owns the project store that the mobile UI reads and mutates.

pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::draft::{parse_budget, DraftError, ProjectDraft};
pub use model::project::{Project, ProjectId};
pub use storage::{KvStorage, MemoryKvStorage, SqliteKvStorage, StorageError, StorageResult};
pub use store::{
    LoadStatus, PersistPolicy, ProjectStore, StoreConfig, StoreError, StoreResult, StoreSummary,
    DEFAULT_STORAGE_KEY,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
