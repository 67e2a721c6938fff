//! In-memory project collection with explicit snapshot persistence.
//!
//! # Responsibility
//! - Own the ordered project list and its derived aggregates.
//! - Round-trip the list through a `KvStorage` as one JSON snapshot.
//!
//! # Invariants
//! - Insertion order is preserved across save/load.
//! - Persistence happens only in `save()` unless `PersistPolicy::Immediate`
//!   is configured.

pub mod project_store;

pub use project_store::{
    LoadStatus, PersistPolicy, ProjectStore, StoreConfig, StoreError, StoreResult, StoreSummary,
    DEFAULT_STORAGE_KEY,
};
