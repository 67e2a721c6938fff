//! Project store: ordered records, aggregates, day queries and snapshots.
//!
//! # Invariants
//! - A failed `load()` leaves the in-memory collection untouched.
//! - Aggregates are recomputed on every call; nothing is cached.
//! - Log events carry counts and durations only, never record text.

use crate::model::project::{Project, ProjectId};
use crate::storage::{KvStorage, StorageError};
use chrono::{NaiveDate, TimeZone};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Key the snapshot is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "saved_projects";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    /// The collection could not be serialized.
    Encode(serde_json::Error),
    /// JSON has no representation for NaN or infinite budgets.
    NonFiniteBudget(ProjectId),
    /// The persisted snapshot is not a valid project list.
    Decode(serde_json::Error),
    NotFound(ProjectId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode project snapshot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode project snapshot: {err}"),
            Self::NonFiniteBudget(id) => {
                write!(f, "failed to encode project snapshot: budget of {id} is not finite")
            }
            Self::NotFound(id) => write!(f, "project not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::NonFiniteBudget(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// When mutations reach storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistPolicy {
    /// Callers decide when to call `save()`.
    #[default]
    Manual,
    /// Every successful mutation is followed by `save()`.
    Immediate,
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_key: String,
    pub persist_policy: PersistPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            persist_policy: PersistPolicy::Manual,
        }
    }
}

/// Outcome of a successful `load()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// A snapshot was found and replaced the collection.
    Restored { count: usize },
    /// Nothing stored under the key; the collection is now empty.
    NoSnapshot,
}

/// Dashboard aggregates at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreSummary {
    pub count: usize,
    pub completed_count: usize,
    pub total_budget: f64,
}

/// Ordered project collection persisted through `S`.
pub struct ProjectStore<S: KvStorage> {
    storage: S,
    config: StoreConfig,
    projects: Vec<Project>,
}

impl<S: KvStorage> ProjectStore<S> {
    /// Creates an empty store without touching storage.
    pub fn new(storage: S, config: StoreConfig) -> Self {
        Self {
            storage,
            config,
            projects: Vec::new(),
        }
    }

    /// Creates a store and loads the current snapshot.
    pub fn open(storage: S, config: StoreConfig) -> StoreResult<Self> {
        let mut store = Self::new(storage, config);
        store.load()?;
        Ok(store)
    }

    /// Replaces the collection with the persisted snapshot.
    ///
    /// # Errors
    /// - `Storage` when the backend read fails.
    /// - `Decode` when the snapshot is not a project list.
    ///
    /// On error the current collection is kept as-is.
    pub fn load(&mut self) -> StoreResult<LoadStatus> {
        let started_at = Instant::now();
        let raw = match self.storage.get(&self.config.storage_key) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error error_code=storage_read_failed duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };

        let Some(raw) = raw else {
            self.projects.clear();
            info!(
                "event=store_load module=store status=ok snapshot=missing count=0 duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(LoadStatus::NoSnapshot);
        };

        let projects: Vec<Project> = serde_json::from_str(&raw).map_err(|err| {
            error!(
                "event=store_load module=store status=error error_code=snapshot_decode_failed bytes={} duration_ms={} error={err}",
                raw.len(),
                started_at.elapsed().as_millis()
            );
            StoreError::Decode(err)
        })?;

        self.projects = projects;
        info!(
            "event=store_load module=store status=ok snapshot=found count={} duration_ms={}",
            self.projects.len(),
            started_at.elapsed().as_millis()
        );
        Ok(LoadStatus::Restored {
            count: self.projects.len(),
        })
    }

    /// Writes the full collection as one snapshot.
    ///
    /// # Errors
    /// - `NonFiniteBudget` when a budget is NaN or infinite; nothing is written.
    /// - `Encode` / `Storage` for serializer or backend failures.
    pub fn save(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        if let Some(project) = self.projects.iter().find(|p| !p.budget.is_finite()) {
            error!(
                "event=store_save module=store status=error error_code=non_finite_budget count={}",
                self.projects.len()
            );
            return Err(StoreError::NonFiniteBudget(project.id));
        }
        let raw = serde_json::to_string(&self.projects).map_err(|err| {
            error!(
                "event=store_save module=store status=error error_code=snapshot_encode_failed error={err}"
            );
            StoreError::Encode(err)
        })?;

        if let Err(err) = self.storage.put(&self.config.storage_key, &raw) {
            error!(
                "event=store_save module=store status=error error_code=storage_write_failed duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err.into());
        }

        info!(
            "event=store_save module=store status=ok count={} bytes={} duration_ms={}",
            self.projects.len(),
            raw.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Appends a project and returns its id.
    ///
    /// With `PersistPolicy::Immediate` a failed save is returned as an error,
    /// but the project stays in memory.
    pub fn add(&mut self, project: Project) -> StoreResult<ProjectId> {
        let id = project.id;
        self.projects.push(project);
        debug!("event=project_add module=store status=ok count={}", self.projects.len());
        self.persist_after_mutation()?;
        Ok(id)
    }

    /// Removes the first project with `id`.
    ///
    /// Returns `Ok(None)` without touching storage when no project matches.
    pub fn remove(&mut self, id: ProjectId) -> StoreResult<Option<Project>> {
        let Some(index) = self.position(id) else {
            debug!("event=project_remove module=store status=noop");
            return Ok(None);
        };

        let removed = self.projects.remove(index);
        debug!("event=project_remove module=store status=ok count={}", self.projects.len());
        self.persist_after_mutation()?;
        Ok(Some(removed))
    }

    /// Sets the completion flag of one project.
    pub fn set_completed(&mut self, id: ProjectId, completed: bool) -> StoreResult<()> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        self.projects[index].is_completed = completed;
        self.persist_after_mutation()
    }

    /// Replaces the stored record that has the same id as `project`.
    pub fn update(&mut self, project: Project) -> StoreResult<()> {
        let index = self
            .position(project.id)
            .ok_or(StoreError::NotFound(project.id))?;
        self.projects[index] = project;
        self.persist_after_mutation()
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id == id)
    }

    /// All projects in insertion order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn count(&self) -> usize {
        self.projects.len()
    }

    pub fn completed_count(&self) -> usize {
        self.projects
            .iter()
            .filter(|project| project.is_completed)
            .count()
    }

    pub fn total_budget(&self) -> f64 {
        self.projects.iter().map(|project| project.budget).sum()
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            count: self.count(),
            completed_count: self.completed_count(),
            total_budget: self.total_budget(),
        }
    }

    /// Projects that start, end, or are running on `day` (UTC calendar).
    pub fn projects_on(&self, day: NaiveDate) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|project| project.occurs_on(day))
            .collect()
    }

    /// Same as [`ProjectStore::projects_on`] in the calendar of `tz`.
    pub fn projects_on_in<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|project| project.occurs_on_in(day, tz))
            .collect()
    }

    /// Case-insensitive search over title, description and location.
    ///
    /// A blank query returns every project.
    pub fn search(&self, query: &str) -> Vec<&Project> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.projects.iter().collect();
        }
        self.projects
            .iter()
            .filter(|project| project.matches_lowercase(&needle))
            .collect()
    }

    fn position(&self, id: ProjectId) -> Option<usize> {
        self.projects.iter().position(|project| project.id == id)
    }

    fn persist_after_mutation(&self) -> StoreResult<()> {
        match self.config.persist_policy {
            PersistPolicy::Manual => Ok(()),
            PersistPolicy::Immediate => self.save(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistPolicy, ProjectStore, StoreConfig};
    use crate::model::project::Project;
    use crate::storage::{KvStorage, MemoryKvStorage, StorageError, StorageResult};
    use chrono::Utc;

    struct ReadOnlyStorage;

    impl KvStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn put(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("read-only".to_string()))
        }

        fn remove(&self, _key: &str) -> StorageResult<bool> {
            Ok(false)
        }
    }

    fn sample(title: &str) -> Project {
        let now = Utc::now();
        Project::new(title, "desc", "here", now, now, 10.0)
    }

    #[test]
    fn manual_policy_does_not_write_on_mutation() {
        let storage = MemoryKvStorage::new();
        let mut store = ProjectStore::new(&storage, StoreConfig::default());

        store.add(sample("a")).unwrap();

        assert!(storage.is_empty());
        store.save().unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn immediate_save_failure_keeps_memory_state() {
        let config = StoreConfig {
            persist_policy: PersistPolicy::Immediate,
            ..StoreConfig::default()
        };
        let mut store = ProjectStore::new(ReadOnlyStorage, config);

        let err = store.add(sample("a")).unwrap_err();

        assert!(err.to_string().contains("read-only"));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn search_blank_query_returns_all_in_order() {
        let mut store = ProjectStore::new(MemoryKvStorage::new(), StoreConfig::default());
        store.add(sample("first")).unwrap();
        store.add(sample("second")).unwrap();

        let titles: Vec<_> = store
            .search("   ")
            .into_iter()
            .map(|project| project.title.as_str())
            .collect();
        assert_eq!(titles, ["first", "second"]);
    }
}
