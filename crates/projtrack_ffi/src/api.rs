//! FFI use-case API for the mobile UI.
//!
//! # Responsibility
//! - Expose project create/delete/complete/list/dashboard calls to Dart.
//! - Translate every core error into a response message.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Each call opens the snapshot file, applies one command and saves
//!   explicitly; no store instance outlives a call.
//! - Read-modify-write cycles are serialized by `STORE_LOCK`.
//! - An undecodable snapshot degrades to an empty store; the next successful
//!   mutation overwrites it.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use log::warn;
use projtrack_core::db::open_db;
use projtrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Project, ProjectDraft, ProjectId, ProjectStore, SqliteKvStorage, StoreConfig, StoreError,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const STORE_DB_FILE_NAME: &str = "projtrack_store.sqlite3";
const STORE_DB_PATH_ENV: &str = "PROJTRACK_DB_PATH";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

type FfiStore<'conn> = ProjectStore<SqliteKvStorage<'conn>>;

/// Health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Project row as rendered by list, detail and dashboard views.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_epoch_ms: i64,
    pub end_epoch_ms: i64,
    pub budget: f64,
    pub is_completed: bool,
}

/// Result envelope for mutating commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectActionResponse {
    pub ok: bool,
    /// Id of the affected project, when one exists.
    pub project_id: Option<String>,
    pub message: String,
}

impl ProjectActionResponse {
    fn success(message: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            ok: true,
            project_id: Some(project_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            project_id: None,
            message: message.into(),
        }
    }
}

/// Result envelope for list-shaped queries.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectListResponse {
    pub ok: bool,
    pub items: Vec<ProjectItem>,
    pub message: String,
}

impl ProjectListResponse {
    fn from_result(operation: &str, result: Result<Vec<ProjectItem>, String>) -> Self {
        match result {
            Ok(items) => Self {
                ok: true,
                message: format!("Found {} project(s).", items.len()),
                items,
            },
            Err(err) => Self {
                ok: false,
                items: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Dashboard aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummaryResponse {
    pub ok: bool,
    pub count: u32,
    pub completed_count: u32,
    pub total_budget: f64,
    pub message: String,
}

/// Creates a project from creation-form input.
///
/// Form rules apply: blank text fields and `end < start` are rejected;
/// unparsable budget text is stored as zero.
#[flutter_rust_bridge::frb(sync)]
pub fn project_create(
    title: String,
    description: String,
    location: String,
    start_epoch_ms: i64,
    end_epoch_ms: i64,
    budget_text: String,
) -> ProjectActionResponse {
    let (Some(start_date), Some(end_date)) =
        (epoch_ms_to_utc(start_epoch_ms), epoch_ms_to_utc(end_epoch_ms))
    else {
        return ProjectActionResponse::failure("project_create failed: date out of range");
    };
    let draft = ProjectDraft {
        title,
        description,
        location,
        start_date,
        end_date,
        budget_text,
    };
    let project = match draft.into_project() {
        Ok(project) => project,
        Err(err) => return ProjectActionResponse::failure(format!("project_create failed: {err}")),
    };

    match with_store_mut(|store| store.add(project).map_err(|err| err.to_string())) {
        Ok(id) => ProjectActionResponse::success("Project created.", id),
        Err(err) => ProjectActionResponse::failure(format!("project_create failed: {err}")),
    }
}

/// Deletes a project. Unknown ids succeed without changes.
#[flutter_rust_bridge::frb(sync)]
pub fn project_delete(project_id: String) -> ProjectActionResponse {
    let id = match parse_project_id(&project_id) {
        Ok(id) => id,
        Err(err) => return ProjectActionResponse::failure(format!("project_delete failed: {err}")),
    };

    match with_store_mut(|store| store.remove(id).map_err(|err| err.to_string())) {
        Ok(Some(_)) => ProjectActionResponse::success("Project deleted.", id),
        Ok(None) => ProjectActionResponse {
            ok: true,
            project_id: None,
            message: "Nothing to delete.".to_string(),
        },
        Err(err) => ProjectActionResponse::failure(format!("project_delete failed: {err}")),
    }
}

/// Marks a project completed or open again.
#[flutter_rust_bridge::frb(sync)]
pub fn project_set_completed(project_id: String, completed: bool) -> ProjectActionResponse {
    let id = match parse_project_id(&project_id) {
        Ok(id) => id,
        Err(err) => {
            return ProjectActionResponse::failure(format!("project_set_completed failed: {err}"))
        }
    };

    match with_store_mut(|store| {
        store
            .set_completed(id, completed)
            .map_err(|err| err.to_string())
    }) {
        Ok(()) => ProjectActionResponse::success("Project updated.", id),
        Err(err) => ProjectActionResponse::failure(format!("project_set_completed failed: {err}")),
    }
}

/// Lists projects matching `query` (all projects for a blank query).
#[flutter_rust_bridge::frb(sync)]
pub fn project_list(query: String) -> ProjectListResponse {
    let result = with_store(|store| store.search(&query).into_iter().map(to_item).collect());
    ProjectListResponse::from_result("project_list", result)
}

/// Lists projects running on a calendar day of the device's time zone.
///
/// `utc_offset_minutes` is the device offset east of UTC (e.g. `120` for
/// UTC+2, `-300` for UTC-5).
#[flutter_rust_bridge::frb(sync)]
pub fn projects_on_day(
    year: i32,
    month: u32,
    day: u32,
    utc_offset_minutes: i32,
) -> ProjectListResponse {
    let result = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {year:04}-{month:02}-{day:02}"))
        .and_then(|date| Ok((date, utc_offset(utc_offset_minutes)?)))
        .and_then(|(date, offset)| {
            with_store(|store| {
                store
                    .projects_on_in(date, &offset)
                    .into_iter()
                    .map(to_item)
                    .collect()
            })
        });
    ProjectListResponse::from_result("projects_on_day", result)
}

/// Count, completed count and budget total for the dashboard.
#[flutter_rust_bridge::frb(sync)]
pub fn dashboard_summary() -> DashboardSummaryResponse {
    match with_store(|store| store.summary()) {
        Ok(summary) => DashboardSummaryResponse {
            ok: true,
            count: saturating_u32(summary.count),
            completed_count: saturating_u32(summary.completed_count),
            total_budget: summary.total_budget,
            message: String::new(),
        },
        Err(err) => DashboardSummaryResponse {
            ok: false,
            count: 0,
            completed_count: 0,
            total_budget: 0.0,
            message: format!("dashboard_summary failed: {err}"),
        },
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DB_FILE_NAME)
        })
        .clone()
}

fn lock_store() -> std::sync::MutexGuard<'static, ()> {
    STORE_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=store_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

/// Runs a read-only query against the store file.
fn with_store<T>(f: impl FnOnce(&FfiStore<'_>) -> T) -> Result<T, String> {
    let _guard = lock_store();
    with_store_at(&resolve_store_db_path(), f)
}

/// Loads, applies one command and saves when the command succeeds.
fn with_store_mut<T>(
    f: impl FnOnce(&mut FfiStore<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = lock_store();
    with_store_mut_at(&resolve_store_db_path(), f)
}

fn with_store_at<T>(path: &Path, f: impl FnOnce(&FfiStore<'_>) -> T) -> Result<T, String> {
    let conn = open_db(path).map_err(|err| format!("store open failed: {err}"))?;
    let store = load_store(&conn)?;
    Ok(f(&store))
}

fn with_store_mut_at<T>(
    path: &Path,
    f: impl FnOnce(&mut FfiStore<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_db(path).map_err(|err| format!("store open failed: {err}"))?;
    let mut store = load_store(&conn)?;
    let value = f(&mut store)?;
    store
        .save()
        .map_err(|err| format!("store save failed: {err}"))?;
    Ok(value)
}

/// Loads the snapshot, falling back to an empty store when it cannot be
/// decoded. A failed `load` leaves the fresh store empty. Storage failures
/// are still reported.
fn load_store(conn: &Connection) -> Result<FfiStore<'_>, String> {
    let mut store = ProjectStore::new(SqliteKvStorage::new(conn), StoreConfig::default());
    match store.load() {
        Ok(_) => Ok(store),
        Err(StoreError::Decode(err)) => {
            warn!(
                "event=store_load module=ffi status=degraded error_code=snapshot_decode_failed error={err}"
            );
            Ok(store)
        }
        Err(err) => Err(format!("store load failed: {err}")),
    }
}

fn utc_offset(minutes: i32) -> Result<FixedOffset, String> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| format!("invalid utc offset {minutes} minutes"))
}

fn parse_project_id(raw: &str) -> Result<ProjectId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid project id `{}`", raw.trim()))
}

fn epoch_ms_to_utc(value: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(value).single()
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_item(project: &Project) -> ProjectItem {
    ProjectItem {
        id: project.id.to_string(),
        title: project.title.clone(),
        description: project.description.clone(),
        location: project.location.clone(),
        start_epoch_ms: project.start_date.timestamp_millis(),
        end_epoch_ms: project.end_date.timestamp_millis(),
        budget: project.budget,
        is_completed: project.is_completed,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, dashboard_summary, init_logging, ping, project_create, project_delete,
        project_list, project_set_completed, projects_on_day, with_store_at, with_store_mut_at,
    };
    use chrono::{TimeZone, Utc};
    use projtrack_core::db::open_db;
    use projtrack_core::{KvStorage, Project, SqliteKvStorage, DEFAULT_STORAGE_KEY};
    use std::time::{SystemTime, UNIX_EPOCH};

    // 2025-01-01T00:00:00Z and 2025-01-31T00:00:00Z.
    const JAN_1_MS: i64 = 1_735_689_600_000;
    const JAN_31_MS: i64 = 1_738_281_600_000;
    // 2024-12-31T22:00:00Z, local midnight of 2025-01-01 at UTC+2.
    const LOCAL_NEW_YEAR_MS: i64 = 1_735_682_400_000;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/projtrack-logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_then_list_and_complete() {
        let token = unique_token("site");
        let created = project_create(
            token.clone(),
            "Ground works".to_string(),
            "North yard".to_string(),
            JAN_1_MS,
            JAN_31_MS,
            "5000".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.project_id.expect("created project should return id");

        let listed = project_list(token.clone());
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].id, id);
        assert_eq!(listed.items[0].budget, 5000.0);
        assert!(!listed.items[0].is_completed);

        let updated = project_set_completed(id.clone(), true);
        assert!(updated.ok, "{}", updated.message);
        let listed = project_list(token);
        assert!(listed.items[0].is_completed);

        let mid_month = projects_on_day(2025, 1, 15, 0);
        assert!(mid_month.items.iter().any(|item| item.id == id));
        let after = projects_on_day(2025, 2, 1, 0);
        assert!(after.items.iter().all(|item| item.id != id));

        let summary = dashboard_summary();
        assert!(summary.ok, "{}", summary.message);
        assert!(summary.count >= 1);
        assert!(summary.completed_count >= 1);
        assert!(summary.total_budget >= 5000.0);
    }

    #[test]
    fn create_rejects_reversed_range_and_blank_title() {
        let reversed = project_create(
            "Backwards".to_string(),
            "d".to_string(),
            "l".to_string(),
            JAN_31_MS,
            JAN_1_MS,
            "1".to_string(),
        );
        assert!(!reversed.ok);
        assert!(reversed.message.contains("end_date"));

        let blank = project_create(
            "  ".to_string(),
            "d".to_string(),
            "l".to_string(),
            JAN_1_MS,
            JAN_1_MS,
            "1".to_string(),
        );
        assert!(!blank.ok);
        assert!(blank.message.contains("title"));
    }

    #[test]
    fn delete_removes_project_and_tolerates_unknown_ids() {
        let token = unique_token("delete");
        let created = project_create(
            token.clone(),
            "d".to_string(),
            "l".to_string(),
            JAN_1_MS,
            JAN_1_MS,
            "not a number".to_string(),
        );
        let id = created.project_id.expect("created project should return id");
        assert_eq!(project_list(token.clone()).items[0].budget, 0.0);

        let deleted = project_delete(id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        assert!(project_list(token).items.is_empty());

        let again = project_delete(id);
        assert!(again.ok);
        assert_eq!(again.project_id, None);
    }

    #[test]
    fn invalid_inputs_are_reported() {
        assert!(!project_delete("not-a-uuid".to_string()).ok);
        assert!(!project_set_completed("not-a-uuid".to_string(), true).ok);
        assert!(!projects_on_day(2025, 2, 30, 0).ok);
        assert!(!projects_on_day(2025, 1, 1, 24 * 60).ok);
        assert!(!projects_on_day(2025, 1, 1, i32::MAX).ok);
    }

    #[test]
    fn projects_on_day_uses_device_offset() {
        let token = unique_token("new-year");
        let created = project_create(
            token,
            "d".to_string(),
            "l".to_string(),
            LOCAL_NEW_YEAR_MS,
            LOCAL_NEW_YEAR_MS,
            "1".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let id = created.project_id.expect("created project should return id");
        let has = |response: super::ProjectListResponse| {
            assert!(response.ok, "{}", response.message);
            response.items.iter().any(|item| item.id == id)
        };

        assert!(has(projects_on_day(2025, 1, 1, 120)));
        assert!(!has(projects_on_day(2024, 12, 31, 120)));
        assert!(!has(projects_on_day(2025, 1, 1, 0)));
        assert!(has(projects_on_day(2024, 12, 31, 0)));
    }

    #[test]
    fn corrupt_snapshot_degrades_to_empty_store_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.sqlite3");
        {
            let conn = open_db(&path).unwrap();
            SqliteKvStorage::new(&conn)
                .put(DEFAULT_STORAGE_KEY, "{not json")
                .unwrap();
        }

        let count = with_store_at(&path, |store| store.count()).unwrap();
        assert_eq!(count, 0);

        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        with_store_mut_at(&path, |store| {
            store
                .add(Project::new("Site", "d", "l", start, start, 5000.0))
                .map_err(|err| err.to_string())
        })
        .unwrap();

        let summary = with_store_at(&path, |store| store.summary()).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_budget, 5000.0);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
