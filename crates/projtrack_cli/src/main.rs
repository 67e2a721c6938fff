//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `projtrack_core` linkage with deterministic output.
//! - Optionally print the dashboard summary of a store file:
//!   `projtrack_cli [path/to/store.sqlite3]`.

use projtrack_core::db::open_db;
use projtrack_core::{LoadStatus, ProjectStore, SqliteKvStorage, StoreConfig};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("projtrack_core ping={}", projtrack_core::ping());
    println!("projtrack_core version={}", projtrack_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match print_summary(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("store={path} error={err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !Path::new(path).is_file() {
        return Err(format!("no store file at `{path}`").into());
    }
    let conn = open_db(path)?;
    let mut store = ProjectStore::new(SqliteKvStorage::new(&conn), StoreConfig::default());
    let snapshot = match store.load()? {
        LoadStatus::Restored { .. } => "found",
        LoadStatus::NoSnapshot => "missing",
    };
    let summary = store.summary();
    println!(
        "store={path} snapshot={snapshot} count={} completed={} total_budget={:.2}",
        summary.count, summary.completed_count, summary.total_budget
    );
    Ok(())
}
