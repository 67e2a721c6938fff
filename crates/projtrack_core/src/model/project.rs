//! Project domain model.
//!
//! # Responsibility
//! - Define the record shared by the dashboard, list and detail views.
//! - Answer the per-record calendar question used by day filtering.
//!
//! # Invariants
//! - `id` is generated once and never reassigned.
//! - `is_completed` starts as `false`.
//! - No ordering is enforced between `start_date` and `end_date`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a project record.
pub type ProjectId = Uuid;

/// One tracked unit of work with scheduling and budget metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Serialized as RFC 3339.
    pub start_date: DateTime<Utc>,
    /// Serialized as RFC 3339. May precede `start_date`.
    pub end_date: DateTime<Utc>,
    /// Non-negative by convention only.
    pub budget: f64,
    #[serde(default)]
    pub is_completed: bool,
}

impl Project {
    /// Creates an open project with a generated id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        budget: f64,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4(),
            title,
            description,
            location,
            start_date,
            end_date,
            budget,
        )
    }

    /// Creates a project with a caller-provided id.
    ///
    /// Used by import paths and tests that need deterministic identity.
    pub fn with_id(
        id: ProjectId,
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        budget: f64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            location: location.into(),
            start_date,
            end_date,
            budget,
            is_completed: false,
        }
    }

    /// Returns whether `day` is the start day, the end day, or a day strictly
    /// between them, using UTC calendar days.
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        self.occurs_on_in(day, &Utc)
    }

    /// Same rule as [`Project::occurs_on`], evaluated in the calendar of `tz`.
    ///
    /// A reversed range (end before start) still matches its two endpoint
    /// days, but no day in between.
    pub fn occurs_on_in<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> bool {
        let start_day = self.start_date.with_timezone(tz).date_naive();
        let end_day = self.end_date.with_timezone(tz).date_naive();

        day == start_day || day == end_day || (start_day < day && day < end_day)
    }

    /// Case-insensitive substring match on title, description and location.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.location]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
