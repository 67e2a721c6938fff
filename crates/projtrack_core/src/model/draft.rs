//! Creation-form input and its validation.
//!
//! # Responsibility
//! - Hold raw form input before it becomes a `Project`.
//! - Enforce the checks the store itself does not apply.
//!
//! # Invariants
//! - Unparsable budget text becomes `0.0`, never an error.
//! - A draft that passes `validate()` always yields a project whose end date
//!   is not before its start date.

use crate::model::project::Project;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw creation-form input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Free text as typed by the user.
    pub budget_text: String,
}

/// Form-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// A required text field is empty after trimming.
    MissingField(&'static str),
    /// End date precedes start date.
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} must not be empty"),
            Self::EndBeforeStart { start, end } => write!(
                f,
                "end_date ({}) must not be before start_date ({})",
                end.to_rfc3339(),
                start.to_rfc3339()
            ),
        }
    }
}

impl Error for DraftError {}

impl ProjectDraft {
    /// Checks required fields and date order.
    pub fn validate(&self) -> Result<(), DraftError> {
        for (name, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(DraftError::MissingField(name));
            }
        }

        if self.end_date < self.start_date {
            return Err(DraftError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }

        Ok(())
    }

    /// Validates and converts the draft into a new, open project.
    pub fn into_project(self) -> Result<Project, DraftError> {
        self.validate()?;
        let budget = parse_budget(&self.budget_text);
        Ok(Project::new(
            self.title.trim(),
            self.description.trim(),
            self.location.trim(),
            self.start_date,
            self.end_date,
            budget,
        ))
    }
}

/// Parses budget text, falling back to zero for anything that is not a
/// finite number.
pub fn parse_budget(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
