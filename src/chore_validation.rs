//! Caller-side checks for data arriving from files, the CLI or HTTP.
//!
//! The scheduler itself accepts any catalog and roster; these checks catch
//! records that are structurally wrong before they get that far.

use crate::chore::{Chore, ChoreCatalog};
use crate::schedule::{MonthlySchedule, WEEKS_PER_MONTH};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_chore(chore: &Chore) -> Result<(), ValidationError> {
    if chore.id.trim().is_empty() {
        return Err(ValidationError::new("chore id must not be blank"));
    }
    if chore.id.trim() != chore.id {
        return Err(ValidationError::new(format!(
            "chore id '{}' has leading or trailing whitespace",
            chore.id
        )));
    }
    if chore.title.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "chore '{}' requires a non-empty title",
            chore.id
        )));
    }
    Ok(())
}

/// Every entry must be valid and stored under its own id.
pub fn validate_catalog(catalog: &ChoreCatalog) -> Result<(), ValidationError> {
    for (key, chore) in catalog.entries() {
        if key != &chore.id {
            return Err(ValidationError::new(format!(
                "chore stored under '{}' has id '{}'",
                key, chore.id
            )));
        }
        validate_chore(chore)?;
    }
    Ok(())
}

/// Structural checks for a schedule loaded from storage.
pub fn validate_schedule(schedule: &MonthlySchedule) -> Result<(), ValidationError> {
    if schedule.weeks.len() != WEEKS_PER_MONTH {
        return Err(ValidationError::new(format!(
            "month {} has {} weeks (expected {})",
            schedule.month_seed,
            schedule.weeks.len(),
            WEEKS_PER_MONTH
        )));
    }
    let mut ids = HashSet::new();
    for (idx, week) in schedule.weeks.iter().enumerate() {
        if week.week != idx {
            return Err(ValidationError::new(format!(
                "month {} week #{} is labelled week {}",
                schedule.month_seed, idx, week.week
            )));
        }
        let mut assignees = HashSet::with_capacity(week.tasks.len());
        for task in &week.tasks {
            if task.assignee.trim().is_empty() || task.chore_id.trim().is_empty() {
                return Err(ValidationError::new(format!(
                    "task '{}' in month {} requires assignee and chore id",
                    task.id, schedule.month_seed
                )));
            }
            if !assignees.insert(task.assignee.as_str()) {
                return Err(ValidationError::new(format!(
                    "'{}' is booked twice in month {} week {}",
                    task.assignee, schedule.month_seed, idx
                )));
            }
            if !ids.insert(task.id.as_str()) {
                return Err(ValidationError::new(format!(
                    "duplicate task id '{}' in month {}",
                    task.id, schedule.month_seed
                )));
            }
        }
    }
    Ok(())
}
