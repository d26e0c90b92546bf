use crate::ChoreBoard;
use crate::chore_validation;
use crate::history::ScheduleHistory;
use crate::roster::Roster;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait BoardStore {
    fn save_board(&self, board: &ChoreBoard) -> PersistenceResult<()>;
    fn load_board(&self) -> PersistenceResult<Option<ChoreBoard>>;
}

pub fn validate_history(history: &ScheduleHistory) -> PersistenceResult<()> {
    for schedule in history.iter() {
        chore_validation::validate_schedule(schedule)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    }
    Ok(())
}

/// Frozen months may only name current roster members, in tasks and in
/// idle lists alike.
pub fn validate_assignees(history: &ScheduleHistory, roster: &Roster) -> PersistenceResult<()> {
    for schedule in history.iter() {
        for week in &schedule.weeks {
            let names = week
                .tasks
                .iter()
                .map(|task| task.assignee.as_str())
                .chain(week.idle.iter().map(String::as_str));
            for name in names {
                if !roster.contains(name) {
                    return Err(PersistenceError::InvalidData(format!(
                        "month {} week {} names '{}', who is not on the roster",
                        schedule.month_seed, week.week, name
                    )));
                }
            }
        }
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    BoardSnapshot, load_board_from_json, load_history_from_csv, save_board_to_json,
    save_history_to_csv,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBoardStore;
