use super::{PersistenceError, PersistenceResult};
use crate::ChoreBoard;
use crate::config::BoardConfig;
use crate::history::ScheduleHistory;
use crate::schedule::{MonthlySchedule, WEEKS_PER_MONTH};
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Everything needed to restore a board: its settings, the month being
/// viewed and the frozen months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub config: BoardConfig,
    #[serde(default)]
    pub month_offset: i64,
    #[serde(default)]
    pub history: ScheduleHistory,
}

impl BoardSnapshot {
    pub fn from_board(board: &ChoreBoard) -> Self {
        Self {
            config: board.config(),
            month_offset: board.month_offset(),
            history: board.history().clone(),
        }
    }

    pub fn into_board(self) -> PersistenceResult<ChoreBoard> {
        self.config
            .validate()
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        super::validate_history(&self.history)?;
        super::validate_assignees(&self.history, &self.config.roster)?;
        if self.month_offset < 0 {
            return Err(PersistenceError::InvalidData(format!(
                "month offset {} is before the reference month",
                self.month_offset
            )));
        }
        Ok(ChoreBoard::from_parts(
            self.config,
            self.history,
            self.month_offset,
        ))
    }
}

pub fn save_board_to_json<P: AsRef<Path>>(board: &ChoreBoard, path: P) -> PersistenceResult<()> {
    let snapshot = BoardSnapshot::from_board(board);
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_board_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ChoreBoard> {
    let file = File::open(path)?;
    let snapshot: BoardSnapshot = serde_json::from_reader(file)?;
    snapshot.into_board()
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryCsvRecord {
    month: i64,
    week: usize,
    task_id: String,
    chore_id: String,
    assignee: String,
}

/// Write every frozen task as one CSV row, months and weeks in order.
pub fn save_history_to_csv<P: AsRef<Path>>(
    history: &ScheduleHistory,
    path: P,
) -> PersistenceResult<()> {
    super::validate_history(history)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for schedule in history.iter() {
        for week in &schedule.weeks {
            for task in &week.tasks {
                writer.serialize(HistoryCsvRecord {
                    month: schedule.month_seed,
                    week: week.week,
                    task_id: task.id.clone(),
                    chore_id: task.chore_id.clone(),
                    assignee: task.assignee.clone(),
                })?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read frozen months back from CSV. Dropped and idle lists are not part of
/// the CSV layout and come back empty.
pub fn load_history_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ScheduleHistory> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut months: BTreeMap<i64, MonthlySchedule> = BTreeMap::new();
    for record in reader.deserialize::<HistoryCsvRecord>() {
        let record = record?;
        if record.week >= WEEKS_PER_MONTH {
            return Err(PersistenceError::InvalidData(format!(
                "task '{}' has week {} (months have {} weeks)",
                record.task_id, record.week, WEEKS_PER_MONTH
            )));
        }
        let schedule = months
            .entry(record.month)
            .or_insert_with(|| MonthlySchedule::empty(record.month));
        schedule.weeks[record.week].tasks.push(Task::new(
            record.task_id,
            record.chore_id,
            record.assignee,
        ));
    }

    let mut history = ScheduleHistory::new();
    for schedule in months.into_values() {
        history.freeze(schedule);
    }
    super::validate_history(&history)?;
    Ok(history)
}
