//! Stateful owner of a roster, a chore catalog and the months being viewed.
//!
//! The board never stores computed schedules unless a month is frozen; every
//! other month is rebuilt from the current roster and catalog on request, so
//! edits show up immediately without bookkeeping.

use crate::calendar::MonthCalendar;
use crate::chore::{Chore, ChoreCatalog, ChoreUpdate};
use crate::chore_validation::{self, ValidationError};
use crate::config::BoardConfig;
use crate::defaults;
use crate::history::{OrphanPolicy, ScheduleHistory};
use crate::roster::{Roster, RosterError};
use crate::schedule::{MonthlySchedule, ScheduleOptions, build_monthly_schedule_with};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("chore '{0}' already exists")]
    DuplicateChore(String),
    #[error("chore '{0}' not found")]
    UnknownChore(String),
    #[error("invalid chore: {0}")]
    InvalidChore(#[from] ValidationError),
    #[error("cannot go before the reference month")]
    BeforeReferenceMonth,
    #[error("month {0} is out of range")]
    MonthOutOfRange(i64),
}

#[derive(Debug, Clone)]
pub struct ChoreBoard {
    roster: Roster,
    chores: ChoreCatalog,
    options: ScheduleOptions,
    orphan_policy: OrphanPolicy,
    calendar: MonthCalendar,
    history: ScheduleHistory,
    completions: BTreeMap<String, u32>,
    month_offset: i64,
}

impl Default for ChoreBoard {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl ChoreBoard {
    pub fn new(config: BoardConfig) -> Self {
        let calendar = config.calendar();
        Self {
            roster: config.roster,
            chores: config.chores,
            options: config.options,
            orphan_policy: config.orphan_policy,
            calendar,
            history: ScheduleHistory::new(),
            completions: config.completions,
            month_offset: 0,
        }
    }

    pub(crate) fn from_parts(
        config: BoardConfig,
        history: ScheduleHistory,
        month_offset: i64,
    ) -> Self {
        let mut board = Self::new(config);
        board.history = history;
        board.month_offset = month_offset.max(0);
        board
    }

    /// Current settings as a config, with the reference month pinned.
    pub fn config(&self) -> BoardConfig {
        BoardConfig {
            roster: self.roster.clone(),
            chores: self.chores.clone(),
            options: self.options,
            reference_month: Some(self.calendar.reference_month()),
            rotation_day: self.calendar.rotation_day(),
            skip_dates: self.calendar.skip_dates().copied().collect(),
            orphan_policy: self.orphan_policy,
            completions: self.completions.clone(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn chores(&self) -> &ChoreCatalog {
        &self.chores
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ScheduleOptions) {
        self.options = options;
    }

    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.orphan_policy
    }

    pub fn set_orphan_policy(&mut self, policy: OrphanPolicy) {
        self.orphan_policy = policy;
    }

    pub fn calendar(&self) -> &MonthCalendar {
        &self.calendar
    }

    pub fn history(&self) -> &ScheduleHistory {
        &self.history
    }

    pub fn month_offset(&self) -> i64 {
        self.month_offset
    }

    pub fn completion_counts(&self) -> &BTreeMap<String, u32> {
        &self.completions
    }

    /// Add a member by name, or the next free `Person N` when `name` is None.
    pub fn add_member(&mut self, name: Option<&str>) -> Result<String, BoardError> {
        let added = match name {
            Some(name) => self.roster.add(name)?.to_string(),
            None => self.roster.add_next_default().to_string(),
        };
        info!(member = %added, "member added");
        Ok(added)
    }

    /// Remove a member. Frozen months follow the board's orphan policy.
    /// Returns the number of frozen tasks affected.
    pub fn remove_member(&mut self, name: &str) -> Result<usize, BoardError> {
        self.roster.remove(name)?;
        self.completions.remove(name);
        let affected = self
            .history
            .remove_member(name, &self.roster, self.orphan_policy);
        info!(member = name, affected, policy = ?self.orphan_policy, "member removed");
        Ok(affected)
    }

    /// Rename a member everywhere, including frozen months and completion
    /// counts. Returns the number of frozen tasks rewritten.
    pub fn rename_member(&mut self, old: &str, new: &str) -> Result<usize, BoardError> {
        let new = self.roster.rename(old, new)?;
        if new == old {
            return Ok(0);
        }
        if let Some(count) = self.completions.remove(old) {
            self.completions.insert(new.clone(), count);
        }
        let rewritten = self.history.rename_member(old, &new);
        info!(from = old, to = %new, rewritten, "member renamed");
        Ok(rewritten)
    }

    /// Add a chore, or a placeholder `New Task` chore when `chore` is None.
    /// Returns the new chore's id.
    pub fn add_chore(&mut self, chore: Option<Chore>) -> Result<String, BoardError> {
        let chore = chore.unwrap_or_else(|| defaults::new_chore(self.chores.next_new_id()));
        chore_validation::validate_chore(&chore)?;
        if self.chores.contains(&chore.id) {
            return Err(BoardError::DuplicateChore(chore.id));
        }
        let id = chore.id.clone();
        self.chores.insert(chore);
        info!(chore = %id, "chore added");
        Ok(id)
    }

    pub fn remove_chore(&mut self, id: &str) -> Result<Chore, BoardError> {
        let removed = self
            .chores
            .remove(id)
            .ok_or_else(|| BoardError::UnknownChore(id.to_string()))?;
        info!(chore = id, "chore removed");
        Ok(removed)
    }

    pub fn update_chore(&mut self, id: &str, update: ChoreUpdate) -> Result<&Chore, BoardError> {
        let mut edited = self
            .chores
            .get(id)
            .cloned()
            .ok_or_else(|| BoardError::UnknownChore(id.to_string()))?;
        update.apply_to(&mut edited);
        chore_validation::validate_chore(&edited)?;
        self.chores.insert(edited);
        info!(chore = id, "chore updated");
        self.chores
            .get(id)
            .ok_or_else(|| BoardError::UnknownChore(id.to_string()))
    }

    pub fn next_month(&mut self) -> Result<i64, BoardError> {
        self.month_offset = self
            .month_offset
            .checked_add(1)
            .ok_or(BoardError::MonthOutOfRange(self.month_offset))?;
        Ok(self.month_offset)
    }

    pub fn previous_month(&mut self) -> Result<i64, BoardError> {
        if self.month_offset == 0 {
            return Err(BoardError::BeforeReferenceMonth);
        }
        self.month_offset -= 1;
        Ok(self.month_offset)
    }

    pub fn go_to_month(&mut self, month: i64) -> Result<i64, BoardError> {
        if month < 0 {
            return Err(BoardError::BeforeReferenceMonth);
        }
        self.month_offset = month;
        Ok(month)
    }

    pub fn month_label(&self, month: i64) -> String {
        self.calendar.label(month)
    }

    /// Frozen schedule for `month` if there is one, otherwise a fresh build.
    pub fn schedule_for(&self, month: i64) -> MonthlySchedule {
        match self.history.get(month) {
            Some(frozen) => frozen.clone(),
            None => build_monthly_schedule_with(&self.chores, &self.roster, month, &self.options),
        }
    }

    pub fn current_schedule(&self) -> MonthlySchedule {
        self.schedule_for(self.month_offset)
    }

    pub fn is_frozen(&self, month: i64) -> bool {
        self.history.is_frozen(month)
    }

    /// Pin the schedule currently shown for `month` so later edits do not
    /// regenerate it.
    pub fn freeze_month(&mut self, month: i64) -> &MonthlySchedule {
        let (chores, roster, options) = (&self.chores, &self.roster, &self.options);
        let (schedule, created) = self.history.get_or_freeze_with(month, || {
            build_monthly_schedule_with(chores, roster, month, options)
        });
        if created {
            info!(month, "month frozen");
        }
        schedule
    }

    pub fn unfreeze_month(&mut self, month: i64) -> bool {
        self.history.unfreeze(month).is_some()
    }

    /// Count one completed task for `name`.
    pub fn record_completion(&mut self, name: &str) -> Result<u32, BoardError> {
        if !self.roster.contains(name) {
            return Err(RosterError::Unknown(name.to_string()).into());
        }
        let count = self.completions.entry(name.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        Ok(*count)
    }

    /// Completion counts for every current member, zero when unrecorded.
    pub fn past_assignments(&self) -> BTreeMap<String, u32> {
        self.roster
            .iter()
            .map(|name| (name.clone(), self.completions.get(name).copied().unwrap_or(0)))
            .collect()
    }
}
