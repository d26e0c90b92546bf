//! Month-indexed cache of frozen schedules.
//!
//! Schedules are normally recomputed on demand. A frozen month keeps the
//! assignments it had when it was frozen, so roster edits must be carried
//! into it explicitly: renames rewrite assignees, removals follow an
//! [`OrphanPolicy`].

use crate::roster::Roster;
use crate::schedule::MonthlySchedule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// What to do with frozen tasks whose assignee left the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Remove the task; its chore id is recorded as dropped for that week.
    #[default]
    Drop,
    /// Give the task to the first idle remaining member of that week, or
    /// drop it when nobody is idle.
    Reassign,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleHistory {
    months: BTreeMap<i64, MonthlySchedule>,
}

impl ScheduleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a schedule under its month seed, replacing any earlier one.
    pub fn freeze(&mut self, schedule: MonthlySchedule) -> Option<MonthlySchedule> {
        self.months.insert(schedule.month_seed, schedule)
    }

    /// Frozen schedule for `month_seed`, freezing `build()` first when the
    /// month is not frozen yet. The flag tells whether `build` ran.
    pub fn get_or_freeze_with<F>(&mut self, month_seed: i64, build: F) -> (&MonthlySchedule, bool)
    where
        F: FnOnce() -> MonthlySchedule,
    {
        match self.months.entry(month_seed) {
            Entry::Occupied(entry) => (entry.into_mut(), false),
            Entry::Vacant(entry) => (entry.insert(build()), true),
        }
    }

    pub fn unfreeze(&mut self, month_seed: i64) -> Option<MonthlySchedule> {
        self.months.remove(&month_seed)
    }

    pub fn get(&self, month_seed: i64) -> Option<&MonthlySchedule> {
        self.months.get(&month_seed)
    }

    pub fn is_frozen(&self, month_seed: i64) -> bool {
        self.months.contains_key(&month_seed)
    }

    pub fn months(&self) -> impl Iterator<Item = i64> + '_ {
        self.months.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlySchedule> {
        self.months.values()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Rewrite every reference to `old` as `new`. Returns the number of
    /// tasks rewritten.
    pub fn rename_member(&mut self, old: &str, new: &str) -> usize {
        let mut rewritten = 0;
        for schedule in self.months.values_mut() {
            for week in &mut schedule.weeks {
                for task in &mut week.tasks {
                    if task.assignee == old {
                        task.assignee = new.to_string();
                        rewritten += 1;
                    }
                }
                for name in &mut week.idle {
                    if name == old {
                        *name = new.to_string();
                    }
                }
            }
        }
        rewritten
    }

    /// Apply `policy` to every task assigned to `name`. `remaining` is the
    /// roster after the removal. Returns the number of affected tasks.
    pub fn remove_member(&mut self, name: &str, remaining: &Roster, policy: OrphanPolicy) -> usize {
        let mut affected = 0;
        for schedule in self.months.values_mut() {
            for week in &mut schedule.weeks {
                week.idle.retain(|member| member != name);
                let mut kept = Vec::with_capacity(week.tasks.len());
                for mut task in std::mem::take(&mut week.tasks) {
                    if task.assignee != name {
                        kept.push(task);
                        continue;
                    }
                    affected += 1;
                    let substitute = match policy {
                        OrphanPolicy::Drop => None,
                        OrphanPolicy::Reassign => week
                            .idle
                            .iter()
                            .position(|member| remaining.contains(member)),
                    };
                    match substitute {
                        Some(idx) => {
                            task.assignee = week.idle.remove(idx);
                            kept.push(task);
                        }
                        None => week.dropped.push(task.chore_id),
                    }
                }
                week.tasks = kept;
            }
        }
        affected
    }

    /// Total tasks per assignee across all frozen months.
    pub fn assignment_counts(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for task in self.months.values().flat_map(|schedule| schedule.tasks()) {
            *counts.entry(task.assignee.clone()).or_insert(0) += 1;
        }
        counts
    }
}
