use crate::chore::ChoreCatalog;
use crate::roster::Roster;
use crate::shuffle::{derive_seed, shuffle};
use crate::task::Task;
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

pub const WEEKS_PER_MONTH: usize = 4;

const POOL_SALT: u64 = 0x706f_6f6c;
const ROSTER_SALT: u64 = 0x726f_7374;

/// How a chore's `frequency` is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyMode {
    /// `frequency` instances go into every week's pool.
    #[default]
    PerWeek,
    /// `frequency` instances are spread over the four weeks of the month.
    PerMonth,
}

/// What happens to pool items that would double-book somebody.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    Drop,
    /// Move overflow to the front of next week's pool. Overflow of the last
    /// week is dropped.
    CarryForward,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub frequency_mode: FrequencyMode,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSchedule {
    /// Zero-based week index within the month.
    pub week: usize,
    pub tasks: Vec<Task>,
    /// Chore ids left unassigned this week.
    #[serde(default)]
    pub dropped: Vec<String>,
    /// Roster members without a task this week.
    #[serde(default)]
    pub idle: Vec<String>,
}

impl WeekSchedule {
    pub fn empty(week: usize) -> Self {
        Self {
            week,
            tasks: Vec::new(),
            dropped: Vec::new(),
            idle: Vec::new(),
        }
    }

    pub fn task_for(&self, assignee: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.assignee == assignee)
    }

    pub fn count_of(&self, chore_id: &str) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.chore_id == chore_id)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySchedule {
    pub month_seed: i64,
    pub weeks: Vec<WeekSchedule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub month_seed: i64,
    pub task_count: usize,
    pub dropped_count: usize,
    pub idle_count: usize,
    pub per_member: BTreeMap<String, u32>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("month={}", self.month_seed));
        parts.push(format!("tasks={}", self.task_count));
        if self.dropped_count > 0 {
            parts.push(format!("dropped={}", self.dropped_count));
        }
        if self.idle_count > 0 {
            parts.push(format!("idle={}", self.idle_count));
        }
        if !self.per_member.is_empty() {
            let load = self
                .per_member
                .iter()
                .map(|(name, count)| format!("{name}:{count}"))
                .collect::<Vec<_>>()
                .join(" ");
            parts.push(format!("load=[{load}]"));
        }
        parts.join(", ")
    }
}

impl MonthlySchedule {
    pub fn empty(month_seed: i64) -> Self {
        Self {
            month_seed,
            weeks: (0..WEEKS_PER_MONTH).map(WeekSchedule::empty).collect(),
        }
    }

    /// True when no week holds a task.
    pub fn is_empty(&self) -> bool {
        self.weeks.iter().all(|week| week.tasks.is_empty())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.weeks.iter().flat_map(|week| week.tasks.iter())
    }

    pub fn summary(&self) -> ScheduleSummary {
        let mut per_member: BTreeMap<String, u32> = BTreeMap::new();
        let mut dropped_count = 0;
        let mut idle_count = 0;
        for week in &self.weeks {
            for task in &week.tasks {
                *per_member.entry(task.assignee.clone()).or_default() += 1;
            }
            for name in &week.idle {
                per_member.entry(name.clone()).or_default();
            }
            dropped_count += week.dropped.len();
            idle_count += week.idle.len();
        }
        ScheduleSummary {
            month_seed: self.month_seed,
            task_count: self.tasks().count(),
            dropped_count,
            idle_count,
            per_member,
        }
    }

    /// Tabular view with one row per task. Chore titles come from `catalog`
    /// when given, otherwise the chore id is shown.
    pub fn to_dataframe(&self, catalog: Option<&ChoreCatalog>) -> PolarsResult<DataFrame> {
        let mut weeks: Vec<u32> = Vec::new();
        let mut assignees: Vec<&str> = Vec::new();
        let mut chores: Vec<&str> = Vec::new();
        let mut ids: Vec<&str> = Vec::new();
        for week in &self.weeks {
            for task in &week.tasks {
                weeks.push(week.week as u32 + 1);
                assignees.push(task.assignee.as_str());
                chores.push(match catalog {
                    Some(catalog) => catalog.title_of(&task.chore_id),
                    None => task.chore_id.as_str(),
                });
                ids.push(task.id.as_str());
            }
        }

        let columns = vec![
            Series::new(PlSmallStr::from_static("week"), weeks).into_column(),
            Series::new(PlSmallStr::from_static("assignee"), assignees).into_column(),
            Series::new(PlSmallStr::from_static("chore"), chores).into_column(),
            Series::new(PlSmallStr::from_static("task_id"), ids).into_column(),
        ];
        DataFrame::new(columns)
    }
}

/// Build the four-week schedule for `month_seed` with default options.
pub fn build_monthly_schedule(
    chores: &ChoreCatalog,
    roster: &Roster,
    month_seed: i64,
) -> MonthlySchedule {
    build_monthly_schedule_with(chores, roster, month_seed, &ScheduleOptions::default())
}

/// Build the four-week schedule for `month_seed`.
///
/// Pure: the result depends only on the arguments. An empty roster or
/// catalog yields four empty weeks.
pub fn build_monthly_schedule_with(
    chores: &ChoreCatalog,
    roster: &Roster,
    month_seed: i64,
    options: &ScheduleOptions,
) -> MonthlySchedule {
    if roster.is_empty() || chores.is_empty() {
        return MonthlySchedule::empty(month_seed);
    }

    let mut weeks = Vec::with_capacity(WEEKS_PER_MONTH);
    let mut used_ids: HashSet<String> = HashSet::new();
    let mut carried: Vec<String> = Vec::new();

    for week in 0..WEEKS_PER_MONTH {
        let mut fresh = Vec::new();
        for (position, chore) in chores.iter().enumerate() {
            let quota = week_quota(position, chore.frequency(), week, options.frequency_mode);
            fresh.extend(std::iter::repeat_n(chore.id.clone(), quota as usize));
        }
        let mut pool = std::mem::take(&mut carried);
        pool.extend(shuffle(&fresh, Some(week_seed(month_seed, week, POOL_SALT))));

        let members = shuffle(
            roster.as_slice(),
            Some(week_seed(month_seed, week, ROSTER_SALT)),
        );

        let mut booked: HashSet<&str> = HashSet::with_capacity(members.len());
        let mut tasks = Vec::with_capacity(members.len().min(pool.len()));
        let mut overflow = Vec::new();
        for (idx, chore_id) in pool.into_iter().enumerate() {
            let assignee = members[idx % members.len()].as_str();
            if !booked.insert(assignee) {
                overflow.push(chore_id);
                continue;
            }
            let id = claim_id(
                &mut used_ids,
                Task::base_id(assignee, &chore_id, month_seed, week),
            );
            tasks.push(Task::new(id, chore_id, assignee));
        }

        let idle = roster
            .iter()
            .filter(|name| !booked.contains(name.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        let dropped = match options.overflow {
            OverflowPolicy::CarryForward if week + 1 < WEEKS_PER_MONTH => {
                carried = overflow;
                Vec::new()
            }
            _ => overflow,
        };

        debug!(
            month_seed,
            week,
            tasks = tasks.len(),
            dropped = dropped.len(),
            carried = carried.len(),
            idle = idle.len(),
            "built week"
        );

        weeks.push(WeekSchedule {
            week,
            tasks,
            dropped,
            idle,
        });
    }

    MonthlySchedule { month_seed, weeks }
}

/// Build several months at once. Months are independent, so they are
/// computed in parallel; the output follows the input order.
pub fn build_schedules<I>(
    chores: &ChoreCatalog,
    roster: &Roster,
    months: I,
    options: &ScheduleOptions,
) -> Vec<MonthlySchedule>
where
    I: IntoIterator<Item = i64>,
{
    let months: Vec<i64> = months.into_iter().collect();
    months
        .par_iter()
        .map(|&month| build_monthly_schedule_with(chores, roster, month, options))
        .collect()
}

fn week_quota(position: usize, frequency: u32, week: usize, mode: FrequencyMode) -> u32 {
    match mode {
        FrequencyMode::PerWeek => frequency,
        FrequencyMode::PerMonth => {
            let weeks = WEEKS_PER_MONTH as u32;
            let base = frequency / weeks;
            let remainder = frequency % weeks;
            // rotate which weeks receive the remainder by catalog position
            let slot = ((week + WEEKS_PER_MONTH - position % WEEKS_PER_MONTH) % WEEKS_PER_MONTH)
                as u32;
            base + u32::from(slot < remainder)
        }
    }
}

fn week_seed(month_seed: i64, week: usize, salt: u64) -> u64 {
    derive_seed(derive_seed(month_seed as u64, week as u64), salt)
}

fn claim_id(used: &mut HashSet<String>, base: String) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{base}-{suffix}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_month_quota_sums_to_frequency() {
        for frequency in 1..12 {
            for position in 0..5 {
                let total: u32 = (0..WEEKS_PER_MONTH)
                    .map(|week| week_quota(position, frequency, week, FrequencyMode::PerMonth))
                    .sum();
                assert_eq!(total, frequency);
            }
        }
    }

    #[test]
    fn claim_id_appends_suffix_on_collision() {
        let mut used = HashSet::new();
        assert_eq!(claim_id(&mut used, "a".into()), "a");
        assert_eq!(claim_id(&mut used, "a".into()), "a-1");
        assert_eq!(claim_id(&mut used, "a".into()), "a-2");
    }
}
