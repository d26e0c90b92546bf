use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maps month seeds (offsets from a reference month) onto the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCalendar {
    reference_month: NaiveDate,
    rotation_day: Weekday,
    #[serde(default)]
    skip_dates: BTreeSet<NaiveDate>,
}

impl Default for MonthCalendar {
    fn default() -> Self {
        Self::new(Local::now().date_naive(), Weekday::Tue)
    }
}

impl MonthCalendar {
    /// `reference` may be any day; it is normalized to the first of its month.
    pub fn new(reference: NaiveDate, rotation_day: Weekday) -> Self {
        Self {
            reference_month: first_of_month(reference),
            rotation_day,
            skip_dates: BTreeSet::new(),
        }
    }

    pub fn with_skip_dates<I>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.skip_dates.extend(dates);
        self
    }

    pub fn reference_month(&self) -> NaiveDate {
        self.reference_month
    }

    pub fn rotation_day(&self) -> Weekday {
        self.rotation_day
    }

    pub fn skip_dates(&self) -> impl Iterator<Item = &NaiveDate> {
        self.skip_dates.iter()
    }

    /// Add a date on which no rotation happens.
    pub fn add_skip_date(&mut self, date: NaiveDate) {
        self.skip_dates.insert(date);
    }

    /// First day of the month `month_seed` months after the reference month.
    pub fn month_start(&self, month_seed: i64) -> Option<NaiveDate> {
        let months = Months::new(u32::try_from(month_seed.unsigned_abs()).ok()?);
        if month_seed >= 0 {
            self.reference_month.checked_add_months(months)
        } else {
            self.reference_month.checked_sub_months(months)
        }
    }

    /// Human label such as `October 2026`.
    pub fn label(&self, month_seed: i64) -> String {
        match self.month_start(month_seed) {
            Some(start) => start.format("%B %Y").to_string(),
            None => format!("month {month_seed}"),
        }
    }

    /// Rotation date of each of the four weeks: the first `rotation_day` of
    /// the month and the three following weeks, each pushed past skip dates.
    pub fn week_dates(&self, month_seed: i64) -> Vec<NaiveDate> {
        let Some(start) = self.month_start(month_seed) else {
            return Vec::new();
        };
        let first = Self::nth_weekday(start.year(), start.month(), self.rotation_day, 1);
        (0..crate::schedule::WEEKS_PER_MONTH as i64)
            .map(|week| self.next_rotation_date(first + Duration::weeks(week)))
            .collect()
    }

    fn next_rotation_date(&self, mut date: NaiveDate) -> NaiveDate {
        while self.skip_dates.contains(&date) {
            date = date + Duration::days(1);
        }
        date
    }

    /// Find the nth occurrence of a weekday in a month.
    fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
        let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday())
            % 7;
        first + Duration::days(i64::from(offset + 7 * (n - 1)))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
