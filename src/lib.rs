#[cfg(feature = "advisory")]
pub mod advisory;
pub mod board;
pub mod calendar;
pub mod chore;
pub mod chore_validation;
pub mod config;
pub mod defaults;
pub mod history;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod persistence;
pub mod roster;
pub mod schedule;
pub mod shuffle;
pub mod task;

pub use board::{BoardError, ChoreBoard};
pub use calendar::MonthCalendar;
pub use chore::{Chore, ChoreCatalog, ChoreUpdate};
pub use config::{BoardConfig, ConfigError};
pub use history::{OrphanPolicy, ScheduleHistory};
pub use roster::{Roster, RosterError};
pub use schedule::{
    FrequencyMode, MonthlySchedule, OverflowPolicy, ScheduleOptions, ScheduleSummary,
    WEEKS_PER_MONTH, WeekSchedule, build_monthly_schedule, build_monthly_schedule_with,
    build_schedules,
};
pub use shuffle::{SeededRandom, shuffle, shuffle_with};
pub use task::Task;
