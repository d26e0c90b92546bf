use crate::calendar::MonthCalendar;
use crate::chore::ChoreCatalog;
use crate::chore_validation::{ValidationError, validate_catalog};
use crate::defaults::{default_chores, default_completions, default_roster};
use crate::history::OrphanPolicy;
use crate::roster::Roster;
use crate::schedule::ScheduleOptions;
use chrono::{Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a JSON board configuration file.
pub const CONFIG_ENV: &str = "CHORE_WHEEL_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Everything needed to initialize a chore board. Missing fields fall back
/// to the built-in seed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_roster")]
    pub roster: Roster,
    #[serde(default = "default_chores")]
    pub chores: ChoreCatalog,
    #[serde(default)]
    pub options: ScheduleOptions,
    /// Month that seed 0 refers to. Unset means the current month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_month: Option<NaiveDate>,
    #[serde(default = "default_rotation_day")]
    pub rotation_day: Weekday,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skip_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
    #[serde(default = "default_completions")]
    pub completions: BTreeMap<String, u32>,
}

fn default_rotation_day() -> Weekday {
    Weekday::Tue
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            chores: default_chores(),
            options: ScheduleOptions::default(),
            reference_month: None,
            rotation_day: default_rotation_day(),
            skip_dates: Vec::new(),
            orphan_policy: OrphanPolicy::default(),
            completions: default_completions(),
        }
    }
}

impl BoardConfig {
    /// A config with no people and no chores.
    pub fn empty() -> Self {
        Self {
            roster: Roster::new(),
            chores: ChoreCatalog::new(),
            completions: BTreeMap::new(),
            ..Self::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: BoardConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by [`CONFIG_ENV`], or the defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_catalog(&self.chores)
    }

    pub fn calendar(&self) -> MonthCalendar {
        let reference = self
            .reference_month
            .unwrap_or_else(|| Local::now().date_naive());
        MonthCalendar::new(reference, self.rotation_day)
            .with_skip_dates(self.skip_dates.iter().copied())
    }
}
