//! Runtime configuration (`dutycal.toml` + `DUTYCAL_*` env overrides).
//!
//! # Invariants
//! - Every field has a default, so an absent file yields a usable config.
//! - Nested keys are addressed from the environment with `__`, e.g.
//!   `DUTYCAL_DATABASE__PATH` or `DUTYCAL_INVITE__START_HOUR`.
//! - `load` always validates; a config that passes `validate` produces a
//!   computable invite window for any date but the last supported one.

use crate::calendar::grid::WeekStart;
use crate::calendar::palette::DEFAULT_PALETTE;
use crate::invite::ics::Organizer;
use crate::invite::window::InvitePolicy;
use crate::logging::default_log_level;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dutycal.toml";
pub const ENV_PREFIX: &str = "DUTYCAL_";

#[derive(Debug)]
pub enum ConfigError {
    /// File or environment could not be merged into the config shape.
    Load(String),
    /// Values parsed but violate a config rule.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(message) => write!(f, "failed to load config: {message}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DutycalConfig {
    pub calendar: CalendarConfig,
    pub invite: InviteConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub week_start: WeekStart,
    /// Rubric colors; an empty list falls back to the built-in palette.
    pub palette: Vec<String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Sunday,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteConfig {
    pub start_hour: u32,
    pub end_hour: u32,
    pub reminder_minutes: u32,
    pub organizer_name: String,
    pub organizer_email: String,
}

impl Default for InviteConfig {
    fn default() -> Self {
        let policy = InvitePolicy::OVERNIGHT;
        let organizer = Organizer::default();
        Self {
            start_hour: policy.start_hour,
            end_hour: policy.end_hour,
            reminder_minutes: policy.reminder_minutes,
            organizer_name: organizer.name,
            organizer_email: organizer.email,
        }
    }
}

impl InviteConfig {
    pub fn policy(&self) -> InvitePolicy {
        InvitePolicy {
            start_hour: self.start_hour,
            end_hour: self.end_hour,
            reminder_minutes: self.reminder_minutes,
        }
    }

    pub fn organizer(&self) -> Organizer {
        Organizer {
            name: self.organizer_name.clone(),
            email: self.organizer_email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "dutycal.sqlite3".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Configured path, relative ones taken against the working directory.
    pub fn file_path(&self) -> PathBuf {
        PathBuf::from(self.path.trim())
    }

    /// Configured path with relative values anchored under `base`.
    pub fn resolve_under(&self, base: &Path) -> PathBuf {
        let path = self.file_path();
        if path.is_absolute() {
            path
        } else {
            base.join(path)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory; file logging stays off when unset.
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl DutycalConfig {
    /// Loads config from a TOML file with `DUTYCAL_*` env var overrides.
    ///
    /// `config_path` defaults to `dutycal.toml` in the working directory; a
    /// missing file is not an error.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

        let config: DutycalConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|err| ConfigError::Load(err.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invite = &self.invite;
        for (key, hour) in [
            ("invite.start_hour", invite.start_hour),
            ("invite.end_hour", invite.end_hour),
        ] {
            if hour > 23 {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be within 0..=23, got {hour}"
                )));
            }
        }
        if invite.start_hour == invite.end_hour {
            return Err(ConfigError::Invalid(
                "invite.start_hour and invite.end_hour must differ".to_string(),
            ));
        }
        if !invite.organizer_email.contains('@') {
            return Err(ConfigError::Invalid(
                "invite.organizer_email must contain `@`".to_string(),
            ));
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::Invalid("database.path cannot be empty".to_string()));
        }
        Ok(())
    }
}
