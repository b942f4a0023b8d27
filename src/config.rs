//! Configuration loader and validator for the observation desk.
use crate::local_time::{LocalProjector, LOCAL_OFFSET_HOURS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

const DATABASE_FILE: &str = "synop.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    /// Hours added to UTC for local display. A fixed offset, not a timezone.
    #[serde(default = "default_local_offset_hours")]
    pub local_offset_hours: i64,
}

fn default_local_offset_hours() -> i64 {
    LOCAL_OFFSET_HOURS
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        fs::create_dir_all(self.app.resolved_data_dir())
    }

    /// `DATABASE_URL` if set, otherwise a SQLite file inside `app.data_dir`.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite://{}/{}?mode=rwc", self.app.resolved_data_dir(), DATABASE_FILE)
        })
    }

    pub fn projector(&self) -> LocalProjector {
        LocalProjector::with_offset_hours(self.app.local_offset_hours)
    }
}

impl App {
    /// `data_dir` with a leading `~/` expanded against `HOME`.
    pub fn resolved_data_dir(&self) -> String {
        let dir = self.data_dir.trim();
        match (dir.strip_prefix("~/"), std::env::var("HOME")) {
            (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
            _ => dir.to_string(),
        }
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if !(-12..=14).contains(&cfg.app.local_offset_hours) {
        return Err(ConfigError::Invalid(
            "app.local_offset_hours must be within -12..=14",
        ));
    }
    Ok(())
}

/// Example configuration, also used by tests.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  # Fixed display offset from UTC in hours. Not a timezone; no DST.
  local_offset_hours: 6
"#
}
