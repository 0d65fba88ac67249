//! Handles settings for the application.
//!
//! Values are layered, lowest precedence first: built-in defaults, an
//! optional `jobtracker.toml` (or the file given with `--config`),
//! `JOBTRACKER_*` environment variables, then command line flags.
use serde::Deserialize;

use crate::{cli::Cli, error::Result};

const DEFAULT_CONFIG_NAME: &str = "jobtracker";
const ENV_PREFIX: &str = "JOBTRACKER";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// CSV file holding the jobs.
    pub data_file: String,
    /// Log level for the `tracing` subscriber.
    pub level: String,
    /// Symbol printed in front of amounts.
    pub currency_symbol: String,
    /// Window used by "upcoming deadlines".
    pub upcoming_days: u32,
    /// Width, in characters, of the longest bar in the plain chart.
    pub chart_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: "freelance_jobs.csv".to_string(),
            level: "warn".to_string(),
            currency_symbol: "$".to_string(),
            upcoming_days: 7,
            chart_width: 40,
        }
    }
}

impl Settings {
    /// Reads the config file and environment, then applies the CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut settings = Self::from_sources(cli.config.as_deref())?;

        if let Some(data_file) = &cli.data_file {
            settings.data_file = data_file.clone();
        }
        if let Some(level) = &cli.log_level {
            settings.level = level.clone();
        }

        Ok(settings)
    }

    fn from_sources(config_path: Option<&str>) -> Result<Self> {
        let file = match config_path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
