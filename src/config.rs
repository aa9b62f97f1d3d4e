use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use dotenv::dotenv;
use log::LevelFilter;
use url::Url;

use crate::utils::portal::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Summary,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "summary" => Ok(OutputFormat::Summary),
            other => Err(anyhow!("unknown output format {:?}, expected json or summary", other)),
        }
    }
}

// Settings for the command-line entry point, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub base_url: String,
    pub log_level: LevelFilter,
    pub output: OutputFormat,
}

impl Config {
    // Loads variables from a `.env` file, if present, then reads the environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup("TA_USERNAME").context("TA_USERNAME environment variable not found")?;
        let password = lookup("TA_PASSWORD").context("TA_PASSWORD environment variable not found")?;

        let base_url = lookup("TA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url).with_context(|| format!("TA_BASE_URL is not a valid url: {}", base_url))?;

        let log_level = match lookup("TA_LOG_LEVEL") {
            Some(level) => LevelFilter::from_str(level.trim())
                .map_err(|_| anyhow!("TA_LOG_LEVEL has unknown level {:?}", level))?,
            None => LevelFilter::Info,
        };

        let output = match lookup("TA_OUTPUT") {
            Some(format) => format.parse()?,
            None => OutputFormat::default(),
        };

        Ok(Config {
            username,
            password,
            base_url: base_url.trim_end_matches('/').to_string(),
            log_level,
            output,
        })
    }
}
