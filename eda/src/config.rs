//! Runtime configuration.
//!
//! Values come from the environment (optionally via a `.env` file) and can be
//! overridden by command-line flags.

use std::env;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Dataset path used when neither the CLI nor the environment names one.
pub const DEFAULT_DATA_PATH: &str = "hotel_bookings.csv";

/// Rows shown by the preview sections (`head()` of a dataframe).
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Entries kept by the top-nationalities view.
pub const DEFAULT_TOP_N: usize = 10;

pub const ENV_DATA_PATH: &str = "HOTEL_EDA_DATA";
pub const ENV_PREVIEW_ROWS: &str = "HOTEL_EDA_PREVIEW_ROWS";
pub const ENV_TOP_N: &str = "HOTEL_EDA_TOP_N";

/// Knobs for dashboard assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    /// Number of rows in preview sections
    pub preview_rows: usize,

    /// Number of countries kept by the top-nationalities view
    pub top_n: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    pub options: DashboardOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            options: DashboardOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> ConfigResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_path = lookup(ENV_DATA_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let preview_rows = match lookup(ENV_PREVIEW_ROWS) {
            Some(v) => parse_count(ENV_PREVIEW_ROWS, &v)?,
            None => defaults.options.preview_rows,
        };

        let top_n = match lookup(ENV_TOP_N) {
            Some(v) => parse_count(ENV_TOP_N, &v)?,
            None => defaults.options.top_n,
        };

        Ok(Self {
            data_path,
            options: DashboardOptions { preview_rows, top_n },
        })
    }
}

fn parse_count(var: &'static str, value: &str) -> ConfigResult<usize> {
    let n: usize = value.trim().parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::InvalidVar {
            var,
            value: value.to_string(),
            message: e.to_string(),
        }
    })?;
    if n == 0 {
        return Err(ConfigError::InvalidVar {
            var,
            value: value.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(n)
}
