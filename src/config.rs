//! Runtime configuration loaded from the environment
//!
//! Every setting has a default, so the bot starts with an empty environment.
//! Values may also come from a `.env` file; variables already present in the
//! process environment take precedence over the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::cache::{SweepConfig, DEFAULT_TTL_SECONDS};
use crate::data::horoscope::{DEFAULT_FETCH_TIMEOUT, DEFAULT_HOROSCOPE_API_URL};
use crate::data::translate::{DEFAULT_TRANSLATE_API_URL, DEFAULT_TRANSLATE_TIMEOUT};

/// Default log filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default language horoscopes are translated into
pub const DEFAULT_TARGET_LANGUAGE: &str = "ru";

/// Default period between cache sweeps in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 3600;

/// Error types for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The given env file could not be read or parsed
    #[error("Failed to load env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Settings for the horoscope pipeline and its surroundings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Seconds a cached horoscope stays valid (`CACHE_TTL`)
    pub cache_ttl_seconds: u64,
    /// Base URL of the daily horoscope endpoint (`HOROSCOPE_API_URL`)
    pub horoscope_api_url: String,
    /// Log filter directive (`LOG_LEVEL`)
    pub log_level: String,
    /// Upstream request timeout (`FETCH_TIMEOUT`, seconds)
    pub fetch_timeout: Duration,
    /// Translation timeout (`TRANSLATE_TIMEOUT`, seconds)
    pub translate_timeout: Duration,
    /// Translation endpoint (`TRANSLATE_API_URL`)
    pub translate_api_url: String,
    /// Target language code (`TARGET_LANGUAGE`)
    pub target_language: String,
    /// Period between cache sweeps, zero disables sweeping (`CACHE_SWEEP_INTERVAL`, seconds)
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: DEFAULT_TTL_SECONDS,
            horoscope_api_url: DEFAULT_HOROSCOPE_API_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            translate_timeout: DEFAULT_TRANSLATE_TIMEOUT,
            translate_api_url: DEFAULT_TRANSLATE_API_URL.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECONDS),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// A `.env` file that exists but cannot be parsed is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        optional_env_file(dotenvy::dotenv(), Path::new(".env"))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from the process environment and the env file at `path`
    ///
    /// Unlike [`Config::from_env`], a missing or malformed file is an error.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let env_file_error = |source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        };

        let file_vars = dotenvy::from_path_iter(path)
            .map_err(env_file_error)?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(env_file_error)?;

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Builds configuration from an arbitrary variable lookup
    ///
    /// Unset or blank variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Config::default();

        let cache_ttl_seconds = match get("CACHE_TTL") {
            Some(value) => parse_seconds("CACHE_TTL", value)?,
            None => defaults.cache_ttl_seconds,
        };

        let horoscope_api_url = match get("HOROSCOPE_API_URL") {
            Some(value) => parse_url("HOROSCOPE_API_URL", value)?,
            None => defaults.horoscope_api_url,
        };

        let translate_api_url = match get("TRANSLATE_API_URL") {
            Some(value) => parse_url("TRANSLATE_API_URL", value)?,
            None => defaults.translate_api_url,
        };

        let fetch_timeout = match get("FETCH_TIMEOUT") {
            Some(value) => parse_timeout("FETCH_TIMEOUT", value)?,
            None => defaults.fetch_timeout,
        };

        let translate_timeout = match get("TRANSLATE_TIMEOUT") {
            Some(value) => parse_timeout("TRANSLATE_TIMEOUT", value)?,
            None => defaults.translate_timeout,
        };

        let sweep_interval = match get("CACHE_SWEEP_INTERVAL") {
            Some(value) => Duration::from_secs(parse_seconds("CACHE_SWEEP_INTERVAL", value)?),
            None => defaults.sweep_interval,
        };

        Ok(Self {
            cache_ttl_seconds,
            horoscope_api_url,
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            fetch_timeout,
            translate_timeout,
            translate_api_url,
            target_language: get("TARGET_LANGUAGE")
                .map(|lang| lang.to_lowercase())
                .unwrap_or(defaults.target_language),
            sweep_interval,
        })
    }

    /// Sweeper settings derived from `sweep_interval`
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            interval: self.sweep_interval,
            enabled: !self.sweep_interval.is_zero(),
        }
    }
}

/// Accepts a missing env file, rejects any other load failure
fn optional_env_file<T>(result: Result<T, dotenvy::Error>, path: &Path) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(source) => Err(ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_seconds(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        key,
        value,
        reason: "expected a whole number of seconds",
    })
}

fn parse_timeout(key: &'static str, value: String) -> Result<Duration, ConfigError> {
    match parse_seconds(key, value.clone())? {
        0 => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "must be greater than zero",
        }),
        seconds => Ok(Duration::from_secs(seconds)),
    }
}

fn parse_url(key: &'static str, value: String) -> Result<String, ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected an http(s) URL",
        })
    }
}
