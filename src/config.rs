// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ACCESS_TOKEN` | Discord bot token | Required |
//! | `DATABASE_PATH` | redb database file | `data.redb` |
//! | `INCIDENT_LOG_PATH` | Append-only incident log | `log.txt` |
//! | `LEGACY_DATA_FILE` | Legacy `data.json` to import once | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,serenity=warn` |

use std::path::PathBuf;

/// Environment variable holding the Discord bot token.
pub const ACCESS_TOKEN_ENV: &str = "ACCESS_TOKEN";

/// Environment variable for the database file path.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Environment variable for the incident log path.
pub const INCIDENT_LOG_PATH_ENV: &str = "INCIDENT_LOG_PATH";

/// Environment variable pointing at a legacy JSON data file.
///
/// When set, the file is imported into the database on startup unless the
/// database is already marked as migrated.
pub const LEGACY_DATA_FILE_ENV: &str = "LEGACY_DATA_FILE";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATABASE_PATH: &str = "data.redb";
pub const DEFAULT_INCIDENT_LOG_PATH: &str = "log.txt";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,serenity=warn";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),

    #[error("invalid value `{value}` for `{name}`")]
    Invalid { name: &'static str, value: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Option<LogFormat> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub access_token: String,
    pub database_path: PathBuf,
    pub incident_log_path: PathBuf,
    pub legacy_data_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl BotConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let access_token = get(ACCESS_TOKEN_ENV).ok_or(ConfigError::Missing(ACCESS_TOKEN_ENV))?;

        let log_format = match get(LOG_FORMAT_ENV) {
            None => LogFormat::default(),
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                value: raw,
            })?,
        };

        Ok(Self {
            access_token,
            database_path: get(DATABASE_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),
            incident_log_path: get(INCIDENT_LOG_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_INCIDENT_LOG_PATH.to_string())
                .into(),
            legacy_data_file: get(LEGACY_DATA_FILE_ENV).map(PathBuf::from),
            log_format,
        })
    }
}
