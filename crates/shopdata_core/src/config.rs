//! Connection settings and connection-string parsing.
//!
//! # Responsibility
//! - Turn a `Key=Value;` connection string into typed `ConnectionSettings`.
//! - Resolve the connection string from the process environment.
//!
//! # Invariants
//! - `Data Source` is required and never empty.
//! - Keys are matched case-insensitively; unknown keys are rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the connection string.
pub const CONNECTION_STRING_ENV: &str = "SHOPDATA_CONNECTION_STRING";
/// Connection string used when the environment does not provide one.
pub const DEFAULT_CONNECTION_STRING: &str = "Data Source=shopdata.sqlite3";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const MEMORY_DATA_SOURCE: &str = ":memory:";

static SEGMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<key>[A-Za-z][A-Za-z ]*?)\s*=\s*(?P<value>.*?)\s*$")
        .expect("connection string segment pattern is valid")
});

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `Data Source` is missing or empty.
    MissingDataSource,
    /// Segment is not of the form `Key=Value`.
    MalformedSegment(String),
    /// Key is not one of the supported settings.
    UnknownKey(String),
    /// Value cannot be parsed for the given key.
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDataSource => write!(f, "connection string requires `Data Source`"),
            Self::MalformedSegment(segment) => {
                write!(f, "malformed connection string segment `{segment}`")
            }
            Self::UnknownKey(key) => write!(f, "unknown connection string key `{key}`"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for connection string key `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Typed connection settings for one SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Database file path, or `:memory:`.
    pub data_source: PathBuf,
    /// How long a statement waits on a locked database.
    pub busy_timeout: Duration,
    /// Whether `PRAGMA foreign_keys` is switched on for every connection.
    pub foreign_keys: bool,
}

impl ConnectionSettings {
    /// Settings for a database file with default pragmas.
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            data_source: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            foreign_keys: true,
        }
    }

    /// Parses `Data Source=...;Busy Timeout=...;Foreign Keys=...`.
    ///
    /// Empty segments (e.g. a trailing `;`) are ignored.
    pub fn from_connection_string(input: &str) -> ConfigResult<Self> {
        let mut data_source: Option<PathBuf> = None;
        let mut busy_timeout = Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS);
        let mut foreign_keys = true;

        for segment in input.split(';') {
            if segment.trim().is_empty() {
                continue;
            }

            let captures = SEGMENT_PATTERN
                .captures(segment)
                .ok_or_else(|| ConfigError::MalformedSegment(segment.trim().to_string()))?;
            let key = normalize_key(&captures["key"]);
            let value = &captures["value"];

            match key.as_str() {
                "data source" | "datasource" => {
                    if value.is_empty() {
                        return Err(ConfigError::MissingDataSource);
                    }
                    data_source = Some(PathBuf::from(value));
                }
                "busy timeout" => {
                    let millis = value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                        key: "Busy Timeout",
                        value: value.to_string(),
                    })?;
                    busy_timeout = Duration::from_millis(millis);
                }
                "foreign keys" => {
                    foreign_keys = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                        key: "Foreign Keys",
                        value: value.to_string(),
                    })?;
                }
                _ => return Err(ConfigError::UnknownKey(captures["key"].trim().to_string())),
            }
        }

        Ok(Self {
            data_source: data_source.ok_or(ConfigError::MissingDataSource)?,
            busy_timeout,
            foreign_keys,
        })
    }

    /// Reads `SHOPDATA_CONNECTION_STRING`, falling back to
    /// `DEFAULT_CONNECTION_STRING` when unset.
    pub fn from_env() -> ConfigResult<Self> {
        match std::env::var(CONNECTION_STRING_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::from_connection_string(&value),
            _ => Self::from_connection_string(DEFAULT_CONNECTION_STRING),
        }
    }

    /// Renders settings back into connection-string form.
    pub fn connection_string(&self) -> String {
        format!(
            "Data Source={};Busy Timeout={};Foreign Keys={}",
            self.data_source.display(),
            self.busy_timeout.as_millis(),
            self.foreign_keys
        )
    }

    /// Whether the data source names a private in-memory or temporary
    /// database rather than a file every connection shares.
    ///
    /// An empty source gives each connection its own temporary database.
    pub fn is_in_memory(&self) -> bool {
        let source = self.data_source.to_string_lossy();
        if source.is_empty() || source == MEMORY_DATA_SOURCE {
            return true;
        }
        match source.strip_prefix("file:") {
            Some(uri) => uri.starts_with(MEMORY_DATA_SOURCE) || uri.contains("mode=memory"),
            None => false,
        }
    }
}

fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}
