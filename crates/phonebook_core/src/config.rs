//! Storage configuration resolved once at process startup.
//!
//! # Responsibility
//! - Turn the deployment environment into a backend selection.
//! - Keep environment reads out of store and service code.
//!
//! # Invariants
//! - A non-blank `DATABASE_URL` selects the relational backend; otherwise the
//!   JSON file backend is used.
//! - The selection never changes after it was resolved.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Connection string whose presence selects the relational backend.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Directory of the JSON file backend.
pub const DATA_DIR_ENV: &str = "PHONEBOOK_DATA_DIR";
/// Directory used when `PHONEBOOK_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Which backend to open and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// SQLite database file.
    Sqlite { path: PathBuf },
    /// Directory holding `characters.json` and `dm_notes.json`.
    JsonFiles { data_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The connection string cannot be used by a per-operation connection.
    UnsupportedDatabaseUrl(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedDatabaseUrl(url) => write!(
                f,
                "unsupported {DATABASE_URL_ENV} `{url}`; expected a SQLite file path"
            ),
        }
    }
}

impl Error for ConfigError {}

impl StorageConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    /// - Returns `UnsupportedDatabaseUrl` for in-memory or non-SQLite URLs.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        if let Some(url) = database_url {
            return Ok(Self::Sqlite {
                path: sqlite_path_from_url(&url)?,
            });
        }

        let data_dir = lookup(DATA_DIR_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        Ok(Self::JsonFiles {
            data_dir: PathBuf::from(data_dir),
        })
    }

    /// Short backend label for logs and CLI output.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::JsonFiles { .. } => "json",
        }
    }

    /// Database file or data directory of the selected backend.
    pub fn location(&self) -> &Path {
        match self {
            Self::Sqlite { path } => path,
            Self::JsonFiles { data_dir } => data_dir,
        }
    }
}

fn sqlite_path_from_url(url: &str) -> Result<PathBuf, ConfigError> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    let looks_remote = path.contains("://");
    if path.is_empty() || path == ":memory:" || path.contains("mode=memory") || looks_remote {
        return Err(ConfigError::UnsupportedDatabaseUrl(url.to_string()));
    }

    Ok(PathBuf::from(path))
}
