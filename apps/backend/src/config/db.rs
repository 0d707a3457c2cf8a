use std::env;
use std::str::FromStr;

use crate::error::AppError;

/// Where game, account and payment data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProfile {
    /// PostgreSQL, located by `DATABASE_URL` or the `POSTGRES_*` variables
    Postgres,
    /// Throwaway SQLite database, migrated at startup
    SqliteMemory,
    /// No database; in-process stores only
    InMemory,
}

impl FromStr for DbProfile {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(DbProfile::Postgres),
            "sqlite-memory" | "sqlite_memory" => Ok(DbProfile::SqliteMemory),
            "memory" | "in-memory" => Ok(DbProfile::InMemory),
            other => Err(AppError::config(format!(
                "DB_PROFILE must be one of postgres, sqlite-memory, memory; got '{other}'"
            ))),
        }
    }
}

impl DbProfile {
    /// Read `DB_PROFILE`, defaulting to Postgres.
    pub fn from_env() -> Result<Self, AppError> {
        match env::var("DB_PROFILE") {
            Ok(value) => value.parse(),
            Err(_) => Ok(DbProfile::Postgres),
        }
    }
}

/// Builds the connection URL for a profile.
///
/// Postgres prefers `DATABASE_URL` and otherwise assembles one from
/// `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB`, `POSTGRES_USER` and
/// `POSTGRES_PASSWORD`.
pub fn db_url(profile: DbProfile) -> Result<String, AppError> {
    match profile {
        DbProfile::Postgres => {
            if let Ok(url) = env::var("DATABASE_URL") {
                return Ok(url);
            }
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = must_var("POSTGRES_DB")?;
            let username = must_var("POSTGRES_USER")?;
            let password = must_var("POSTGRES_PASSWORD")?;
            Ok(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            ))
        }
        DbProfile::SqliteMemory => Ok("sqlite::memory:".to_string()),
        DbProfile::InMemory => Err(AppError::config(
            "The in-memory profile has no database URL",
        )),
    }
}

/// Get required environment variable or return error
pub(crate) fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
