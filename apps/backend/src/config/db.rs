use std::env;

use crate::error::AppError;

/// Which match store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Process-local map; state is lost on restart.
    InMemory,
    Postgres,
    /// SQLite `:memory:` through SeaORM; used by tests.
    SqliteMemory,
}

impl StoreKind {
    /// `PICMATCH_STORE` = `memory` | `postgres` | `sqlite-memory` (default `postgres`).
    pub fn from_env() -> Result<Self, AppError> {
        match env::var("PICMATCH_STORE") {
            Err(_) => Ok(StoreKind::Postgres),
            Ok(raw) => Self::parse(&raw),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "inmemory" => Ok(StoreKind::InMemory),
            "postgres" | "pg" => Ok(StoreKind::Postgres),
            "sqlite-memory" | "sqlite" => Ok(StoreKind::SqliteMemory),
            other => Err(AppError::config(format!(
                "PICMATCH_STORE must be one of memory, postgres, sqlite-memory; got '{other}'"
            ))),
        }
    }
}

/// Builds a database URL for the given store kind.
pub fn db_url(kind: StoreKind) -> Result<String, AppError> {
    match kind {
        StoreKind::Postgres => {
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = must_var("PICMATCH_DB")?;
            let username = must_var("APP_DB_USER")?;
            let password = must_var("APP_DB_PASSWORD")?;
            Ok(format!(
                "postgresql://{username}:{password}@{host}:{port}/{db_name}"
            ))
        }
        StoreKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
        StoreKind::InMemory => Err(AppError::config(
            "The in-memory store has no database URL",
        )),
    }
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
