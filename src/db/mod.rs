pub mod categories;
pub mod schema;

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Numeric code the driver convention attaches to uniqueness-constraint
/// violations in its diagnostic text.
pub const DUPLICATE_KEY_CODE: u32 = 11000;

/// Errors surfaced by the persistence layer, tagged by category so the
/// classifier never has to sniff the shape of a dynamic error object.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed identifier / type coercion failure.
    #[error("cast failed for {path}: {value}")]
    Cast { path: String, value: String },

    /// Uniqueness-constraint violation, carrying the raw driver diagnostic.
    #[error("duplicate key error: {errmsg}")]
    DuplicateKey { errmsg: String },

    /// Aggregated field-validation failures keyed by field name.
    #[error("validation failed for {} field(s)", .errors.len())]
    Validation { errors: BTreeMap<String, String> },

    /// Any other driver fault. Skips classification.
    #[error("database error: {message}")]
    Database { message: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::DuplicateKey {
                    errmsg: db_err.message().to_string(),
                };
            }
        }
        Self::Database {
            message: err.to_string(),
        }
    }
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
        .connect(&config.url)
        .await
        .context("Failed to create database connection pool")
}

pub async fn test_connection(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Failed to test database connection")?;
    Ok(())
}
