use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

const MIGRATION_SQL: &str = include_str!("../../migrations/001_initial_schema.sql");

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    for (i, statement) in split_sql_statements(MIGRATION_SQL).iter().enumerate() {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to execute migration statement {}", i + 1))?;
    }

    info!("Database migrations completed successfully");
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }

        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            statements.push(current.trim().to_string());
            current = String::new();
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}
