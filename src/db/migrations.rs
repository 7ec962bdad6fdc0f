//! Embedded diesel migrations, run on a blocking thread through
//! `AsyncConnectionWrapper` so no libpq is needed.

use diesel::Connection;
use diesel::migration::MigrationVersion;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type BlockingConnection = AsyncConnectionWrapper<AsyncPgConnection>;

fn migration_error(operation: &str, error: impl std::fmt::Display) -> AppError {
    AppError::Database {
        operation: operation.to_string(),
        source: anyhow::anyhow!("{error}"),
    }
}

async fn with_connection<T, F>(url: &str, operation: &'static str, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut BlockingConnection) -> AppResult<T> + Send + 'static,
{
    let url = url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn =
            BlockingConnection::establish(&url).map_err(|e| migration_error(operation, e))?;
        f(&mut conn)
    })
    .await
    .map_err(|e| migration_error(operation, e))?
}

fn versions(applied: Vec<MigrationVersion<'_>>) -> Vec<String> {
    applied.iter().map(|v| v.to_string()).collect()
}

/// Applies every pending migration and returns the applied versions.
pub async fn run_pending_migrations(url: &str) -> AppResult<Vec<String>> {
    with_connection(url, "run migrations", |conn| {
        conn.run_pending_migrations(MIGRATIONS)
            .map(versions)
            .map_err(|e| migration_error("run migrations", e))
    })
    .await
}

/// Names of migrations not yet applied.
pub async fn pending_migrations(url: &str) -> AppResult<Vec<String>> {
    with_connection(url, "list pending migrations", |conn| {
        conn.pending_migrations(MIGRATIONS)
            .map(|pending| pending.iter().map(|m| m.name().to_string()).collect())
            .map_err(|e| migration_error("list pending migrations", e))
    })
    .await
}

/// Reverts up to `steps` migrations, newest first. Stops early once nothing
/// is left to revert.
pub async fn revert_migrations(url: &str, steps: u32) -> AppResult<Vec<String>> {
    with_connection(url, "revert migrations", move |conn| {
        let mut reverted = Vec::new();
        for _ in 0..steps {
            let applied = conn
                .applied_migrations()
                .map_err(|e| migration_error("revert migrations", e))?;
            if applied.is_empty() {
                break;
            }
            let version = conn
                .revert_last_migration(MIGRATIONS)
                .map_err(|e| migration_error("revert migrations", e))?;
            reverted.push(version.to_string());
        }
        Ok(reverted)
    })
    .await
}
