//! `migrate` subcommand.

use crate::config::settings::{DatabaseBackend, Settings};
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Applies pending migrations, lists them with `dry_run`, or reverts
    /// `rollback` steps.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        if self.config.database.backend == DatabaseBackend::Memory {
            return Err(AppError::validation(
                "database.backend",
                "Migrations only apply to the postgres backend",
            ));
        }
        if rollback == Some(0) {
            return Err(AppError::validation(
                "rollback_steps",
                "Number of rollback steps must be greater than 0",
            ));
        }
        self.config.database.validate()?;

        let url = &self.config.database.url;
        match (dry_run, rollback) {
            (true, _) => {
                let pending = pending_migrations(url).await?;
                if pending.is_empty() {
                    println!("✓ No pending migrations - database is up to date");
                } else {
                    println!("Found {} pending migration(s):", pending.len());
                    for name in &pending {
                        println!("  - {name}");
                    }
                    println!("\nRun without --dry-run to apply them");
                }
            }
            (false, Some(steps)) => {
                tracing::warn!(steps, "Reverting migrations");
                let reverted = revert_migrations(url, steps).await?;
                println!("✓ Rolled back {} migration(s)", reverted.len());
                for version in &reverted {
                    println!("  - {version}");
                }
                if reverted.len() < steps as usize {
                    println!("No applied migrations remain");
                }
            }
            (false, None) => {
                let applied = run_pending_migrations(url).await?;
                tracing::info!(count = applied.len(), "Applied migrations");
                if applied.is_empty() {
                    println!("✓ No migrations to apply - database is already up to date");
                } else {
                    println!("✓ Applied {} migration(s):", applied.len());
                    for version in &applied {
                        println!("  - {version}");
                    }
                }
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
