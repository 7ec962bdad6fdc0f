//! `serve` subcommand.

use crate::config::settings::{DatabaseBackend, Settings};
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Starts the server, or with `dry_run` only validates and prints a summary.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()?;
            return Ok(());
        }
        Server::new(self.config).run().await
    }

    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        let database = &self.config.database;
        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        match database.backend {
            DatabaseBackend::Postgres => println!(
                "✓ Storage: postgres (pool {}..{}, auto_migrate = {})",
                database.min_connections, database.max_connections, database.auto_migrate
            ),
            DatabaseBackend::Memory => println!("✓ Storage: in-memory"),
        }
        println!("✓ Log level: {}", self.config.logger.level);
        println!(
            "✓ Access tokens expire after {}h, refresh tokens after {}h",
            self.config.jwt.access_token_expiration, self.config.jwt.refresh_token_expiration
        );
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
