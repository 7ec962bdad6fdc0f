//! Applies command line overrides on top of file and environment configuration.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Holds the loaded configuration until CLI overrides are applied.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads configuration honoring `--config` and `--env`.
    ///
    /// Validation is deferred to [`merge_cli_args`](Self::merge_cli_args) so a
    /// flag such as `--backend memory` can still make an incomplete file valid.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        tracing::debug!(
            environment = %loader.environment(),
            config_dir = %loader.config_dir().display(),
            "Loading configuration"
        );

        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Returns the validated configuration with CLI values taking priority.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(command) = &cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve {
                host,
                port,
                backend,
                log_level,
                dry_run: _,
            } => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                if let Some(backend) = backend {
                    config.database.backend = (*backend).into();
                }
                // beats --verbose/--quiet
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
            }
            Commands::Migrate { .. } => {}
        }
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DatabaseBackend;
    use clap::Parser;

    fn valid_base_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/orgchart".to_string();
        config.jwt.secret = "a".repeat(32);
        config
    }

    fn merge(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(valid_base_config())
            .merge_cli_args(&cli)
            .unwrap()
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        assert_eq!(merge(&["orgchart-rs", "--verbose"]).logger.level, "debug");
        assert_eq!(merge(&["orgchart-rs", "--quiet"]).logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merge(&[
            "orgchart-rs",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--backend",
            "memory",
        ]);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
    }

    #[test]
    fn test_command_log_level_beats_global_flag() {
        let config = merge(&["orgchart-rs", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_memory_backend_makes_missing_url_valid() {
        let mut base = valid_base_config();
        base.database.url.clear();
        let merger = ConfigurationMerger::new(base);

        let serve = Cli::try_parse_from(["orgchart-rs", "serve"]).unwrap();
        assert!(merger.merge_cli_args(&serve).is_err());

        let memory = Cli::try_parse_from(["orgchart-rs", "serve", "--backend", "memory"]).unwrap();
        assert!(merger.merge_cli_args(&memory).is_ok());
    }

    #[test]
    fn test_merge_does_not_touch_base() {
        let merger = ConfigurationMerger::new(valid_base_config());
        let cli = Cli::try_parse_from(["orgchart-rs", "serve", "--port", "9000"]).unwrap();
        merger.merge_cli_args(&cli).unwrap();
        assert_eq!(merger.config(), &valid_base_config());
    }
}
