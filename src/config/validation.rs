//! Range and format checks run after the layered configuration is merged.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseBackend, DatabaseConfig, FileSettings, LoggerSettings, ServerConfig, Settings,
};
use crate::logger::{LogFormat, RotationStrategy, parse_level};

const POSTGRES_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// The memory backend only needs sane pool numbers; Postgres also needs a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == DatabaseBackend::Postgres {
            if self.url.is_empty() {
                return Err(ConfigError::validation(
                    "database.url",
                    "Database URL is required for the postgres backend.",
                ));
            }

            if !self.is_valid_database_url() {
                return Err(ConfigError::validation(
                    "database.url",
                    "Invalid database URL format. Expected postgres://[user:password@]host[:port]/database",
                ));
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections".to_string(),
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }

    fn is_valid_database_url(&self) -> bool {
        POSTGRES_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        self.format.parse::<LogFormat>().map_err(|e| {
            ConfigError::validation("logger.file.format".to_string(), e.to_string())
        })?;

        self.rotation.strategy.parse::<RotationStrategy>().map_err(|e| {
            ConfigError::validation("logger.file.rotation.strategy".to_string(), e.to_string())
        })?;

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_level(&self.level)
            .map_err(|e| ConfigError::validation("logger.level".to_string(), e.to_string()))?;

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one log output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl Settings {
    /// Returns the first validation error across all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.jwt.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/orgchart".to_string();
        settings.jwt.secret = "0123456789abcdef0123456789abcdef".to_string();
        settings
    }

    fn failing_field(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_settings() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_server_rejects_zero_values() {
        let mut server = ServerConfig::default();
        server.port = 0;
        assert_eq!(failing_field(server.validate()), "server.port");

        let mut server = ServerConfig::default();
        server.request_timeout = 0;
        assert_eq!(failing_field(server.validate()), "server.request_timeout");

        let mut server = ServerConfig::default();
        server.keep_alive_timeout = 0;
        assert_eq!(failing_field(server.validate()), "server.keep_alive_timeout");
    }

    #[test]
    fn test_postgres_requires_url() {
        let db = DatabaseConfig::default();
        assert_eq!(failing_field(db.validate()), "database.url");

        let db = DatabaseConfig {
            url: "mysql://localhost/orgchart".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(failing_field(db.validate()), "database.url");

        for url in ["postgres://u:p@db:5432/org", "postgresql://localhost/org"] {
            let db = DatabaseConfig {
                url: url.to_string(),
                ..DatabaseConfig::default()
            };
            assert!(db.validate().is_ok(), "{url} should be accepted");
        }
    }

    #[test]
    fn test_memory_backend_ignores_url() {
        let db = DatabaseConfig {
            backend: DatabaseBackend::Memory,
            ..DatabaseConfig::default()
        };
        assert!(db.validate().is_ok());
    }

    #[test]
    fn test_pool_bounds() {
        let mut db = valid_settings().database;
        db.min_connections = 20;
        assert_eq!(failing_field(db.validate()), "database.min_connections");

        db.min_connections = 0;
        assert!(db.validate().is_ok());

        db.max_connections = 0;
        assert_eq!(failing_field(db.validate()), "database.max_connections");
    }

    #[test]
    fn test_logger_settings() {
        let mut logger = LoggerSettings::default();
        assert!(logger.validate().is_ok());

        logger.level = "verbose".to_string();
        assert_eq!(failing_field(logger.validate()), "logger.level");

        let mut logger = LoggerSettings::default();
        logger.file.enabled = true;
        logger.file.path = "  ".to_string();
        assert_eq!(failing_field(logger.validate()), "logger.file.path");

        let mut logger = LoggerSettings::default();
        logger.file.rotation.strategy = "count".to_string();
        assert_eq!(
            failing_field(logger.validate()),
            "logger.file.rotation.strategy"
        );

        let mut logger = LoggerSettings::default();
        logger.console.enabled = false;
        assert_eq!(failing_field(logger.validate()), "logger");
    }

    #[test]
    fn test_settings_reports_jwt_problems() {
        let mut settings = valid_settings();
        settings.jwt.secret = "too-short".to_string();
        assert_eq!(failing_field(settings.validate()), "jwt.secret");
    }
}
