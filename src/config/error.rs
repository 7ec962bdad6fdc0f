use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required configuration file {} not found", path.display())]
    MissingFile { path: PathBuf },

    /// Sources merged fine but do not fit [`Settings`](super::Settings).
    #[error("configuration does not match the settings layout: {0}")]
    Deserialize(#[source] config::ConfigError),

    #[error("invalid {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("unknown environment '{0}', expected development, test, staging or production")]
    UnknownEnvironment(String),

    #[error("conflicting configuration sources: {0}")]
    ConflictingSources(String),

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Settings key the error points at, `settings` when it spans the whole file.
    pub fn key(&self) -> &str {
        match self {
            ConfigError::ValidationError { field, .. } => field,
            ConfigError::UnknownEnvironment(_) => "environment",
            _ => "settings",
        }
    }
}
