//! Layered configuration for orgchart-rs.
//!
//! Priority, lowest first: `default.toml`, `{environment}.toml`, `local.toml`,
//! then `ORGCHART_*` environment variables.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{DatabaseBackend, DatabaseConfig, JwtConfig, Settings};
