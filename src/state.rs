//! Application state for Axum web framework.

use crate::config::JwtConfig;
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// Shared state handed to every handler. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Present only with the Postgres backend; used by health checks
    pub db_pool: Option<AsyncDbPool>,
    /// JWT configuration for token validation in the auth middleware
    pub jwt_config: JwtConfig,
}

impl AppState {
    pub fn postgres(pool: AsyncDbPool, jwt_config: JwtConfig) -> Self {
        let repos = Repositories::postgres(pool.clone());
        Self {
            services: Services::new(repos, jwt_config.clone()),
            db_pool: Some(pool),
            jwt_config,
        }
    }

    /// State over a fresh, empty in-memory store.
    pub fn in_memory(jwt_config: JwtConfig) -> Self {
        Self {
            services: Services::new(Repositories::in_memory(), jwt_config.clone()),
            db_pool: None,
            jwt_config,
        }
    }
}
