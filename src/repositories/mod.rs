//! Repository layer for data access operations.
//!
//! Services talk to the traits in [`traits`]; the backend behind them is
//! picked once at startup.

mod memory;
mod postgres;
mod traits;

pub use memory::MemoryStore;
pub use postgres::{
    PgAccountRepository, PgDepartmentRepository, PgJobRepository, PgPersonRepository,
};
pub use traits::{AccountRepository, DepartmentRepository, JobRepository, PersonRepository};

use std::sync::Arc;

use crate::db::AsyncDbPool;
use crate::error::AppError;

/// Raised by `PersonRepository::update` when the new manager already reports,
/// directly or not, to the person being updated.
pub(crate) fn management_cycle(manager_id: i32) -> AppError {
    AppError::validation(
        "manager_id",
        format!("person {manager_id} would create a management cycle"),
    )
}

/// Aggregates all repositories for convenient access.
///
/// Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Repositories {
    pub persons: Arc<dyn PersonRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub accounts: Arc<dyn AccountRepository>,
}

impl Repositories {
    pub fn postgres(pool: AsyncDbPool) -> Self {
        Self {
            persons: Arc::new(PgPersonRepository::new(pool.clone())),
            departments: Arc::new(PgDepartmentRepository::new(pool.clone())),
            jobs: Arc::new(PgJobRepository::new(pool.clone())),
            accounts: Arc::new(PgAccountRepository::new(pool)),
        }
    }

    /// All four repositories share one store so deletes can clear references.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            persons: store.clone(),
            departments: store.clone(),
            jobs: store.clone(),
            accounts: store,
        }
    }
}
