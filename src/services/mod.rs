//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod auth_service;
mod department_service;
mod job_service;
mod person_service;

pub use auth_service::{AuthService, AuthSession};
pub use department_service::DepartmentService;
pub use job_service::JobService;
pub use person_service::PersonService;

use crate::config::JwtConfig;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since repositories sit behind `Arc`.
#[derive(Clone)]
pub struct Services {
    pub persons: PersonService,
    pub departments: DepartmentService,
    pub jobs: JobService,
    pub auth: AuthService,
}

impl Services {
    pub fn new(repos: Repositories, jwt_config: JwtConfig) -> Self {
        Self {
            persons: PersonService::new(
                repos.persons.clone(),
                repos.departments.clone(),
                repos.jobs.clone(),
            ),
            departments: DepartmentService::new(repos.departments, repos.persons.clone()),
            jobs: JobService::new(repos.jobs, repos.persons),
            auth: AuthService::new(repos.accounts, jwt_config),
        }
    }
}
