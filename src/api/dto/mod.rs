//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain; `error` and `pagination` are shared.

mod auth;
mod department;
mod error;
mod health;
mod job;
mod pagination;
mod person;

pub use auth::{AccountResponse, AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest};
pub use department::{CreateDepartmentRequest, DepartmentResponse, UpdateDepartmentRequest};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use job::{CreateJobRequest, JobResponse, UpdateJobRequest};
pub use pagination::{ListQuery, PagedResponse, PaginationMeta};
pub use person::{CreatePersonRequest, PersonResponse, UpdatePersonRequest};
