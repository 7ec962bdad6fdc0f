//! Diesel-backed repositories sharing one async connection pool.

/// Applies `ORDER BY column ASC|DESC` to a boxed query. Postgres puts NULLs
/// last when ascending and first when descending.
macro_rules! order_by {
    ($query:expr, $column:expr, $order:expr) => {
        match $order {
            $crate::models::SortOrder::Asc => $query.order_by($column.asc()),
            $crate::models::SortOrder::Desc => $query.order_by($column.desc()),
        }
    };
}

mod account_repo;
mod department_repo;
mod job_repo;
mod person_repo;

pub use account_repo::PgAccountRepository;
pub use department_repo::PgDepartmentRepository;
pub use job_repo::PgJobRepository;
pub use person_repo::PgPersonRepository;
