//! Storage seams. Each backend implements all four traits so services never
//! know whether rows live in Postgres or in process memory.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Account, Department, DepartmentSortField, Job, JobSortField, NewAccount, NewDepartment,
    NewJob, NewPerson, Page, PageRequest, Person, PersonFilter, PersonSortField,
    UpdateDepartment, UpdateJob, UpdatePerson,
};

#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn create(&self, new_person: NewPerson) -> AppResult<Person>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Person>>;

    /// Rows matching `filter`, ordered by the requested column then by id.
    async fn list(
        &self,
        filter: PersonFilter,
        page: PageRequest<PersonSortField>,
    ) -> AppResult<Page<Person>>;

    /// `None` when no row has `id`. A new `manager_id` is checked against the
    /// chain above it atomically with the write, so concurrent updates cannot
    /// close a loop between them.
    async fn update(&self, id: i32, changes: UpdatePerson) -> AppResult<Option<Person>>;

    /// Direct reports keep existing with `manager_id` cleared.
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn create(&self, new_department: NewDepartment) -> AppResult<Department>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Department>>;

    async fn list(&self, page: PageRequest<DepartmentSortField>) -> AppResult<Page<Department>>;

    async fn update(&self, id: i32, changes: UpdateDepartment) -> AppResult<Option<Department>>;

    /// Members keep existing with `department_id` cleared.
    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, new_job: NewJob) -> AppResult<Job>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Job>>;

    async fn list(&self, page: PageRequest<JobSortField>) -> AppResult<Page<Job>>;

    async fn update(&self, id: i32, changes: UpdateJob) -> AppResult<Option<Job>>;

    async fn delete(&self, id: i32) -> AppResult<bool>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `AppError::Duplicate` when the email is taken.
    async fn create(&self, new_account: NewAccount) -> AppResult<Account>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>>;
}
