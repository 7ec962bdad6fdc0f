use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    Job, JobSortField, NewJob, Page, PageRequest, Person, PersonFilter, PersonSortField,
    UpdateJob,
};
use crate::repositories::{JobRepository, PersonRepository};

#[derive(Clone)]
pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    persons: Arc<dyn PersonRepository>,
}

impl JobService {
    pub fn new(jobs: Arc<dyn JobRepository>, persons: Arc<dyn PersonRepository>) -> Self {
        Self { jobs, persons }
    }

    pub async fn list(&self, page: PageRequest<JobSortField>) -> AppResult<Page<Job>> {
        self.jobs.list(page).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Job> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("job", id))
    }

    /// Persons holding job `id`.
    pub async fn list_persons(
        &self,
        id: i32,
        page: PageRequest<PersonSortField>,
    ) -> AppResult<Page<Person>> {
        self.get(id).await?;
        self.persons.list(PersonFilter::job(id), page).await
    }

    pub async fn create(&self, new_job: NewJob) -> AppResult<Job> {
        self.jobs.create(new_job).await
    }

    pub async fn update(&self, id: i32, changes: UpdateJob) -> AppResult<Job> {
        self.jobs
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("job", id))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.jobs.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("job", id))
        }
    }
}
