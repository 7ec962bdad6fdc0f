use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Job, JobSortField, NewJob, Page, PageRequest, UpdateJob};
use crate::repositories::JobRepository;
use crate::schema::jobs;

#[derive(Clone)]
pub struct PgJobRepository {
    pool: AsyncDbPool,
}

impl PgJobRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(&self, new_job: NewJob) -> AppResult<Job> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(jobs::table)
            .values(&new_job)
            .returning(Job::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Job>> {
        let mut conn = self.pool.get().await?;

        jobs::table
            .find(id)
            .select(Job::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list(&self, page: PageRequest<JobSortField>) -> AppResult<Page<Job>> {
        let mut conn = self.pool.get().await?;

        let total: i64 = jobs::table.count().get_result(&mut conn).await?;

        let query = jobs::table.into_boxed();
        let query = match page.sort_field {
            JobSortField::Id => order_by!(query, jobs::id, page.sort_order),
            JobSortField::Title => order_by!(query, jobs::title, page.sort_order),
            JobSortField::CreatedAt => order_by!(query, jobs::created_at, page.sort_order),
            JobSortField::UpdatedAt => order_by!(query, jobs::updated_at, page.sort_order),
        };

        let items = query
            .then_order_by(jobs::id.asc())
            .limit(page.limit)
            .offset(page.offset)
            .select(Job::as_select())
            .load(&mut conn)
            .await?;

        Ok(Page { items, total })
    }

    async fn update(&self, id: i32, changes: UpdateJob) -> AppResult<Option<Job>> {
        let mut conn = self.pool.get().await?;

        diesel::update(jobs::table.find(id))
            .set(&changes)
            .returning(Job::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(jobs::table.find(id)).execute(&mut conn).await?;
        Ok(deleted > 0)
    }
}
