use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    Department, DepartmentSortField, NewDepartment, Page, PageRequest, UpdateDepartment,
};
use crate::repositories::DepartmentRepository;
use crate::schema::departments;

#[derive(Clone)]
pub struct PgDepartmentRepository {
    pool: AsyncDbPool,
}

impl PgDepartmentRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    async fn create(&self, new_department: NewDepartment) -> AppResult<Department> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(departments::table)
            .values(&new_department)
            .returning(Department::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Department>> {
        let mut conn = self.pool.get().await?;

        departments::table
            .find(id)
            .select(Department::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list(&self, page: PageRequest<DepartmentSortField>) -> AppResult<Page<Department>> {
        let mut conn = self.pool.get().await?;

        let total: i64 = departments::table.count().get_result(&mut conn).await?;

        let query = departments::table.into_boxed();
        let query = match page.sort_field {
            DepartmentSortField::Id => order_by!(query, departments::id, page.sort_order),
            DepartmentSortField::Name => order_by!(query, departments::name, page.sort_order),
            DepartmentSortField::CreatedAt => {
                order_by!(query, departments::created_at, page.sort_order)
            }
            DepartmentSortField::UpdatedAt => {
                order_by!(query, departments::updated_at, page.sort_order)
            }
        };

        let items = query
            .then_order_by(departments::id.asc())
            .limit(page.limit)
            .offset(page.offset)
            .select(Department::as_select())
            .load(&mut conn)
            .await?;

        Ok(Page { items, total })
    }

    async fn update(&self, id: i32, changes: UpdateDepartment) -> AppResult<Option<Department>> {
        let mut conn = self.pool.get().await?;

        diesel::update(departments::table.find(id))
            .set(&changes)
            .returning(Department::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(departments::table.find(id))
            .execute(&mut conn)
            .await?;
        Ok(deleted > 0)
    }
}
