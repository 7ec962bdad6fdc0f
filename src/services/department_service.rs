use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    Department, DepartmentSortField, NewDepartment, Page, PageRequest, Person, PersonFilter,
    PersonSortField, UpdateDepartment,
};
use crate::repositories::{DepartmentRepository, PersonRepository};

#[derive(Clone)]
pub struct DepartmentService {
    departments: Arc<dyn DepartmentRepository>,
    persons: Arc<dyn PersonRepository>,
}

impl DepartmentService {
    pub fn new(
        departments: Arc<dyn DepartmentRepository>,
        persons: Arc<dyn PersonRepository>,
    ) -> Self {
        Self {
            departments,
            persons,
        }
    }

    pub async fn list(
        &self,
        page: PageRequest<DepartmentSortField>,
    ) -> AppResult<Page<Department>> {
        self.departments.list(page).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Department> {
        self.departments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("department", id))
    }

    /// Members of department `id`.
    pub async fn list_persons(
        &self,
        id: i32,
        page: PageRequest<PersonSortField>,
    ) -> AppResult<Page<Person>> {
        self.get(id).await?;
        self.persons.list(PersonFilter::department(id), page).await
    }

    pub async fn create(&self, new_department: NewDepartment) -> AppResult<Department> {
        self.departments.create(new_department).await
    }

    pub async fn update(&self, id: i32, changes: UpdateDepartment) -> AppResult<Department> {
        self.departments
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("department", id))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.departments.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("department", id))
        }
    }
}
