//! Person business rules: reference checks and manager chains.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    NewPerson, Page, PageRequest, Person, PersonFilter, PersonSortField, UpdatePerson,
};
use crate::repositories::{DepartmentRepository, JobRepository, PersonRepository};

#[derive(Clone)]
pub struct PersonService {
    persons: Arc<dyn PersonRepository>,
    departments: Arc<dyn DepartmentRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl PersonService {
    pub fn new(
        persons: Arc<dyn PersonRepository>,
        departments: Arc<dyn DepartmentRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            persons,
            departments,
            jobs,
        }
    }

    pub async fn list(&self, page: PageRequest<PersonSortField>) -> AppResult<Page<Person>> {
        self.persons.list(PersonFilter::default(), page).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Person> {
        self.persons
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("person", id))
    }

    /// Direct reports of `id`. Fails with 404 when the manager is unknown.
    pub async fn list_reports(
        &self,
        id: i32,
        page: PageRequest<PersonSortField>,
    ) -> AppResult<Page<Person>> {
        self.get(id).await?;
        self.persons.list(PersonFilter::reports_to(id), page).await
    }

    pub async fn create(&self, new_person: NewPerson) -> AppResult<Person> {
        self.check_references(
            new_person.department_id,
            new_person.job_id,
            new_person.manager_id,
        )
        .await?;
        let person = self.persons.create(new_person).await?;
        tracing::debug!(person_id = person.id, "Person created");
        Ok(person)
    }

    /// Applies a partial update. Unknown ids give 404 before any reference
    /// is checked. The manager chain itself is checked by the repository in
    /// the same step as the write.
    pub async fn update(&self, id: i32, changes: UpdatePerson) -> AppResult<Person> {
        self.get(id).await?;
        if changes.manager_id == Some(Some(id)) {
            return Err(AppError::validation(
                "manager_id",
                "a person cannot manage themselves",
            ));
        }
        self.check_references(
            changes.department_id.flatten(),
            changes.job_id.flatten(),
            changes.manager_id.flatten(),
        )
        .await?;

        self.persons
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("person", id))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.persons.delete(id).await? {
            tracing::debug!(person_id = id, "Person deleted");
            Ok(())
        } else {
            Err(AppError::not_found("person", id))
        }
    }

    async fn check_references(
        &self,
        department_id: Option<i32>,
        job_id: Option<i32>,
        manager_id: Option<i32>,
    ) -> AppResult<()> {
        let department = async {
            match department_id {
                Some(id) => Ok(self.departments.find_by_id(id).await?.is_some()),
                None => Ok::<_, AppError>(true),
            }
        };
        let job = async {
            match job_id {
                Some(id) => Ok(self.jobs.find_by_id(id).await?.is_some()),
                None => Ok::<_, AppError>(true),
            }
        };
        let manager = async {
            match manager_id {
                Some(id) => Ok(self.persons.find_by_id(id).await?.is_some()),
                None => Ok::<_, AppError>(true),
            }
        };

        let (department, job, manager) = futures::try_join!(department, job, manager)?;
        missing_reference("department_id", "department", department_id, department)?;
        missing_reference("job_id", "job", job_id, job)?;
        missing_reference("manager_id", "person", manager_id, manager)
    }
}

fn missing_reference(field: &str, entity: &str, id: Option<i32>, found: bool) -> AppResult<()> {
    match id {
        Some(id) if !found => Err(AppError::validation(
            field,
            format!("{entity} {id} does not exist"),
        )),
        _ => Ok(()),
    }
}
