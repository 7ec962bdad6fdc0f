use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
    pub manager_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::persons)]
pub struct NewPerson {
    pub name: String,
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
    pub manager_id: Option<i32>,
}

/// Partial update. The outer `Option` means "leave unchanged" and
/// `Some(None)` clears a reference.
#[derive(Debug, AsChangeset, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::persons)]
pub struct UpdatePerson {
    pub name: Option<String>,
    pub department_id: Option<Option<i32>>,
    pub job_id: Option<Option<i32>>,
    pub manager_id: Option<Option<i32>>,
    pub updated_at: DateTime<Utc>,
}

impl Default for UpdatePerson {
    fn default() -> Self {
        Self {
            name: None,
            department_id: None,
            job_id: None,
            manager_id: None,
            updated_at: Utc::now(),
        }
    }
}

impl UpdatePerson {
    pub fn apply_to(&self, person: &mut Person) {
        if let Some(name) = &self.name {
            person.name = name.clone();
        }
        if let Some(department_id) = self.department_id {
            person.department_id = department_id;
        }
        if let Some(job_id) = self.job_id {
            person.job_id = job_id;
        }
        if let Some(manager_id) = self.manager_id {
            person.manager_id = manager_id;
        }
        person.updated_at = self.updated_at;
    }
}

/// Equality filters for listing persons; `None` means no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
    pub manager_id: Option<i32>,
}

impl PersonFilter {
    pub fn department(id: i32) -> Self {
        Self {
            department_id: Some(id),
            ..Self::default()
        }
    }

    pub fn job(id: i32) -> Self {
        Self {
            job_id: Some(id),
            ..Self::default()
        }
    }

    pub fn reports_to(id: i32) -> Self {
        Self {
            manager_id: Some(id),
            ..Self::default()
        }
    }

    pub fn matches(&self, person: &Person) -> bool {
        let check = |wanted: Option<i32>, actual: Option<i32>| {
            wanted.is_none_or(|w| actual == Some(w))
        };
        check(self.department_id, person.department_id)
            && check(self.job_id, person.job_id)
            && check(self.manager_id, person.manager_id)
    }
}
