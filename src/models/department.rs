use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::departments)]
pub struct NewDepartment {
    pub name: String,
}

/// `updated_at` is always set, so the changeset is never empty.
#[derive(Debug, AsChangeset, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::departments)]
pub struct UpdateDepartment {
    pub name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateDepartment {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            updated_at: Utc::now(),
        }
    }

    pub fn apply_to(&self, department: &mut Department) {
        if let Some(name) = &self.name {
            department.name = name.clone();
        }
        department.updated_at = self.updated_at;
    }
}
