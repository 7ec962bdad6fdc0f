use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::jobs)]
pub struct NewJob {
    pub title: String,
}

#[derive(Debug, AsChangeset, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::jobs)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateJob {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            updated_at: Utc::now(),
        }
    }

    pub fn apply_to(&self, job: &mut Job) {
        if let Some(title) = &self.title {
            job.title = title.clone();
        }
        job.updated_at = self.updated_at;
    }
}
