use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::person::{non_null, not_blank};
use crate::models::{Job, NewJob, UpdateJob};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Staff Engineer")]
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateJobRequest {
    #[validate(
        length(min = 1, max = 255, message = "title must be between 1 and 255 characters"),
        custom(function = "not_blank")
    )]
    #[schema(example = "Staff Engineer")]
    pub title: String,
}

impl CreateJobRequest {
    pub fn into_new_job(self) -> NewJob {
        NewJob {
            title: self.title.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateJobRequest {
    #[validate(
        length(min = 1, max = 255, message = "title must be between 1 and 255 characters"),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "non_null")]
    pub title: Option<String>,
}

impl UpdateJobRequest {
    pub fn into_update_job(self) -> UpdateJob {
        UpdateJob::new(self.title.map(|t| t.trim().to_string()))
    }
}
