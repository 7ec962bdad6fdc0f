use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::person::{non_null, not_blank};
use crate::models::{Department, NewDepartment, UpdateDepartment};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Engineering")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentResponse {
    fn from(department: Department) -> Self {
        Self {
            id: department.id,
            name: department.name,
            created_at: department.created_at,
            updated_at: department.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(
        length(min = 1, max = 255, message = "name must be between 1 and 255 characters"),
        custom(function = "not_blank")
    )]
    #[schema(example = "Engineering")]
    pub name: String,
}

impl CreateDepartmentRequest {
    pub fn into_new_department(self) -> NewDepartment {
        NewDepartment {
            name: self.name.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateDepartmentRequest {
    #[validate(
        length(min = 1, max = 255, message = "name must be between 1 and 255 characters"),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "non_null")]
    #[schema(example = "Research")]
    pub name: Option<String>,
}

impl UpdateDepartmentRequest {
    pub fn into_update_department(self) -> UpdateDepartment {
        UpdateDepartment::new(self.name.map(|n| n.trim().to_string()))
    }
}
