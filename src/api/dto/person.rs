//! Person request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::{NewPerson, Person, UpdatePerson};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PersonResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
    pub manager_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
            department_id: person.department_id,
            job_id: person.job_id,
            manager_id: person.manager_id,
            created_at: person.created_at,
            updated_at: person.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePersonRequest {
    #[validate(
        length(min = 1, max = 255, message = "name must be between 1 and 255 characters"),
        custom(function = "not_blank")
    )]
    #[schema(example = "Ada Lovelace", min_length = 1, max_length = 255)]
    pub name: String,
    pub department_id: Option<i32>,
    pub job_id: Option<i32>,
    pub manager_id: Option<i32>,
}

impl CreatePersonRequest {
    pub fn into_new_person(self) -> NewPerson {
        NewPerson {
            name: self.name.trim().to_string(),
            department_id: self.department_id,
            job_id: self.job_id,
            manager_id: self.manager_id,
        }
    }
}

/// Omitted fields stay as they are; an explicit `null` clears a reference.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdatePersonRequest {
    #[validate(
        length(min = 1, max = 255, message = "name must be between 1 and 255 characters"),
        custom(function = "not_blank")
    )]
    #[serde(default, deserialize_with = "non_null")]
    #[schema(example = "Ada King")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub department_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub job_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub manager_id: Option<Option<i32>>,
}

impl UpdatePersonRequest {
    pub fn into_update_person(self) -> UpdatePerson {
        UpdatePerson {
            name: self.name.map(|n| n.trim().to_string()),
            department_id: self.department_id,
            job_id: self.job_id,
            manager_id: self.manager_id,
            ..UpdatePerson::default()
        }
    }
}

/// Distinguishes a present `null` (`Some(None)`) from a missing key (`None`,
/// via `#[serde(default)]`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Optional field that may be omitted but never set to `null`.
pub(crate) fn non_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    match Option::<T>::deserialize(deserializer)? {
        Some(value) => Ok(Some(value)),
        None => Err(serde::de::Error::custom("value cannot be null")),
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}
