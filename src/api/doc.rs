use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const PERSON_TAG: &str = "Persons";
pub const DEPARTMENT_TAG: &str = "Departments";
pub const JOB_TAG: &str = "Jobs";
pub const AUTH_TAG: &str = "Auth";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "orgchart-rs",
        description = "Org chart API over persons, departments and jobs",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::PaginationMeta,
        )
    ),
    tags(
        (name = PERSON_TAG, description = "Person endpoints"),
        (name = DEPARTMENT_TAG, description = "Department endpoints"),
        (name = JOB_TAG, description = "Job endpoints"),
        (name = AUTH_TAG, description = "Registration, login and tokens"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer Token Authentication"))
                        .build(),
                ),
            )
        }
    }
}
