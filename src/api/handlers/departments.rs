use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::DEPARTMENT_TAG;
use crate::api::dto::{
    CreateDepartmentRequest, DepartmentResponse, ErrorResponse, ListQuery, PagedResponse,
    PersonResponse, UpdateDepartmentRequest,
};
use crate::error::AppResult;
use crate::models::{DepartmentSortField, PersonSortField};
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

pub fn department_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_departments, create_department))
        .routes(routes!(get_department, update_department, delete_department))
        .routes(routes!(list_department_persons))
}

#[utoipa::path(
    get,
    path = "/departments",
    tag = DEPARTMENT_TAG,
    params(ListQuery),
    responses(
        (status = 200, description = "A page of departments", body = PagedResponse<DepartmentResponse>),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_departments(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> AppResult<Json<PagedResponse<DepartmentResponse>>> {
    let page = query.page_request::<DepartmentSortField>()?;
    let departments = state.services.departments.list(page).await?;
    Ok(Json(PagedResponse::new(
        departments.map(DepartmentResponse::from),
        &page,
    )))
}

#[utoipa::path(
    get,
    path = "/departments/{id}",
    tag = DEPARTMENT_TAG,
    params(("id" = i32, Path, description = "Department id")),
    responses(
        (status = 200, description = "The department", body = DepartmentResponse),
        (status = 404, description = "Unknown department", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DepartmentResponse>> {
    let department = state.services.departments.get(id).await?;
    Ok(Json(department.into()))
}

#[utoipa::path(
    get,
    path = "/departments/{id}/persons",
    tag = DEPARTMENT_TAG,
    params(("id" = i32, Path, description = "Department id"), ListQuery),
    responses(
        (status = 200, description = "Members of the department", body = PagedResponse<PersonResponse>),
        (status = 404, description = "Unknown department", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_department_persons(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> AppResult<Json<PagedResponse<PersonResponse>>> {
    let page = query.page_request::<PersonSortField>()?;
    let persons = state.services.departments.list_persons(id, page).await?;
    Ok(Json(PagedResponse::new(persons.map(PersonResponse::from), &page)))
}

#[utoipa::path(
    post,
    path = "/departments",
    tag = DEPARTMENT_TAG,
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_department(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDepartmentRequest>,
) -> AppResult<(StatusCode, Json<DepartmentResponse>)> {
    let department = state
        .services
        .departments
        .create(payload.into_new_department())
        .await?;
    Ok((StatusCode::CREATED, Json(department.into())))
}

#[utoipa::path(
    put,
    path = "/departments/{id}",
    tag = DEPARTMENT_TAG,
    params(("id" = i32, Path, description = "Department id")),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Unknown department", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateDepartmentRequest>,
) -> AppResult<Json<DepartmentResponse>> {
    let department = state
        .services
        .departments
        .update(id, payload.into_update_department())
        .await?;
    Ok(Json(department.into()))
}

/// Members stay, with their department cleared.
#[utoipa::path(
    delete,
    path = "/departments/{id}",
    tag = DEPARTMENT_TAG,
    params(("id" = i32, Path, description = "Department id")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Unknown department", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.departments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
