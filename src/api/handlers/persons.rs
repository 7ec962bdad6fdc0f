//! Person request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PERSON_TAG;
use crate::api::dto::{
    CreatePersonRequest, ErrorResponse, ListQuery, PagedResponse, PersonResponse,
    UpdatePersonRequest,
};
use crate::error::AppResult;
use crate::models::PersonSortField;
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

/// Routes:
/// - GET/POST /persons
/// - GET/PUT/DELETE /persons/{id}
/// - GET /persons/{id}/reports
pub fn person_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_persons, create_person))
        .routes(routes!(get_person, update_person, delete_person))
        .routes(routes!(list_reports))
}

#[utoipa::path(
    get,
    path = "/persons",
    tag = PERSON_TAG,
    params(ListQuery),
    responses(
        (status = 200, description = "A page of persons", body = PagedResponse<PersonResponse>),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_persons(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> AppResult<Json<PagedResponse<PersonResponse>>> {
    let page = query.page_request::<PersonSortField>()?;
    let persons = state.services.persons.list(page).await?;
    Ok(Json(PagedResponse::new(persons.map(PersonResponse::from), &page)))
}

#[utoipa::path(
    get,
    path = "/persons/{id}",
    tag = PERSON_TAG,
    params(("id" = i32, Path, description = "Person id")),
    responses(
        (status = 200, description = "The person", body = PersonResponse),
        (status = 404, description = "Unknown person", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<PersonResponse>> {
    let person = state.services.persons.get(id).await?;
    Ok(Json(person.into()))
}

/// Direct reports of a person.
#[utoipa::path(
    get,
    path = "/persons/{id}/reports",
    tag = PERSON_TAG,
    params(("id" = i32, Path, description = "Manager id"), ListQuery),
    responses(
        (status = 200, description = "A page of direct reports", body = PagedResponse<PersonResponse>),
        (status = 404, description = "Unknown manager", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_reports(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> AppResult<Json<PagedResponse<PersonResponse>>> {
    let page = query.page_request::<PersonSortField>()?;
    let reports = state.services.persons.list_reports(id, page).await?;
    Ok(Json(PagedResponse::new(reports.map(PersonResponse::from), &page)))
}

#[utoipa::path(
    post,
    path = "/persons",
    tag = PERSON_TAG,
    request_body = CreatePersonRequest,
    responses(
        (status = 201, description = "Person created", body = PersonResponse),
        (status = 400, description = "Invalid body or unknown reference", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_person(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePersonRequest>,
) -> AppResult<(StatusCode, Json<PersonResponse>)> {
    let person = state
        .services
        .persons
        .create(payload.into_new_person())
        .await?;
    Ok((StatusCode::CREATED, Json(person.into())))
}

/// Partial update. Send `null` to clear a reference.
#[utoipa::path(
    put,
    path = "/persons/{id}",
    tag = PERSON_TAG,
    params(("id" = i32, Path, description = "Person id")),
    request_body = UpdatePersonRequest,
    responses(
        (status = 200, description = "Person updated", body = PersonResponse),
        (status = 400, description = "Invalid body, unknown reference or manager cycle", body = ErrorResponse),
        (status = 404, description = "Unknown person", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdatePersonRequest>,
) -> AppResult<Json<PersonResponse>> {
    let person = state
        .services
        .persons
        .update(id, payload.into_update_person())
        .await?;
    Ok(Json(person.into()))
}

#[utoipa::path(
    delete,
    path = "/persons/{id}",
    tag = PERSON_TAG,
    params(("id" = i32, Path, description = "Person id")),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 404, description = "Unknown person", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.persons.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
