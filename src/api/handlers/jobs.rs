use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::JOB_TAG;
use crate::api::dto::{
    CreateJobRequest, ErrorResponse, JobResponse, ListQuery, PagedResponse, PersonResponse,
    UpdateJobRequest,
};
use crate::error::AppResult;
use crate::models::{JobSortField, PersonSortField};
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

pub fn job_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_jobs, create_job))
        .routes(routes!(get_job, update_job, delete_job))
        .routes(routes!(list_job_persons))
}

/// Accepts `sort_fields` as well as `sort_field`.
#[utoipa::path(
    get,
    path = "/jobs",
    tag = JOB_TAG,
    params(ListQuery),
    responses(
        (status = 200, description = "A page of jobs", body = PagedResponse<JobResponse>),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_jobs(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> AppResult<Json<PagedResponse<JobResponse>>> {
    let page = query.page_request::<JobSortField>()?;
    let jobs = state.services.jobs.list(page).await?;
    Ok(Json(PagedResponse::new(jobs.map(JobResponse::from), &page)))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}",
    tag = JOB_TAG,
    params(("id" = i32, Path, description = "Job id")),
    responses(
        (status = 200, description = "The job", body = JobResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_job(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<JobResponse>> {
    let job = state.services.jobs.get(id).await?;
    Ok(Json(job.into()))
}

#[utoipa::path(
    get,
    path = "/jobs/{id}/persons",
    tag = JOB_TAG,
    params(("id" = i32, Path, description = "Job id"), ListQuery),
    responses(
        (status = 200, description = "Persons holding the job", body = PagedResponse<PersonResponse>),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_job_persons(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> AppResult<Json<PagedResponse<PersonResponse>>> {
    let page = query.page_request::<PersonSortField>()?;
    let persons = state.services.jobs.list_persons(id, page).await?;
    Ok(Json(PagedResponse::new(persons.map(PersonResponse::from), &page)))
}

#[utoipa::path(
    post,
    path = "/jobs",
    tag = JOB_TAG,
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_job(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateJobRequest>,
) -> AppResult<(StatusCode, Json<JobResponse>)> {
    let job = state.services.jobs.create(payload.into_new_job()).await?;
    Ok((StatusCode::CREATED, Json(job.into())))
}

#[utoipa::path(
    put,
    path = "/jobs/{id}",
    tag = JOB_TAG,
    params(("id" = i32, Path, description = "Job id")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateJobRequest>,
) -> AppResult<Json<JobResponse>> {
    let job = state
        .services
        .jobs
        .update(id, payload.into_update_job())
        .await?;
    Ok(Json(job.into()))
}

#[utoipa::path(
    delete,
    path = "/jobs/{id}",
    tag = JOB_TAG,
    params(("id" = i32, Path, description = "Job id")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn delete_job(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    state.services.jobs.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
