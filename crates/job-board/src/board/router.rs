use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::domain::{ApplicationId, ApplicationInput, ApplicationStatus, JobDraft, JobFilter, JobId};
use super::repository::BoardRepository;
use super::service::{BoardServiceError, JobBoardService};
use crate::http::{error_response, kind};
use crate::identity::Principal;
use crate::session::Caller;
use crate::store::RepositoryError;

/// Router exposing posting and application endpoints.
pub fn board_router<R>(service: Arc<JobBoardService<R>>) -> Router
where
    R: BoardRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_jobs_handler::<R>).post(create_job_handler::<R>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(job_handler::<R>).delete(delete_job_handler::<R>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(job_applications_handler::<R>),
        )
        .route(
            "/api/v1/employers/:principal/jobs",
            get(employer_jobs_handler::<R>),
        )
        .route(
            "/api/v1/applications",
            get(my_applications_handler::<R>).post(apply_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            put(update_status_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate {
    pub(crate) status: ApplicationStatus,
}

pub(crate) async fn list_jobs_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Query(filter): Query<JobFilter>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.jobs(&filter) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn create_job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    caller: Caller,
    Json(draft): Json<JobDraft>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.create_job(&caller.session, draft, Utc::now()) {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Path(job_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.job(JobId(job_id)) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn delete_job_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    caller: Caller,
    Path(job_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.delete_job(&caller.session, JobId(job_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn employer_jobs_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    Path(principal): Path<String>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.jobs_by_employer(&Principal::new(principal)) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn apply_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    caller: Caller,
    Json(input): Json<ApplicationInput>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.apply(&caller.session, input, Utc::now()) {
        Ok(application) => (StatusCode::CREATED, Json(application)).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn my_applications_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    caller: Caller,
) -> Response
where
    R: BoardRepository + 'static,
{
    let candidate = caller.session.principal.clone();
    match service.applications_for_candidate(&caller.session, &candidate) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn job_applications_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    caller: Caller,
    Path(job_id): Path<u64>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.applications_for_job(&caller.session, JobId(job_id)) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(err) => board_error_response(err),
    }
}

pub(crate) async fn update_status_handler<R>(
    State(service): State<Arc<JobBoardService<R>>>,
    caller: Caller,
    Path(application_id): Path<u64>,
    Json(update): Json<StatusUpdate>,
) -> Response
where
    R: BoardRepository + 'static,
{
    match service.update_application_status(
        &caller.session,
        ApplicationId(application_id),
        update.status,
    ) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => board_error_response(err),
    }
}

fn board_error_response(err: BoardServiceError) -> Response {
    let (status, error_kind) = match &err {
        BoardServiceError::Forbidden(_) | BoardServiceError::NotOwner => {
            (StatusCode::FORBIDDEN, kind::FORBIDDEN)
        }
        BoardServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, kind::INVALID_REQUEST),
        BoardServiceError::JobNotFound(_)
        | BoardServiceError::ApplicationNotFound(_)
        | BoardServiceError::Repository(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, kind::NOT_FOUND)
        }
        BoardServiceError::AlreadyApplied(_)
        | BoardServiceError::Repository(RepositoryError::Conflict) => {
            (StatusCode::CONFLICT, kind::CONFLICT)
        }
        BoardServiceError::Repository(RepositoryError::Unavailable(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, kind::INTERNAL)
        }
    };
    error_response(status, error_kind, err.to_string())
}
