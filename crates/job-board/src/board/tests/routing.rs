use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::board::domain::{JobFilter, JobId};
use crate::board::router::{create_job_handler, job_handler, list_jobs_handler};
use crate::board::{board_router, InMemoryBoardRepository};
use crate::identity::Role;
use crate::session::{Caller, Credentials, SessionRegistry, SessionToken};

fn caller(session: crate::session::Session) -> Caller {
    Caller {
        token: SessionToken("test".to_string()),
        session,
    }
}

#[tokio::test]
async fn create_job_handler_returns_created() {
    let (service, _) = build_service();
    let response = create_job_handler::<InMemoryBoardRepository>(
        State(Arc::new(service)),
        caller(employer()),
        Json(draft()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["title"], json!("Senior Rust Engineer"));
    assert_eq!(payload["employer"], json!("hiring@acme.io"));
}

#[tokio::test]
async fn create_job_handler_forbids_job_seekers() {
    let (service, _) = build_service();
    let response = create_job_handler::<InMemoryBoardRepository>(
        State(Arc::new(service)),
        caller(seeker()),
        Json(draft()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload = read_json_body(response).await;
    assert_eq!(payload["kind"], json!("forbidden"));
}

#[tokio::test]
async fn job_handler_returns_not_found_for_unknown_ids() {
    let (service, _) = build_service();
    let response =
        job_handler::<InMemoryBoardRepository>(State(Arc::new(service)), Path(404)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_jobs_handler_applies_filter() {
    let (service, _) = build_service();
    service
        .create_job(&employer(), draft(), now())
        .expect("posted");
    let service = Arc::new(service);

    let response = list_jobs_handler::<InMemoryBoardRepository>(
        State(service.clone()),
        Query(JobFilter {
            keyword: Some("cobol".to_string()),
            location: None,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]));

    let response = list_jobs_handler::<InMemoryBoardRepository>(
        State(service),
        Query(JobFilter::default()),
    )
    .await;
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn apply_route_requires_bearer_session() {
    let (service, _) = build_service();
    let job = service
        .create_job(&employer(), draft(), now())
        .expect("posted");
    let registry = Arc::new(SessionRegistry::default());
    let issued = registry
        .login(
            Credentials {
                email: "priya@example.com".to_string(),
                password: None,
                role: Role::JobSeeker,
            },
            Utc::now(),
        )
        .expect("login");
    let router = board_router(Arc::new(service)).layer(Extension(registry));

    let body = serde_json::to_vec(&application_input(job.id)).expect("encode");
    let anonymous = router
        .clone()
        .oneshot(
            Request::post("/api/v1/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.clone()))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .oneshot(
            Request::post("/api/v1/applications")
                .header(header::CONTENT_TYPE, "application/json")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", issued.token.as_str()),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["job_id"], json!(JobId(1).0));
    assert_eq!(payload["status"], json!("applied"));
}
