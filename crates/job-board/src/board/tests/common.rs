use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::board::domain::{ApplicationInput, JobDraft, JobId};
use crate::board::repository::BoardRepository;
use crate::board::{ApplicationId, InMemoryBoardRepository, Job, JobApplication, JobBoardService};
use crate::identity::{Principal, Role};
use crate::session::Session;
use crate::store::RepositoryError;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn session(email: &str, role: Role) -> Session {
    Session {
        principal: Principal::new(email),
        role,
        started_at: now(),
    }
}

pub(super) fn employer() -> Session {
    session("hiring@acme.io", Role::Employer)
}

pub(super) fn rival_employer() -> Session {
    session("talent@globex.io", Role::Employer)
}

pub(super) fn seeker() -> Session {
    session("priya@example.com", Role::JobSeeker)
}

pub(super) fn admin() -> Session {
    session("admin@jobs.example", Role::Admin)
}

pub(super) fn draft() -> JobDraft {
    JobDraft {
        title: "  Senior Rust Engineer ".to_string(),
        company: "Acme".to_string(),
        location: "Bengaluru, KA".to_string(),
        salary: Some(2_400_000),
        description: "Own the settlement pipeline end to end.".to_string(),
        requirements: vec![
            "5+ years of systems work".to_string(),
            "   ".to_string(),
            "Tokio in production".to_string(),
        ],
    }
}

pub(super) fn application_input(job_id: JobId) -> ApplicationInput {
    ApplicationInput {
        job_id,
        cover_letter: "I have shipped three ledgers.".to_string(),
    }
}

pub(super) fn build_service() -> (
    JobBoardService<InMemoryBoardRepository>,
    Arc<InMemoryBoardRepository>,
) {
    let repository = Arc::new(InMemoryBoardRepository::default());
    let service = JobBoardService::new(repository.clone());
    (service, repository)
}

pub(super) struct UnavailableRepository;

impl BoardRepository for UnavailableRepository {
    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove_job(&self, _id: JobId) -> Result<Option<Job>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn job(&self, _id: JobId) -> Result<Option<Job>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_application(
        &self,
        _application: JobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_application(&self, _application: JobApplication) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn application(&self, _id: ApplicationId) -> Result<Option<JobApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn applications(&self) -> Result<Vec<JobApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
