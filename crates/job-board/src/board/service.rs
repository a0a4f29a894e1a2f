use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    ApplicationId, ApplicationInput, ApplicationStatus, BoardValidationError, Job,
    JobApplication, JobDraft, JobFilter, JobId,
};
use super::repository::BoardRepository;
use crate::access::{AccessDenied, ADMIN_ONLY, ANY_MEMBER, EMPLOYER_ONLY, JOB_SEEKER_ONLY};
use crate::identity::{Principal, Role};
use crate::session::Session;
use crate::store::RepositoryError;

/// Service enforcing posting ownership and application rules over a repository.
pub struct JobBoardService<R> {
    repository: Arc<R>,
    job_sequence: AtomicU64,
    application_sequence: AtomicU64,
    intake: Mutex<()>,
}

impl<R> JobBoardService<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            job_sequence: AtomicU64::new(1),
            application_sequence: AtomicU64::new(1),
            intake: Mutex::new(()),
        }
    }

    pub fn create_job(
        &self,
        caller: &Session,
        draft: JobDraft,
        now: DateTime<Utc>,
    ) -> Result<Job, BoardServiceError> {
        EMPLOYER_ONLY.authorize(caller)?;
        let draft = draft.normalized()?;

        let job = Job {
            id: JobId(self.job_sequence.fetch_add(1, Ordering::Relaxed)),
            employer: caller.principal.clone(),
            title: draft.title,
            company: draft.company,
            location: draft.location,
            salary: draft.salary,
            description: draft.description,
            requirements: draft.requirements,
            posted_at: now,
        };

        let stored = self.repository.insert_job(job)?;
        info!(job_id = stored.id.0, employer = %stored.employer, "job posted");
        Ok(stored)
    }

    /// Remove a posting. Only its employer or an admin may delete it.
    pub fn delete_job(&self, caller: &Session, id: JobId) -> Result<Job, BoardServiceError> {
        let job = self.job(id)?;
        if !ADMIN_ONLY.permits(caller.role) {
            EMPLOYER_ONLY.authorize(caller)?;
            if job.employer != caller.principal {
                return Err(BoardServiceError::NotOwner);
            }
        }

        let removed = self
            .repository
            .remove_job(id)?
            .ok_or(BoardServiceError::JobNotFound(id))?;
        info!(job_id = id.0, by = %caller.principal, "job deleted");
        Ok(removed)
    }

    pub fn jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, BoardServiceError> {
        Ok(self
            .repository
            .jobs()?
            .into_iter()
            .filter(|job| filter.matches(job))
            .collect())
    }

    pub fn job(&self, id: JobId) -> Result<Job, BoardServiceError> {
        self.repository
            .job(id)?
            .ok_or(BoardServiceError::JobNotFound(id))
    }

    pub fn jobs_by_employer(&self, employer: &Principal) -> Result<Vec<Job>, BoardServiceError> {
        Ok(self
            .repository
            .jobs()?
            .into_iter()
            .filter(|job| &job.employer == employer)
            .collect())
    }

    /// Submit an application; a candidate may apply to each posting once.
    pub fn apply(
        &self,
        caller: &Session,
        input: ApplicationInput,
        now: DateTime<Utc>,
    ) -> Result<JobApplication, BoardServiceError> {
        JOB_SEEKER_ONLY.authorize(caller)?;
        let cover_letter = input.cover_letter.trim().to_string();
        if cover_letter.is_empty() {
            return Err(BoardValidationError::MissingCoverLetter.into());
        }
        self.job(input.job_id)?;

        let _intake = self.intake.lock().unwrap_or_else(PoisonError::into_inner);
        let duplicate = self
            .repository
            .applications()?
            .iter()
            .any(|existing| {
                existing.job_id == input.job_id && existing.candidate == caller.principal
            });
        if duplicate {
            return Err(BoardServiceError::AlreadyApplied(input.job_id));
        }

        let application = JobApplication {
            id: ApplicationId(self.application_sequence.fetch_add(1, Ordering::Relaxed)),
            job_id: input.job_id,
            candidate: caller.principal.clone(),
            cover_letter,
            status: ApplicationStatus::Applied,
            submitted_at: now,
        };
        let stored = self.repository.insert_application(application)?;
        info!(application_id = stored.id.0, job_id = stored.job_id.0, "application submitted");
        Ok(stored)
    }

    pub fn applications_for_job(
        &self,
        caller: &Session,
        job_id: JobId,
    ) -> Result<Vec<JobApplication>, BoardServiceError> {
        let job = self.job(job_id)?;
        self.ensure_job_owner(caller, &job)?;

        Ok(self
            .repository
            .applications()?
            .into_iter()
            .filter(|application| application.job_id == job_id)
            .collect())
    }

    /// Applications submitted by `candidate`; visible to that candidate and to admins.
    pub fn applications_for_candidate(
        &self,
        caller: &Session,
        candidate: &Principal,
    ) -> Result<Vec<JobApplication>, BoardServiceError> {
        ANY_MEMBER.authorize(caller)?;
        if caller.role != Role::Admin && &caller.principal != candidate {
            return Err(BoardServiceError::NotOwner);
        }

        Ok(self
            .repository
            .applications()?
            .into_iter()
            .filter(|application| &application.candidate == candidate)
            .collect())
    }

    pub fn update_application_status(
        &self,
        caller: &Session,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<JobApplication, BoardServiceError> {
        let mut application = self
            .repository
            .application(id)?
            .ok_or(BoardServiceError::ApplicationNotFound(id))?;
        let job = self.job(application.job_id)?;
        self.ensure_job_owner(caller, &job)?;

        application.status = status;
        self.repository.update_application(application.clone())?;
        info!(application_id = id.0, status = status.label(), "application status updated");
        Ok(application)
    }

    fn ensure_job_owner(&self, caller: &Session, job: &Job) -> Result<(), BoardServiceError> {
        EMPLOYER_ONLY.authorize(caller)?;
        if job.employer == caller.principal {
            Ok(())
        } else {
            Err(BoardServiceError::NotOwner)
        }
    }
}

/// Error raised by the board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardServiceError {
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error("only the owner of this record may do that")]
    NotOwner,
    #[error(transparent)]
    Validation(#[from] BoardValidationError),
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("already applied to job {0}")]
    AlreadyApplied(JobId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
