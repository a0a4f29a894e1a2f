use super::domain::{ApplicationId, Job, JobApplication, JobId};
use crate::store::RepositoryError;

/// Storage abstraction so the board service can be exercised in isolation.
pub trait BoardRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn remove_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    /// All postings ordered by id.
    fn jobs(&self) -> Result<Vec<Job>, RepositoryError>;
    fn insert_application(
        &self,
        application: JobApplication,
    ) -> Result<JobApplication, RepositoryError>;
    fn update_application(&self, application: JobApplication) -> Result<(), RepositoryError>;
    fn application(&self, id: ApplicationId) -> Result<Option<JobApplication>, RepositoryError>;
    /// All applications ordered by id.
    fn applications(&self) -> Result<Vec<JobApplication>, RepositoryError>;
}
