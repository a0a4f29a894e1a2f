use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{ApplicationId, Job, JobApplication, JobId};
use super::repository::BoardRepository;
use crate::store::RepositoryError;

#[derive(Debug, Default)]
struct BoardTables {
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, JobApplication>,
}

/// Process-local board storage.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBoardRepository {
    tables: Arc<Mutex<BoardTables>>,
}

impl InMemoryBoardRepository {
    fn tables(&self) -> Result<MutexGuard<'_, BoardTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::poisoned("board"))
    }
}

impl BoardRepository for InMemoryBoardRepository {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        tables.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    fn remove_job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.tables()?.jobs.remove(&id))
    }

    fn job(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.tables()?.jobs.get(&id).cloned())
    }

    fn jobs(&self) -> Result<Vec<Job>, RepositoryError> {
        Ok(self.tables()?.jobs.values().cloned().collect())
    }

    fn insert_application(
        &self,
        application: JobApplication,
    ) -> Result<JobApplication, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .applications
            .insert(application.id, application.clone());
        Ok(application)
    }

    fn update_application(&self, application: JobApplication) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.applications.get_mut(&application.id) {
            Some(existing) => {
                *existing = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn application(&self, id: ApplicationId) -> Result<Option<JobApplication>, RepositoryError> {
        Ok(self.tables()?.applications.get(&id).cloned())
    }

    fn applications(&self) -> Result<Vec<JobApplication>, RepositoryError> {
        Ok(self.tables()?.applications.values().cloned().collect())
    }
}
