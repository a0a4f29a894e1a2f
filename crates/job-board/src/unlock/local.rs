use std::sync::Arc;

use axum::async_trait;
use chrono::Utc;

use super::backend::{BackendError, LedgerAdminBackend, TalentBackend};
use crate::identity::Principal;
use crate::session::Session;
use crate::store::RepositoryError;
use crate::talent::{
    CandidateId, CandidateUnlocks, DirectoryEntry, DirectoryFilter, EmployerAccount, LedgerError,
    LedgerStore, ProfileStore, TalentService, TalentServiceError, UnlockReceipt,
};

/// In-process adapter calling the talent service directly as `session`.
pub struct LocalBackend<P, L> {
    service: Arc<TalentService<P, L>>,
    session: Session,
}

impl<P, L> LocalBackend<P, L> {
    pub fn new(service: Arc<TalentService<P, L>>, session: Session) -> Self {
        Self { service, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl From<TalentServiceError> for BackendError {
    fn from(err: TalentServiceError) -> Self {
        match err {
            TalentServiceError::Forbidden(denied) => BackendError::Unauthorized(denied.to_string()),
            TalentServiceError::Ledger(LedgerError::InsufficientCredits { balance, required }) => {
                BackendError::InsufficientCredits {
                    balance,
                    cost: required,
                }
            }
            err @ (TalentServiceError::CandidateNotFound(_)
            | TalentServiceError::Ledger(LedgerError::UnknownEmployer(_))
            | TalentServiceError::Repository(RepositoryError::NotFound)) => {
                BackendError::NotFound(err.to_string())
            }
            other => BackendError::Rejected(other.to_string()),
        }
    }
}

#[async_trait]
impl<P, L> TalentBackend for LocalBackend<P, L>
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    async fn credit_balance(&self) -> Result<u64, BackendError> {
        Ok(self.service.credit_balance(&self.session, Utc::now())?.credits)
    }

    async fn credit_cost(&self) -> Result<u64, BackendError> {
        Ok(self.service.credit_cost(&self.session)?)
    }

    async fn unlock_candidate_profile(
        &self,
        candidate: &CandidateId,
    ) -> Result<UnlockReceipt, BackendError> {
        Ok(self
            .service
            .unlock_candidate(&self.session, candidate, Utc::now())?)
    }

    async fn candidate_directory(&self) -> Result<Vec<DirectoryEntry>, BackendError> {
        Ok(self
            .service
            .directory(&self.session, &DirectoryFilter::default())?)
    }
}

#[async_trait]
impl<P, L> LedgerAdminBackend for LocalBackend<P, L>
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    async fn set_unlock_cost(&self, cost: u64) -> Result<u64, BackendError> {
        Ok(self.service.set_cost(&self.session, cost)?)
    }

    async fn add_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, BackendError> {
        Ok(self.service.add_credits(&self.session, employer, amount)?)
    }

    async fn deduct_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, BackendError> {
        Ok(self
            .service
            .deduct_credits(&self.session, employer, amount)?)
    }

    async fn unlock_logs(&self) -> Result<Vec<CandidateUnlocks>, BackendError> {
        Ok(self.service.unlock_logs(&self.session)?)
    }
}
