use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    all_skills, CandidateId, CandidateProfile, CandidateUnlocks, DirectoryEntry, DirectoryFilter,
    EmployerAccount, LedgerMetrics, ProfileInput, TalentValidationError, UnlockReceipt,
};
use super::export::{unlock_log_csv, ExportError};
use super::ledger::{CreditLedger, LedgerError};
use super::store::{LedgerStore, ProfileStore};
use crate::access::{AccessDenied, ADMIN_ONLY, ANY_MEMBER, DIRECTORY_READERS, EMPLOYER_ONLY, JOB_SEEKER_ONLY};
use crate::identity::{Principal, Role};
use crate::session::Session;
use crate::store::RepositoryError;

/// Candidate directory and credit ledger behind one role-checked facade.
pub struct TalentService<P, L> {
    profiles: Arc<P>,
    ledger: CreditLedger<L>,
}

impl<P, L> TalentService<P, L>
where
    P: ProfileStore + 'static,
    L: LedgerStore + 'static,
{
    pub fn new(profiles: Arc<P>, ledger: Arc<L>) -> Self {
        Self {
            profiles,
            ledger: CreditLedger::new(ledger),
        }
    }

    /// Opens a credit account for employer sessions; other roles are ignored.
    pub fn register_session(&self, session: &Session) -> Result<(), TalentServiceError> {
        if session.role == Role::Employer {
            self.ledger
                .ensure_account(&session.principal, session.started_at)?;
        }
        Ok(())
    }

    pub fn save_profile(
        &self,
        caller: &Session,
        input: ProfileInput,
        now: DateTime<Utc>,
    ) -> Result<CandidateProfile, TalentServiceError> {
        JOB_SEEKER_ONLY.authorize(caller)?;
        let input = input.normalized()?;
        let id = match self.profiles.profile(&caller.principal)? {
            Some(existing) => existing.id,
            None => CandidateId::generate(),
        };
        let profile = CandidateProfile::from_input(id, caller.principal.clone(), input, now);
        self.profiles.upsert_profile(profile.clone())?;
        info!(candidate = %profile.candidate, "candidate profile saved");
        Ok(profile)
    }

    pub fn profile(&self, caller: &Session) -> Result<Option<CandidateProfile>, TalentServiceError> {
        JOB_SEEKER_ONLY.authorize(caller)?;
        Ok(self.profiles.profile(&caller.principal)?)
    }

    /// Directory as seen by the caller. Private fields appear only on entries
    /// the calling employer has an unlock record for.
    pub fn directory(
        &self,
        caller: &Session,
        filter: &DirectoryFilter,
    ) -> Result<Vec<DirectoryEntry>, TalentServiceError> {
        DIRECTORY_READERS.authorize(caller)?;
        let mut entries = Vec::new();
        for profile in self.profiles.profiles()? {
            let unlocked = caller.role == Role::Employer
                && self.ledger.is_unlocked(&caller.principal, &profile.candidate)?;
            let entry = DirectoryEntry::project(profile, unlocked);
            if filter.matches(&entry) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    pub fn skills(&self, caller: &Session) -> Result<Vec<String>, TalentServiceError> {
        let entries = self.directory(caller, &DirectoryFilter::default())?;
        Ok(all_skills(&entries))
    }

    pub fn credit_balance(
        &self,
        caller: &Session,
        now: DateTime<Utc>,
    ) -> Result<EmployerAccount, TalentServiceError> {
        EMPLOYER_ONLY.authorize(caller)?;
        Ok(self.ledger.ensure_account(&caller.principal, now)?)
    }

    pub fn credit_cost(&self, caller: &Session) -> Result<u64, TalentServiceError> {
        ANY_MEMBER.authorize(caller)?;
        Ok(self.ledger.cost()?)
    }

    /// Unlock the candidate behind a directory id for the calling employer.
    pub fn unlock_candidate(
        &self,
        caller: &Session,
        candidate: &CandidateId,
        now: DateTime<Utc>,
    ) -> Result<UnlockReceipt, TalentServiceError> {
        EMPLOYER_ONLY.authorize(caller)?;
        let profile = self
            .profiles
            .profile_by_id(candidate)?
            .ok_or_else(|| TalentServiceError::CandidateNotFound(candidate.clone()))?;
        Ok(self.ledger.unlock(&caller.principal, &profile.candidate, now)?)
    }

    pub fn set_cost(&self, caller: &Session, cost: u64) -> Result<u64, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        Ok(self.ledger.set_cost(cost)?)
    }

    pub fn add_credits(
        &self,
        caller: &Session,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        Ok(self.ledger.add_credits(employer, amount)?)
    }

    pub fn deduct_credits(
        &self,
        caller: &Session,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        Ok(self.ledger.deduct_credits(employer, amount)?)
    }

    pub fn employers(&self, caller: &Session) -> Result<Vec<EmployerAccount>, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        Ok(self.ledger.accounts()?)
    }

    pub fn jobseekers(&self, caller: &Session) -> Result<Vec<CandidateProfile>, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        Ok(self.profiles.profiles()?)
    }

    /// Unlock records grouped by candidate, newest record first in each group.
    pub fn unlock_logs(&self, caller: &Session) -> Result<Vec<CandidateUnlocks>, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        let mut grouped: BTreeMap<Principal, Vec<_>> = BTreeMap::new();
        for record in self.ledger.unlocks()? {
            grouped.entry(record.candidate.clone()).or_default().push(record);
        }

        let mut logs = Vec::with_capacity(grouped.len());
        for (candidate, mut records) in grouped {
            records.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
            let full_name = self.profiles.profile(&candidate)?.map(|p| p.full_name);
            logs.push(CandidateUnlocks {
                candidate,
                full_name,
                records,
            });
        }
        Ok(logs)
    }

    pub fn export_unlock_logs(&self, caller: &Session) -> Result<String, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        let records = self.ledger.unlocks()?;
        Ok(unlock_log_csv(&records)?)
    }

    pub fn metrics(&self, caller: &Session) -> Result<LedgerMetrics, TalentServiceError> {
        ADMIN_ONLY.authorize(caller)?;
        let accounts = self.ledger.accounts()?;
        Ok(LedgerMetrics {
            employers: accounts.len(),
            jobseekers: self.profiles.profiles()?.len(),
            total_credits_purchased: accounts.iter().map(|a| a.credits_purchased).sum(),
            unlocks: self.ledger.unlocks()?.len(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TalentServiceError {
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error(transparent)]
    Validation(#[from] TalentValidationError),
    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
