use super::domain::{CandidateId, CandidateProfile, EmployerAccount, UnlockRecord};
use crate::identity::Principal;
use crate::store::RepositoryError;

/// Storage for job seeker profiles.
pub trait ProfileStore: Send + Sync {
    fn upsert_profile(&self, profile: CandidateProfile) -> Result<(), RepositoryError>;
    fn profile(&self, candidate: &Principal) -> Result<Option<CandidateProfile>, RepositoryError>;
    fn profile_by_id(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError>;
    /// All profiles ordered by principal.
    fn profiles(&self) -> Result<Vec<CandidateProfile>, RepositoryError>;
}

/// Storage for employer balances, unlock records and the per-unlock cost.
///
/// Implementations only persist; check-then-write sequences are serialized by
/// [`CreditLedger`](super::CreditLedger).
pub trait LedgerStore: Send + Sync {
    fn account(&self, employer: &Principal) -> Result<Option<EmployerAccount>, RepositoryError>;
    fn put_account(&self, account: EmployerAccount) -> Result<(), RepositoryError>;
    /// All accounts ordered by principal.
    fn accounts(&self) -> Result<Vec<EmployerAccount>, RepositoryError>;
    fn unlock_record(
        &self,
        employer: &Principal,
        candidate: &Principal,
    ) -> Result<Option<UnlockRecord>, RepositoryError>;
    /// Fails with `Conflict` if the pair is already recorded.
    fn insert_unlock(&self, record: UnlockRecord) -> Result<(), RepositoryError>;
    /// All unlock records in insertion order.
    fn unlocks(&self) -> Result<Vec<UnlockRecord>, RepositoryError>;
    fn unlock_cost(&self) -> Result<u64, RepositoryError>;
    fn set_unlock_cost(&self, cost: u64) -> Result<(), RepositoryError>;
}
