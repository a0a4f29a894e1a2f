use axum::async_trait;

use crate::identity::Principal;
use crate::talent::{CandidateId, CandidateUnlocks, DirectoryEntry, EmployerAccount, UnlockReceipt};

/// Employer-facing ledger and directory operations the unlock workflow consumes.
#[async_trait]
pub trait TalentBackend: Send + Sync {
    async fn credit_balance(&self) -> Result<u64, BackendError>;
    async fn credit_cost(&self) -> Result<u64, BackendError>;
    async fn unlock_candidate_profile(
        &self,
        candidate: &CandidateId,
    ) -> Result<UnlockReceipt, BackendError>;
    async fn candidate_directory(&self) -> Result<Vec<DirectoryEntry>, BackendError>;
}

/// Admin ledger maintenance.
#[async_trait]
pub trait LedgerAdminBackend: Send + Sync {
    async fn set_unlock_cost(&self, cost: u64) -> Result<u64, BackendError>;
    async fn add_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, BackendError>;
    async fn deduct_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, BackendError>;
    async fn unlock_logs(&self) -> Result<Vec<CandidateUnlocks>, BackendError>;
}

/// Transport-neutral failure reported by a backend adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("insufficient credits: balance {balance}, cost {cost}")]
    InsufficientCredits { balance: u64, cost: u64 },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("operation {operation} is not supported by this backend")]
    Unsupported { operation: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Rejected(String),
}
