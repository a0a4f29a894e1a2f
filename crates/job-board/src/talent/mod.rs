//! Candidate profiles, the employer-scoped directory and the credit ledger.

pub mod domain;
pub mod export;
pub mod ledger;
mod memory;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    all_skills, CandidateId, CandidateProfile, CandidateUnlocks, ContactDetails, DirectoryEntry,
    DirectoryFilter, EmployerAccount, LedgerMetrics, ProfileInput, TalentValidationError,
    UnlockReceipt, UnlockRecord,
};
pub use ledger::{CreditLedger, LedgerError};
pub use memory::{InMemoryLedgerStore, InMemoryProfileStore};
pub use router::{talent_router, BalanceView, CostView, CreditAmount};
pub use service::{TalentService, TalentServiceError};
pub use store::{LedgerStore, ProfileStore};
