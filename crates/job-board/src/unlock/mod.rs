//! Client side of the candidate unlock flow: backend adapters, failure
//! classification and the per-candidate state machine.

mod backend;
mod failure;
mod local;
mod remote;
mod state;
mod workflow;

#[cfg(test)]
mod tests;

pub use backend::{BackendError, LedgerAdminBackend, TalentBackend};
pub use failure::{
    UnlockFailure, GENERIC_MESSAGE, INSUFFICIENT_CREDITS_MESSAGE, NETWORK_MESSAGE,
    UNAUTHORIZED_MESSAGE, UNAVAILABLE_MESSAGE,
};
pub use local::LocalBackend;
pub use remote::HttpBackend;
pub use state::UnlockState;
pub use workflow::{
    CandidateCard, Confirmation, UnlockError, UnlockOutcome, UnlockPrompt, UnlockWorkflow,
};
