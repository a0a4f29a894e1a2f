use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::backend::TalentBackend;
use super::failure::UnlockFailure;
use super::state::UnlockState;
use crate::access::{AccessDecision, EMPLOYER_ONLY};
use crate::session::Session;
use crate::talent::{CandidateId, ContactDetails, DirectoryEntry};

/// Result of asking to unlock a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockPrompt {
    /// Nothing to confirm; the candidate is already visible.
    AlreadyUnlocked,
    Confirm(Confirmation),
}

/// What the confirmation dialog shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub candidate: CandidateId,
    pub cost: u64,
    pub balance: u64,
    pub can_confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked { remaining_credits: u64 },
    AlreadyUnlocked,
}

/// Rendered candidate card. Private fields come only from the backend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateCard {
    pub candidate: CandidateId,
    pub job_role: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub total_experience_years: u32,
    pub preferred_location: String,
    pub state: UnlockState,
    pub full_name: Option<String>,
    pub contact: Option<ContactDetails>,
}

#[derive(Debug, thiserror::Error)]
pub enum UnlockError {
    #[error(transparent)]
    Failure(#[from] UnlockFailure),
    #[error("cannot do that while candidate {candidate} is {state}")]
    InvalidState {
        candidate: CandidateId,
        state: UnlockState,
    },
    #[error("candidate {0} is not in the directory")]
    UnknownCandidate(CandidateId),
}

impl UnlockError {
    pub fn failure(&self) -> Option<&UnlockFailure> {
        match self {
            UnlockError::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Employer-side unlock flow over a [`TalentBackend`].
///
/// The backend stays authoritative: balances and unlocked flags are always
/// read back from it, and the local "unlocked this session" set only bridges
/// the gap until the next full [`refresh`](Self::refresh).
pub struct UnlockWorkflow<B> {
    backend: B,
    session: Session,
    balance: Option<u64>,
    cost: Option<u64>,
    directory: BTreeMap<CandidateId, DirectoryEntry>,
    states: HashMap<CandidateId, UnlockState>,
    unlocked_this_session: HashSet<CandidateId>,
}

impl<B> UnlockWorkflow<B>
where
    B: TalentBackend,
{
    /// Only employers get a workflow. Anyone else is turned away before any
    /// backend call.
    pub fn new(backend: B, session: Option<&Session>) -> Result<Self, UnlockError> {
        let session = match EMPLOYER_ONLY.check(session) {
            AccessDecision::Granted(session) => session.clone(),
            AccessDecision::Denied(denied) => {
                info!(actual = ?denied.actual, "unlock workflow denied");
                return Err(UnlockFailure::Unauthorized {
                    login_path: denied.login_path,
                }
                .into());
            }
        };

        Ok(Self {
            backend,
            session,
            balance: None,
            cost: None,
            directory: BTreeMap::new(),
            states: HashMap::new(),
            unlocked_this_session: HashSet::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn balance(&self) -> Option<u64> {
        self.balance
    }

    pub fn cost(&self) -> Option<u64> {
        self.cost
    }

    pub fn state(&self, candidate: &CandidateId) -> UnlockState {
        self.states
            .get(candidate)
            .copied()
            .unwrap_or(UnlockState::Locked)
    }

    pub fn is_unlocked(&self, candidate: &CandidateId) -> bool {
        self.state(candidate).is_unlocked() || self.unlocked_this_session.contains(candidate)
    }

    /// Refetch directory, balance and cost, and reconcile every candidate
    /// against the backend's unlocked flags.
    pub async fn refresh(&mut self) -> Result<(), UnlockError> {
        let entries = self
            .backend
            .candidate_directory()
            .await
            .map_err(UnlockFailure::from)?;
        let balance = self.backend.credit_balance().await.map_err(UnlockFailure::from)?;
        let cost = self.backend.credit_cost().await.map_err(UnlockFailure::from)?;

        self.unlocked_this_session.clear();
        self.apply_directory(entries);
        self.balance = Some(balance);
        self.cost = Some(cost);
        Ok(())
    }

    /// Open the confirmation for `candidate` with freshly read cost and balance.
    pub async fn request_unlock(&mut self, candidate: &CandidateId) -> Result<UnlockPrompt, UnlockError> {
        self.entry(candidate)?;
        if self.is_unlocked(candidate) {
            return Ok(UnlockPrompt::AlreadyUnlocked);
        }
        let current = self.state(candidate);
        if current == UnlockState::Unlocking {
            return Err(self.invalid(candidate, current));
        }

        let cost = match self.backend.credit_cost().await {
            Ok(cost) => cost,
            Err(err) => return Err(self.fail(candidate, err.into())),
        };
        let balance = match self.backend.credit_balance().await {
            Ok(balance) => balance,
            Err(err) => return Err(self.fail(candidate, err.into())),
        };
        self.cost = Some(cost);
        self.balance = Some(balance);
        self.transition(candidate, UnlockState::ConfirmPending { cost, balance });

        Ok(UnlockPrompt::Confirm(Confirmation {
            candidate: candidate.clone(),
            cost,
            balance,
            can_confirm: balance >= cost,
        }))
    }

    /// Accept the open confirmation. With too few credits this fails without
    /// contacting the backend and leaves the confirmation open.
    pub async fn confirm_unlock(&mut self, candidate: &CandidateId) -> Result<UnlockOutcome, UnlockError> {
        self.entry(candidate)?;
        if self.is_unlocked(candidate) {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }

        let (cost, balance) = match self.state(candidate) {
            UnlockState::ConfirmPending { cost, balance } => (cost, balance),
            other => return Err(self.invalid(candidate, other)),
        };
        if balance < cost {
            return Err(UnlockFailure::InsufficientCredits { balance, cost }.into());
        }

        self.transition(candidate, UnlockState::Unlocking);
        let receipt = match self.backend.unlock_candidate_profile(candidate).await {
            Ok(receipt) => receipt,
            Err(err) => return Err(self.fail(candidate, err.into())),
        };

        self.balance = Some(receipt.remaining_credits);
        self.unlocked_this_session.insert(candidate.clone());
        self.transition(candidate, UnlockState::Unlocked);
        info!(
            candidate = %candidate,
            remaining = receipt.remaining_credits,
            already = receipt.already_unlocked,
            "unlock confirmed"
        );

        if let Err(err) = self.reload_after_unlock().await {
            warn!(error = %err, "directory refresh after unlock failed");
        }

        if receipt.already_unlocked {
            Ok(UnlockOutcome::AlreadyUnlocked)
        } else {
            Ok(UnlockOutcome::Unlocked {
                remaining_credits: receipt.remaining_credits,
            })
        }
    }

    pub fn cancel(&mut self, candidate: &CandidateId) -> Result<(), UnlockError> {
        match self.state(candidate) {
            UnlockState::ConfirmPending { .. } => {
                self.transition(candidate, UnlockState::Locked);
                Ok(())
            }
            UnlockState::Unlocking => Err(self.invalid(candidate, UnlockState::Unlocking)),
            _ => Ok(()),
        }
    }

    pub fn view(&self, candidate: &CandidateId) -> Option<CandidateCard> {
        self.directory
            .get(candidate)
            .map(|entry| self.card(entry))
    }

    /// Every directory candidate in id order.
    pub fn cards(&self) -> Vec<CandidateCard> {
        self.directory.values().map(|entry| self.card(entry)).collect()
    }

    /// Ends the workflow, discarding all local state, and hands back the backend.
    pub fn teardown(self) -> B {
        debug!(principal = %self.session.principal, "unlock workflow torn down");
        self.backend
    }

    fn card(&self, entry: &DirectoryEntry) -> CandidateCard {
        let (full_name, contact) = if entry.unlocked {
            (entry.full_name.clone(), entry.contact.clone())
        } else {
            (None, None)
        };

        CandidateCard {
            candidate: entry.candidate.clone(),
            job_role: entry.job_role.clone(),
            bio: entry.bio.clone(),
            skills: entry.skills.clone(),
            total_experience_years: entry.total_experience_years,
            preferred_location: entry.preferred_location.clone(),
            state: self.state(&entry.candidate),
            full_name,
            contact,
        }
    }

    /// Directory, balance and cost reread after an unlock. A failed balance
    /// read keeps the receipt's `remaining_credits`.
    async fn reload_after_unlock(&mut self) -> Result<(), UnlockError> {
        let entries = self
            .backend
            .candidate_directory()
            .await
            .map_err(UnlockFailure::from)?;
        self.apply_directory(entries);
        match self.backend.credit_balance().await {
            Ok(balance) => self.balance = Some(balance),
            Err(err) => debug!(error = %err, "balance refresh skipped"),
        }
        match self.backend.credit_cost().await {
            Ok(cost) => self.cost = Some(cost),
            Err(err) => debug!(error = %err, "cost refresh skipped"),
        }
        Ok(())
    }

    fn apply_directory(&mut self, entries: Vec<DirectoryEntry>) {
        let mut directory = BTreeMap::new();
        let mut states = HashMap::new();
        for entry in entries {
            let candidate = entry.candidate.clone();
            let state = if entry.unlocked || self.unlocked_this_session.contains(&candidate) {
                UnlockState::Unlocked
            } else {
                match self.state(&candidate) {
                    UnlockState::Unlocked | UnlockState::Failed => UnlockState::Locked,
                    other => other,
                }
            };
            states.insert(candidate.clone(), state);
            directory.insert(candidate, entry);
        }
        self.directory = directory;
        self.states = states;
    }

    fn entry(&self, candidate: &CandidateId) -> Result<&DirectoryEntry, UnlockError> {
        self.directory
            .get(candidate)
            .ok_or_else(|| UnlockError::UnknownCandidate(candidate.clone()))
    }

    fn transition(&mut self, candidate: &CandidateId, next: UnlockState) {
        let previous = self.states.insert(candidate.clone(), next);
        debug!(
            candidate = %candidate,
            from = previous.unwrap_or(UnlockState::Locked).label(),
            to = next.label(),
            "unlock state transition"
        );
    }

    /// `Failed` is surfaced once and the candidate returns to `Locked`.
    fn fail(&mut self, candidate: &CandidateId, failure: UnlockFailure) -> UnlockError {
        self.transition(candidate, UnlockState::Failed);
        self.transition(candidate, UnlockState::Locked);
        failure.into()
    }

    fn invalid(&self, candidate: &CandidateId, state: UnlockState) -> UnlockError {
        UnlockError::InvalidState {
            candidate: candidate.clone(),
            state,
        }
    }
}
