use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use axum::async_trait;
use chrono::{TimeZone, Utc};

use crate::identity::{Principal, Role};
use crate::session::Session;
use crate::talent::{CandidateId, ContactDetails, DirectoryEntry, UnlockReceipt};
use crate::unlock::{BackendError, TalentBackend};

pub(super) fn session(email: &str, role: Role) -> Session {
    Session {
        principal: Principal::new(email),
        role,
        started_at: Utc
            .with_ymd_and_hms(2025, 10, 4, 8, 0, 0)
            .single()
            .expect("valid timestamp"),
    }
}

pub(super) fn employer() -> Session {
    session("hiring@acme.io", Role::Employer)
}

pub(super) fn priya() -> CandidateId {
    CandidateId::new("c-priya")
}

pub(super) fn arjun() -> CandidateId {
    CandidateId::new("c-arjun")
}

#[derive(Debug, Default)]
pub(super) struct Calls {
    pub(super) balance: usize,
    pub(super) cost: usize,
    pub(super) unlock: usize,
    pub(super) directory: usize,
}

impl Calls {
    pub(super) fn total(&self) -> usize {
        self.balance + self.cost + self.unlock + self.directory
    }
}

#[derive(Debug)]
struct FakeLedger {
    balance: u64,
    cost: u64,
    unlocked: BTreeSet<CandidateId>,
    fail_unlock: Option<BackendError>,
    /// When set, the directory never reports unlocks (a lagging read replica).
    stale_directory: bool,
}

/// Scriptable in-memory backend that records every call.
#[derive(Debug, Clone)]
pub(super) struct FakeBackend {
    ledger: Arc<Mutex<FakeLedger>>,
    calls: Arc<Mutex<Calls>>,
    candidates: Arc<BTreeMap<CandidateId, (String, String)>>,
}

impl FakeBackend {
    pub(super) fn new(balance: u64, cost: u64) -> Self {
        let candidates = [
            (priya(), "Priya Raman", "priya@example.com"),
            (arjun(), "Arjun Mehta", "arjun@example.com"),
        ]
        .into_iter()
        .map(|(id, name, email)| (id, (name.to_string(), email.to_string())))
        .collect();
        Self {
            ledger: Arc::new(Mutex::new(FakeLedger {
                balance,
                cost,
                unlocked: BTreeSet::new(),
                fail_unlock: None,
                stale_directory: false,
            })),
            calls: Arc::new(Mutex::new(Calls::default())),
            candidates: Arc::new(candidates),
        }
    }

    pub(super) fn set_cost(&self, cost: u64) {
        self.ledger.lock().expect("ledger").cost = cost;
    }

    pub(super) fn fail_next_unlock(&self, err: BackendError) {
        self.ledger.lock().expect("ledger").fail_unlock = Some(err);
    }

    pub(super) fn serve_stale_directory(&self) {
        self.ledger.lock().expect("ledger").stale_directory = true;
    }

    pub(super) fn balance(&self) -> u64 {
        self.ledger.lock().expect("ledger").balance
    }

    pub(super) fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().expect("calls")
    }
}

#[async_trait]
impl TalentBackend for FakeBackend {
    async fn credit_balance(&self) -> Result<u64, BackendError> {
        self.calls().balance += 1;
        Ok(self.balance())
    }

    async fn credit_cost(&self) -> Result<u64, BackendError> {
        self.calls().cost += 1;
        Ok(self.ledger.lock().expect("ledger").cost)
    }

    async fn unlock_candidate_profile(
        &self,
        candidate: &CandidateId,
    ) -> Result<UnlockReceipt, BackendError> {
        self.calls().unlock += 1;
        let mut ledger = self.ledger.lock().expect("ledger");
        if let Some(err) = ledger.fail_unlock.take() {
            return Err(err);
        }
        if ledger.unlocked.contains(candidate) {
            return Ok(UnlockReceipt {
                status: "already unlocked".to_string(),
                remaining_credits: ledger.balance,
                already_unlocked: true,
            });
        }
        if ledger.balance < ledger.cost {
            return Err(BackendError::InsufficientCredits {
                balance: ledger.balance,
                cost: ledger.cost,
            });
        }
        ledger.balance -= ledger.cost;
        ledger.unlocked.insert(candidate.clone());
        Ok(UnlockReceipt {
            status: "unlocked".to_string(),
            remaining_credits: ledger.balance,
            already_unlocked: false,
        })
    }

    async fn candidate_directory(&self) -> Result<Vec<DirectoryEntry>, BackendError> {
        self.calls().directory += 1;
        let ledger = self.ledger.lock().expect("ledger");
        Ok(self
            .candidates
            .iter()
            .map(|(id, (name, email))| {
                let unlocked = !ledger.stale_directory && ledger.unlocked.contains(id);
                DirectoryEntry {
                    candidate: id.clone(),
                    job_role: "Engineer".to_string(),
                    bio: String::new(),
                    skills: vec!["Rust".to_string()],
                    resume: String::new(),
                    total_experience_years: 4,
                    preferred_location: "Remote".to_string(),
                    linkedin: String::new(),
                    github: String::new(),
                    unlocked,
                    full_name: unlocked.then(|| name.clone()),
                    contact: unlocked.then(|| ContactDetails {
                        email: email.clone(),
                        ..ContactDetails::default()
                    }),
                }
            })
            .collect())
    }
}
