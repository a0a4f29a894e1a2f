use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::domain::{EmployerAccount, UnlockReceipt, UnlockRecord};
use super::store::LedgerStore;
use crate::identity::Principal;
use crate::store::RepositoryError;

pub const UNLOCK_STATUS: &str = "Candidate profile unlocked";
pub const ALREADY_UNLOCKED_STATUS: &str = "Candidate profile already unlocked";

/// Credit balances and unlock records.
///
/// Every mutation runs under one write lock so the balance check and the
/// deduction observe the same state, and concurrent unlocks of the same pair
/// charge once.
pub struct CreditLedger<L> {
    store: Arc<L>,
    write: Mutex<()>,
}

impl<L> CreditLedger<L>
where
    L: LedgerStore + 'static,
{
    pub fn new(store: Arc<L>) -> Self {
        Self {
            store,
            write: Mutex::new(()),
        }
    }

    fn serialized(&self) -> MutexGuard<'_, ()> {
        self.write.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the employer's account, opening an empty one on first access.
    pub fn ensure_account(
        &self,
        employer: &Principal,
        now: DateTime<Utc>,
    ) -> Result<EmployerAccount, LedgerError> {
        let _write = self.serialized();
        self.ensure_account_locked(employer, now)
    }

    fn ensure_account_locked(
        &self,
        employer: &Principal,
        now: DateTime<Utc>,
    ) -> Result<EmployerAccount, LedgerError> {
        if let Some(account) = self.store.account(employer)? {
            return Ok(account);
        }
        let account = EmployerAccount::open(employer.clone(), now);
        self.store.put_account(account.clone())?;
        info!(employer = %employer, "employer account opened");
        Ok(account)
    }

    pub fn account(&self, employer: &Principal) -> Result<EmployerAccount, LedgerError> {
        self.store
            .account(employer)?
            .ok_or_else(|| LedgerError::UnknownEmployer(employer.clone()))
    }

    pub fn accounts(&self) -> Result<Vec<EmployerAccount>, LedgerError> {
        Ok(self.store.accounts()?)
    }

    pub fn cost(&self) -> Result<u64, LedgerError> {
        Ok(self.store.unlock_cost()?)
    }

    pub fn set_cost(&self, cost: u64) -> Result<u64, LedgerError> {
        if cost == 0 {
            return Err(LedgerError::InvalidCost);
        }
        let _write = self.serialized();
        let previous = self.store.unlock_cost()?;
        self.store.set_unlock_cost(cost)?;
        info!(previous, cost, "unlock cost updated");
        Ok(cost)
    }

    /// Credit a purchase; also raises the lifetime purchased total.
    pub fn add_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let _write = self.serialized();
        let mut account = self.account(employer)?;
        account.credits = account.credits.saturating_add(amount);
        account.credits_purchased = account.credits_purchased.saturating_add(amount);
        self.store.put_account(account.clone())?;
        info!(employer = %employer, amount, balance = account.credits, "credits added");
        Ok(account)
    }

    /// Remove credits without touching the purchased total; never overdraws.
    pub fn deduct_credits(
        &self,
        employer: &Principal,
        amount: u64,
    ) -> Result<EmployerAccount, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let _write = self.serialized();
        let mut account = self.account(employer)?;
        account.credits = account
            .credits
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCredits {
                balance: account.credits,
                required: amount,
            })?;
        self.store.put_account(account.clone())?;
        info!(employer = %employer, amount, balance = account.credits, "credits deducted");
        Ok(account)
    }

    pub fn is_unlocked(
        &self,
        employer: &Principal,
        candidate: &Principal,
    ) -> Result<bool, LedgerError> {
        Ok(self.store.unlock_record(employer, candidate)?.is_some())
    }

    /// Charge the current cost and record the unlock. Unlocking an already
    /// unlocked candidate charges nothing and reports the current balance.
    pub fn unlock(
        &self,
        employer: &Principal,
        candidate: &Principal,
        now: DateTime<Utc>,
    ) -> Result<UnlockReceipt, LedgerError> {
        let _write = self.serialized();
        let mut account = self.ensure_account_locked(employer, now)?;

        if self.store.unlock_record(employer, candidate)?.is_some() {
            return Ok(UnlockReceipt {
                status: ALREADY_UNLOCKED_STATUS.to_string(),
                remaining_credits: account.credits,
                already_unlocked: true,
            });
        }

        let cost = self.store.unlock_cost()?;
        if account.credits < cost {
            return Err(LedgerError::InsufficientCredits {
                balance: account.credits,
                required: cost,
            });
        }

        // Charge first: a record never exists without its payment.
        let before = account.clone();
        account.credits -= cost;
        self.store.put_account(account.clone())?;
        let record = UnlockRecord {
            employer: employer.clone(),
            candidate: candidate.clone(),
            credits_used: cost,
            unlocked_at: now,
        };
        if let Err(err) = self.store.insert_unlock(record) {
            if let Err(restore) = self.store.put_account(before) {
                error!(employer = %employer, error = %restore, "unlock charge could not be reverted");
            }
            return Err(err.into());
        }

        info!(
            employer = %employer,
            candidate = %candidate,
            cost,
            remaining = account.credits,
            "candidate unlocked"
        );
        Ok(UnlockReceipt {
            status: UNLOCK_STATUS.to_string(),
            remaining_credits: account.credits,
            already_unlocked: false,
        })
    }

    pub fn unlocks(&self) -> Result<Vec<UnlockRecord>, LedgerError> {
        Ok(self.store.unlocks()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient credits: balance {balance}, required {required}")]
    InsufficientCredits { balance: u64, required: u64 },
    #[error("no credit account for employer {0}")]
    UnknownEmployer(Principal),
    #[error("unlock cost must be greater than zero")]
    InvalidCost,
    #[error("credit amount must be greater than zero")]
    InvalidAmount,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
