use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{CandidateId, CandidateProfile, EmployerAccount, UnlockRecord};
use super::store::{LedgerStore, ProfileStore};
use crate::identity::Principal;
use crate::store::RepositoryError;

#[derive(Debug, Default, Clone)]
pub struct InMemoryProfileStore {
    profiles: Arc<Mutex<BTreeMap<Principal, CandidateProfile>>>,
}

impl InMemoryProfileStore {
    fn table(&self) -> Result<MutexGuard<'_, BTreeMap<Principal, CandidateProfile>>, RepositoryError> {
        self.profiles
            .lock()
            .map_err(|_| RepositoryError::poisoned("profiles"))
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn upsert_profile(&self, profile: CandidateProfile) -> Result<(), RepositoryError> {
        self.table()?.insert(profile.candidate.clone(), profile);
        Ok(())
    }

    fn profile(&self, candidate: &Principal) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(self.table()?.get(candidate).cloned())
    }

    fn profile_by_id(&self, id: &CandidateId) -> Result<Option<CandidateProfile>, RepositoryError> {
        Ok(self
            .table()?
            .values()
            .find(|profile| &profile.id == id)
            .cloned())
    }

    fn profiles(&self) -> Result<Vec<CandidateProfile>, RepositoryError> {
        Ok(self.table()?.values().cloned().collect())
    }
}

#[derive(Debug)]
struct LedgerTables {
    accounts: BTreeMap<Principal, EmployerAccount>,
    unlocks: Vec<UnlockRecord>,
    unlock_cost: u64,
}

/// Process-local ledger storage seeded with the initial unlock cost.
#[derive(Debug, Clone)]
pub struct InMemoryLedgerStore {
    tables: Arc<Mutex<LedgerTables>>,
}

impl InMemoryLedgerStore {
    pub fn new(unlock_cost: u64) -> Self {
        Self {
            tables: Arc::new(Mutex::new(LedgerTables {
                accounts: BTreeMap::new(),
                unlocks: Vec::new(),
                unlock_cost,
            })),
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, LedgerTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::poisoned("ledger"))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn account(&self, employer: &Principal) -> Result<Option<EmployerAccount>, RepositoryError> {
        Ok(self.tables()?.accounts.get(employer).cloned())
    }

    fn put_account(&self, account: EmployerAccount) -> Result<(), RepositoryError> {
        self.tables()?
            .accounts
            .insert(account.employer.clone(), account);
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<EmployerAccount>, RepositoryError> {
        Ok(self.tables()?.accounts.values().cloned().collect())
    }

    fn unlock_record(
        &self,
        employer: &Principal,
        candidate: &Principal,
    ) -> Result<Option<UnlockRecord>, RepositoryError> {
        Ok(self
            .tables()?
            .unlocks
            .iter()
            .find(|record| &record.employer == employer && &record.candidate == candidate)
            .cloned())
    }

    fn insert_unlock(&self, record: UnlockRecord) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        let exists = tables
            .unlocks
            .iter()
            .any(|existing| existing.employer == record.employer && existing.candidate == record.candidate);
        if exists {
            return Err(RepositoryError::Conflict);
        }
        tables.unlocks.push(record);
        Ok(())
    }

    fn unlocks(&self) -> Result<Vec<UnlockRecord>, RepositoryError> {
        Ok(self.tables()?.unlocks.clone())
    }

    fn unlock_cost(&self) -> Result<u64, RepositoryError> {
        Ok(self.tables()?.unlock_cost)
    }

    fn set_unlock_cost(&self, cost: u64) -> Result<(), RepositoryError> {
        self.tables()?.unlock_cost = cost;
        Ok(())
    }
}
