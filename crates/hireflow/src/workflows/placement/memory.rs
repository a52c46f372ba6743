//! Process-local collaborators used by the API host, the demo, and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::applications::{
    holds_candidate_slot, Application, ApplicationId, ApplicationRecord, ApplicationRepository,
    NormalizedEmail, NormalizedPhone, RepositoryError,
};
use super::jobs::{JobCommissionSnapshot, JobDirectory, JobDirectoryError, JobId};
use super::payout::{PayoutError, PayoutLedger, PayoutRecord};

/// Application store. One mutex guards both the uniqueness check and the write, which gives
/// the same guarantee as a partial unique index in a database.
#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl InMemoryApplicationRepository {
    fn guard(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ApplicationId, ApplicationRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.guard().map(|guard| guard.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn find_by_candidate(
        &self,
        email: &NormalizedEmail,
        phone: &NormalizedPhone,
        job_id: Option<&JobId>,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard
            .values()
            .filter(|record| {
                let identity = &record.application.identity;
                identity.email == *email
                    && identity.phone == *phone
                    && job_id.map_or(true, |job| record.application.job_id == *job)
            })
            .cloned()
            .collect())
    }

    fn insert(&self, application: Application) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        let key = application.candidate_key();
        let taken = guard.values().any(|record| {
            holds_candidate_slot(record.application.status())
                && record.application.candidate_key() == key
        });
        if taken {
            return Err(RepositoryError::DuplicateCandidate {
                job_id: application.job_id,
            });
        }

        let record = ApplicationRecord {
            application,
            version: 1,
        };
        guard.insert(record.application.id.clone(), record.clone());
        Ok(record)
    }

    fn update_status(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.guard()?;

        if holds_candidate_slot(record.application.status()) {
            let key = record.application.candidate_key();
            let taken = guard.values().any(|other| {
                other.application.id != record.application.id
                    && holds_candidate_slot(other.application.status())
                    && other.application.candidate_key() == key
            });
            if taken {
                return Err(RepositoryError::DuplicateCandidate {
                    job_id: record.application.job_id,
                });
            }
        }

        let stored = guard
            .get_mut(&record.application.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.version != record.version {
            return Err(RepositoryError::StaleVersion {
                expected: record.version,
                found: stored.version,
            });
        }
        *stored = ApplicationRecord {
            application: record.application,
            version: record.version + 1,
        };
        Ok(stored.clone())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.guard()?.get(id).cloned())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryJobDirectory {
    listings: Arc<Mutex<HashMap<JobId, JobCommissionSnapshot>>>,
}

impl InMemoryJobDirectory {
    pub fn with_listings(listings: impl IntoIterator<Item = JobCommissionSnapshot>) -> Self {
        let directory = Self::default();
        for listing in listings {
            directory.upsert(listing);
        }
        directory
    }

    /// Replace a listing's commission view, as a company editing its job would.
    pub fn upsert(&self, listing: JobCommissionSnapshot) {
        if let Ok(mut guard) = self.listings.lock() {
            guard.insert(listing.job_id.clone(), listing);
        }
    }
}

impl JobDirectory for InMemoryJobDirectory {
    fn job_commission_terms(
        &self,
        job_id: &JobId,
    ) -> Result<Option<JobCommissionSnapshot>, JobDirectoryError> {
        let guard = self
            .listings
            .lock()
            .map_err(|_| JobDirectoryError::Unavailable("job directory lock poisoned".to_string()))?;
        Ok(guard.get(job_id).cloned())
    }
}

/// Payout ledger keyed by application. The first record written for an application is kept.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPayoutLedger {
    records: Arc<Mutex<HashMap<ApplicationId, PayoutRecord>>>,
}

impl InMemoryPayoutLedger {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<ApplicationId, PayoutRecord>>, PayoutError> {
        self.records
            .lock()
            .map_err(|_| PayoutError::Unavailable("payout ledger lock poisoned".to_string()))
    }

    pub fn get(&self, application_id: &ApplicationId) -> Option<PayoutRecord> {
        self.guard()
            .ok()
            .and_then(|guard| guard.get(application_id).cloned())
    }

    /// Every recorded payout, ordered by hire time.
    pub fn records(&self) -> Vec<PayoutRecord> {
        let mut records: Vec<PayoutRecord> = self
            .guard()
            .map(|guard| guard.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.hired_at.cmp(&b.hired_at));
        records
    }

    pub fn len(&self) -> usize {
        self.guard().map(|guard| guard.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PayoutLedger for InMemoryPayoutLedger {
    fn find(&self, application_id: &ApplicationId) -> Result<Option<PayoutRecord>, PayoutError> {
        Ok(self.guard()?.get(application_id).cloned())
    }

    fn record(&self, payout: PayoutRecord) -> Result<(), PayoutError> {
        self.guard()?
            .entry(payout.application_id.clone())
            .or_insert(payout);
        Ok(())
    }
}
