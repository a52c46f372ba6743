use std::fmt;

use serde::{Deserialize, Serialize};

use super::commission::JobCommissionTerms;

/// Identifier wrapper for job listings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Commission-relevant view of a job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCommissionSnapshot {
    pub job_id: JobId,
    pub title: String,
    pub terms: JobCommissionTerms,
    pub salary_max: f64,
}

/// Read access to job listings owned by companies and internal staff.
pub trait JobDirectory: Send + Sync {
    fn job_commission_terms(
        &self,
        job_id: &JobId,
    ) -> Result<Option<JobCommissionSnapshot>, JobDirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobDirectoryError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("job directory unavailable: {0}")]
    Unavailable(String),
}
