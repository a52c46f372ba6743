use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::applications::ApplicationId;
use super::commission::CommissionBreakdown;
use super::jobs::JobId;

/// Commission owed for a hire, captured when the application enters HIRED. Later edits to the
/// listing's terms do not touch records already written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub recruiter_id: String,
    pub currency: String,
    pub breakdown: CommissionBreakdown,
    pub hired_at: DateTime<Utc>,
}

/// Outbound hook for finance. A payout is written once per application: `record` keeps an
/// existing entry for the same application id.
pub trait PayoutLedger: Send + Sync {
    fn find(&self, application_id: &ApplicationId) -> Result<Option<PayoutRecord>, PayoutError>;

    fn record(&self, payout: PayoutRecord) -> Result<(), PayoutError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    #[error("payout ledger unavailable: {0}")]
    Unavailable(String),
}
