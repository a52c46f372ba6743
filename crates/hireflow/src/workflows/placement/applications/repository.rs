use serde::Serialize;

use super::domain::{Application, ApplicationId, ApplicationStatus};
use super::identity::{NormalizedEmail, NormalizedPhone};
use crate::workflows::placement::jobs::JobId;

/// Stored application together with the optimistic version it was read at.
///
/// Serialize-only, like [`Application`]: records are built by storage from state machine
/// output, never parsed from request payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationRecord {
    pub application: Application,
    pub version: u64,
}

impl ApplicationRecord {
    pub fn status_view(&self) -> ApplicationStatusView {
        let application = &self.application;
        ApplicationStatusView {
            application_id: application.id.clone(),
            job_id: application.job_id.clone(),
            candidate_name: application.candidate.full_name.clone(),
            status: application.status().label(),
            timeline: application
                .status_timestamps()
                .timeline()
                .into_iter()
                .map(|(status, at)| TimelineEntry {
                    status: status.label(),
                    at: at.to_rfc3339(),
                })
                .collect(),
            version: self.version,
        }
    }
}

/// Storage abstraction so the workflow service can be exercised in isolation.
///
/// Implementations must enforce a uniqueness constraint on `(job_id, email, phone)` across
/// applications whose status is not DUPLICATE, and must apply `update_status` only when the
/// stored version equals the record's version.
pub trait ApplicationRepository: Send + Sync {
    /// All applications for the candidate, optionally narrowed to one job.
    fn find_by_candidate(
        &self,
        email: &NormalizedEmail,
        phone: &NormalizedPhone,
        job_id: Option<&JobId>,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;

    fn insert(&self, application: Application) -> Result<ApplicationRecord, RepositoryError>;

    /// Persist a transitioned application; returns the record at its new version.
    fn update_status(&self, record: ApplicationRecord)
        -> Result<ApplicationRecord, RepositoryError>;

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("candidate already has an application for job {job_id}")]
    DuplicateCandidate { job_id: JobId },
    #[error("record already exists")]
    Conflict,
    #[error("stale write: expected version {expected}, stored version is {found}")]
    StaleVersion { expected: u64, found: u64 },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Whether an existing application occupies the candidate's slot for its job.
pub fn holds_candidate_slot(status: ApplicationStatus) -> bool {
    status != ApplicationStatus::Duplicate
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub candidate_name: String,
    pub status: &'static str,
    pub timeline: Vec<TimelineEntry>,
    pub version: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub status: &'static str,
    pub at: String,
}
