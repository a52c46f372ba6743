use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::identity::{CandidateIdentity, IdentityError, NormalizedPhone};
use super::repository::{holds_candidate_slot, ApplicationRepository, RepositoryError};
use crate::workflows::placement::jobs::JobId;

pub const DUPLICATE_FOR_JOB: &str = "DUPLICATE_FOR_JOB";
pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
pub const INVALID_PHONE: &str = "INVALID_PHONE";

/// One blocking or advisory finding, keyed by the form field it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate_for_job() -> Self {
        Self::new("email", DUPLICATE_FOR_JOB)
    }

    pub(super) fn from_identity_error(error: &IdentityError) -> Self {
        let message = match error {
            IdentityError::InvalidEmail(_) => INVALID_EMAIL,
            IdentityError::MissingCountryCode(_) | IdentityError::InvalidPhone(_) => INVALID_PHONE,
        };
        Self::new(error.field(), message)
    }
}

/// Verdict for a prospective submission. `is_valid` holds exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }

    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn duplicate_for_job() -> Self {
        Self::from_errors(vec![ValidationIssue::duplicate_for_job()])
    }

    pub fn is_duplicate_for_job(&self) -> bool {
        self.errors
            .iter()
            .any(|issue| issue.message == DUPLICATE_FOR_JOB)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return f.write_str("valid");
        }
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Decides whether a candidate/job pair is already represented.
///
/// The verdict is advisory: storage must still enforce uniqueness when the application is
/// written, since validation and creation are not atomic.
pub struct DuplicateValidator<R> {
    repository: Arc<R>,
}

impl<R> DuplicateValidator<R>
where
    R: ApplicationRepository,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn validate_candidate(
        &self,
        email: &str,
        phone: &str,
        job_id: &JobId,
    ) -> Result<ValidationResult, RepositoryError> {
        let identity = match CandidateIdentity::parse(email, phone) {
            Ok(identity) => identity,
            Err(error) => {
                let mut errors = vec![ValidationIssue::from_identity_error(&error)];
                if let IdentityError::InvalidEmail(_) = error {
                    if let Err(phone_error) = NormalizedPhone::parse(phone) {
                        errors.push(ValidationIssue::from_identity_error(&phone_error));
                    }
                }
                return Ok(ValidationResult::from_errors(errors));
            }
        };

        self.validate_identity(&identity, job_id)
    }

    pub fn validate_identity(
        &self,
        identity: &CandidateIdentity,
        job_id: &JobId,
    ) -> Result<ValidationResult, RepositoryError> {
        let existing = self
            .repository
            .find_by_candidate(&identity.email, &identity.phone, None)?;

        let (same_job, other_jobs): (Vec<_>, Vec<_>) = existing
            .into_iter()
            .partition(|record| &record.application.job_id == job_id);

        // Cross-job history is informational and currently not surfaced as warnings.
        if !other_jobs.is_empty() {
            debug!(
                %job_id,
                other_job_matches = other_jobs.len(),
                "discarding non-blocking duplicate signals"
            );
        }

        let blocking = same_job
            .iter()
            .find(|record| holds_candidate_slot(record.application.status()));

        match blocking {
            Some(record) => {
                info!(
                    %job_id,
                    existing_application = %record.application.id,
                    "candidate already applied for job"
                );
                Ok(ValidationResult::duplicate_for_job())
            }
            None => Ok(ValidationResult::valid()),
        }
    }
}
