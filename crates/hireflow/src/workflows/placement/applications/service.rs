use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{
    Actor, ApplicationDraft, ApplicationId, ApplicationStatus, SubmissionRequest,
};
use super::duplicates::{DuplicateValidator, ValidationIssue, ValidationResult};
use super::identity::CandidateIdentity;
use super::lifecycle::{ApplicationStateMachine, TransitionError, TransitionPolicy};
use super::locks::ApplicationLocks;
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};
use crate::workflows::placement::commission::{
    CommissionEngine, CommissionQuote, CommissionSettings, JobCommissionTerms,
};
use crate::workflows::placement::jobs::{JobDirectory, JobDirectoryError, JobId};
use crate::workflows::placement::payout::{PayoutError, PayoutLedger, PayoutRecord};

/// A stale write is retried once with fresh state before surfacing a conflict.
const TRANSITION_ATTEMPTS: usize = 2;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Service composing duplicate screening, the state machine, storage, and commission payouts.
pub struct ApplicationWorkflowService<R, J, P> {
    repository: Arc<R>,
    jobs: Arc<J>,
    payouts: Arc<P>,
    validator: DuplicateValidator<R>,
    state_machine: ApplicationStateMachine,
    commission: CommissionEngine,
    locks: ApplicationLocks,
}

impl<R, J, P> ApplicationWorkflowService<R, J, P>
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    pub fn new(
        repository: Arc<R>,
        jobs: Arc<J>,
        payouts: Arc<P>,
        settings: CommissionSettings,
    ) -> Self {
        Self::with_policy(repository, jobs, payouts, settings, TransitionPolicy::AllowAll)
    }

    pub fn with_policy(
        repository: Arc<R>,
        jobs: Arc<J>,
        payouts: Arc<P>,
        settings: CommissionSettings,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            validator: DuplicateValidator::new(repository.clone()),
            repository,
            jobs,
            payouts,
            state_machine: ApplicationStateMachine::new(policy),
            commission: CommissionEngine::new(settings),
            locks: ApplicationLocks::default(),
        }
    }

    pub fn commission_settings(&self) -> &CommissionSettings {
        self.commission.settings()
    }

    /// Advisory duplicate check for forms that validate before uploading.
    pub fn validate(
        &self,
        email: &str,
        phone: &str,
        job_id: &JobId,
    ) -> Result<ValidationResult, ApplicationServiceError> {
        Ok(self.validator.validate_candidate(email, phone, job_id)?)
    }

    pub fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.submit_at(request, Utc::now())
    }

    /// Screen and store a new submission. Nothing is written when validation fails.
    pub fn submit_at(
        &self,
        request: SubmissionRequest,
        submitted_at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let validation =
            self.validator
                .validate_candidate(&request.email, &request.phone, &request.job_id)?;
        if !validation.is_valid {
            return Err(ApplicationServiceError::Validation(validation));
        }

        let identity = CandidateIdentity::parse(&request.email, &request.phone).map_err(|err| {
            ApplicationServiceError::Validation(ValidationResult::from_errors(vec![
                ValidationIssue::from_identity_error(&err),
            ]))
        })?;

        let draft = ApplicationDraft {
            id: next_application_id(),
            job_id: request.job_id,
            identity,
            candidate: request.candidate,
            submitted_by: request.submitted_by,
            screening_answers: request.screening_answers,
            attachments: request.attachments,
        };
        let application = self.state_machine.open(draft, submitted_at);

        match self.repository.insert(application) {
            Ok(record) => {
                info!(
                    application_id = %record.application.id,
                    job_id = %record.application.job_id,
                    recruiter = %record.application.submitted_by.id,
                    "application submitted"
                );
                Ok(record)
            }
            Err(RepositoryError::DuplicateCandidate { job_id }) => {
                info!(%job_id, "concurrent submission lost the uniqueness race");
                Err(ApplicationServiceError::Validation(
                    ValidationResult::duplicate_for_job(),
                ))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Apply a status change. Transitions for the same application are serialized, and a
    /// stale write is retried once against freshly loaded state.
    ///
    /// Entering HIRED prices the job before anything is written, so a missing listing leaves
    /// the application untouched. A payout already on the ledger is kept as is.
    pub fn change_status(
        &self,
        application_id: &ApplicationId,
        new_status: ApplicationStatus,
        actor: &Actor,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let occurred_at = occurred_at.unwrap_or_else(Utc::now);

        self.locks.with_lock(application_id, || -> Result<_, ApplicationServiceError> {
            let pending_payout = if new_status == ApplicationStatus::Hired {
                self.pending_payout(application_id)?
            } else {
                None
            };

            let record = self.transition_with_retry(application_id, new_status, occurred_at)?;
            info!(
                %application_id,
                status = %new_status,
                actor = %actor.id,
                version = record.version,
                "application status changed"
            );

            if let Some(quote) = pending_payout {
                self.record_payout(&record, quote, occurred_at)?;
            }
            Ok(record)
        })
    }

    /// Quote owed on hire, or `None` when this application was already paid out.
    fn pending_payout(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<CommissionQuote>, ApplicationServiceError> {
        if let Some(existing) = self.payouts.find(application_id)? {
            info!(
                %application_id,
                hired_at = %existing.hired_at,
                recruiter_amount = existing.breakdown.recruiter_amount,
                "payout already recorded; keeping the original snapshot"
            );
            return Ok(None);
        }

        let current = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        self.commission_for_job(&current.application.job_id).map(Some)
    }

    fn transition_with_retry(
        &self,
        application_id: &ApplicationId,
        new_status: ApplicationStatus,
        occurred_at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        for attempt in 1..=TRANSITION_ATTEMPTS {
            let current = self
                .repository
                .fetch(application_id)?
                .ok_or(RepositoryError::NotFound)?;

            let application =
                self.state_machine
                    .transition(current.application, new_status, Some(occurred_at))?;

            let candidate = ApplicationRecord {
                application,
                version: current.version,
            };

            match self.repository.update_status(candidate) {
                Ok(stored) => return Ok(stored),
                Err(RepositoryError::StaleVersion { expected, found }) => {
                    warn!(
                        %application_id,
                        attempt,
                        expected,
                        found,
                        "stale application version during transition"
                    );
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(ApplicationServiceError::ConcurrencyConflict {
            application_id: application_id.clone(),
        })
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Price raw terms and log any anomalies found in them.
    pub fn quote(&self, terms: &JobCommissionTerms, salary_max: f64) -> CommissionQuote {
        let quote = self.commission.quote(terms, salary_max);
        for anomaly in &quote.anomalies {
            warn!(anomaly = %anomaly.summary(), "commission configuration anomaly");
        }
        quote
    }

    pub fn commission_for_job(
        &self,
        job_id: &JobId,
    ) -> Result<CommissionQuote, ApplicationServiceError> {
        let snapshot = self
            .jobs
            .job_commission_terms(job_id)?
            .ok_or_else(|| JobDirectoryError::NotFound(job_id.clone()))?;
        Ok(self.quote(&snapshot.terms, snapshot.salary_max))
    }

    fn record_payout(
        &self,
        record: &ApplicationRecord,
        quote: CommissionQuote,
        hired_at: DateTime<Utc>,
    ) -> Result<(), ApplicationServiceError> {
        let application = &record.application;
        let breakdown = quote.breakdown;

        self.payouts.record(PayoutRecord {
            application_id: application.id.clone(),
            job_id: application.job_id.clone(),
            recruiter_id: application.submitted_by.id.clone(),
            currency: self.commission.settings().currency.clone(),
            breakdown,
            hired_at,
        })?;

        info!(
            application_id = %application.id,
            recruiter_amount = breakdown.recruiter_amount,
            platform_fee_amount = breakdown.platform_fee_amount,
            "payout recorded for hire"
        );
        Ok(())
    }
}

/// Error raised by the application workflow service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("submission rejected: {0}")]
    Validation(ValidationResult),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("application {application_id} was modified concurrently; retry with fresh state")]
    ConcurrencyConflict { application_id: ApplicationId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Jobs(#[from] JobDirectoryError),
    #[error(transparent)]
    Payout(#[from] PayoutError),
}

impl ApplicationServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApplicationServiceError::ConcurrencyConflict { .. })
    }
}
