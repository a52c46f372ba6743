use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{Application, ApplicationDraft, ApplicationId, ApplicationStatus};

/// Which `(from, to)` moves the state machine accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may move to any other status, so admins can fast-track or correct records.
    #[default]
    AllowAll,
    Restricted(BTreeSet<(ApplicationStatus, ApplicationStatus)>),
}

impl TransitionPolicy {
    pub fn restricted<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (ApplicationStatus, ApplicationStatus)>,
    {
        Self::Restricted(pairs.into_iter().collect())
    }

    pub fn allows(&self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        match self {
            TransitionPolicy::AllowAll => true,
            TransitionPolicy::Restricted(pairs) => pairs.contains(&(from, to)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application {application_id} cannot re-enter SUBMITTED; it is only set at creation")]
    InitialStateReentry { application_id: ApplicationId },
    #[error("transition {from} -> {to} is not allowed for application {application_id}")]
    NotAllowed {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
}

/// Sole writer of `Application::status` and its timestamp ledger.
#[derive(Debug, Clone, Default)]
pub struct ApplicationStateMachine {
    policy: TransitionPolicy,
}

impl ApplicationStateMachine {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    /// Create an application in SUBMITTED with only the SUBMITTED timestamp recorded.
    pub fn open(&self, draft: ApplicationDraft, submitted_at: DateTime<Utc>) -> Application {
        Application::from_draft(draft, submitted_at)
    }

    /// Move `application` to `new_status`, stamping `occurred_at` (or now) for that status.
    ///
    /// Timestamps for previously entered statuses are retained; re-entering a status only
    /// overwrites that status's own entry.
    pub fn transition(
        &self,
        mut application: Application,
        new_status: ApplicationStatus,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<Application, TransitionError> {
        let from = application.status();

        if new_status == ApplicationStatus::Submitted {
            return Err(TransitionError::InitialStateReentry {
                application_id: application.id.clone(),
            });
        }

        if !self.policy.allows(from, new_status) {
            return Err(TransitionError::NotAllowed {
                application_id: application.id.clone(),
                from,
                to: new_status,
            });
        }

        if from.is_conventionally_final() && from != new_status {
            info!(
                application_id = %application.id,
                %from,
                to = %new_status,
                "reopening application from a final status"
            );
        }

        application.enter(new_status, occurred_at.unwrap_or_else(Utc::now));
        Ok(application)
    }
}
