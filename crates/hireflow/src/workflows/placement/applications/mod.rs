//! Candidate submissions against job listings: duplicate screening at intake, the review
//! state machine, and the workflow service that ties both to storage and payouts.

pub mod domain;
pub mod duplicates;
pub mod identity;
pub mod lifecycle;
mod locks;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, ActorRole, Application, ApplicationDraft, ApplicationId, ApplicationStatus,
    CandidateKey, CandidateProfile, FileKind, FileReference, ScreeningAnswer, StatusTimestamps,
    SubmissionRequest, UnknownStatus,
};
pub use duplicates::{
    DuplicateValidator, ValidationIssue, ValidationResult, DUPLICATE_FOR_JOB, INVALID_EMAIL,
    INVALID_PHONE,
};
pub use identity::{CandidateIdentity, IdentityError, NormalizedEmail, NormalizedPhone};
pub use lifecycle::{ApplicationStateMachine, TransitionError, TransitionPolicy};
pub use locks::ApplicationLocks;
pub use repository::{
    holds_candidate_slot, ApplicationRecord, ApplicationRepository, ApplicationStatusView,
    RepositoryError, TimelineEntry,
};
pub use router::application_router;
pub use service::{ApplicationServiceError, ApplicationWorkflowService};
