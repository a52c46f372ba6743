use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::CandidateIdentity;
use crate::workflows::placement::jobs::JobId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review pipeline states, listed in typical progression order. The order is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Submitted,
    Reviewed,
    Shortlisted,
    #[serde(rename = "ONHOLD")]
    OnHold,
    InterviewInProcess,
    Interviewed,
    SelectedInFinalInterview,
    Offered,
    OfferDeclined,
    Hired,
    Rejected,
    Duplicate,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 12] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::OnHold,
        ApplicationStatus::InterviewInProcess,
        ApplicationStatus::Interviewed,
        ApplicationStatus::SelectedInFinalInterview,
        ApplicationStatus::Offered,
        ApplicationStatus::OfferDeclined,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
        ApplicationStatus::Duplicate,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::Reviewed => "REVIEWED",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::OnHold => "ONHOLD",
            ApplicationStatus::InterviewInProcess => "INTERVIEW_IN_PROCESS",
            ApplicationStatus::Interviewed => "INTERVIEWED",
            ApplicationStatus::SelectedInFinalInterview => "SELECTED_IN_FINAL_INTERVIEW",
            ApplicationStatus::Offered => "OFFERED",
            ApplicationStatus::OfferDeclined => "OFFER_DECLINED",
            ApplicationStatus::Hired => "HIRED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Duplicate => "DUPLICATE",
        }
    }

    /// Statuses that usually end a pipeline. Nothing prevents leaving them.
    pub const fn is_conventionally_final(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Duplicate
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == wanted)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

/// Append-only audit trail of when each status was last entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusTimestamps(BTreeMap<ApplicationStatus, DateTime<Utc>>);

impl StatusTimestamps {
    pub fn get(&self, status: ApplicationStatus) -> Option<DateTime<Utc>> {
        self.0.get(&status).copied()
    }

    pub fn contains(&self, status: ApplicationStatus) -> bool {
        self.0.contains_key(&status)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ApplicationStatus, DateTime<Utc>)> + '_ {
        self.0.iter().map(|(status, at)| (*status, *at))
    }

    /// Entries ordered by time, oldest first, for timeline rendering.
    pub fn timeline(&self) -> Vec<(ApplicationStatus, DateTime<Utc>)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by_key(|(status, at)| (*at, *status));
        entries
    }

    pub(super) fn record(&mut self, status: ApplicationStatus, at: DateTime<Utc>) {
        self.0.insert(status, at);
    }
}

/// Who performed a submission or status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn recruiter(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Recruiter,
        }
    }

    pub fn internal(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Recruiter,
    Internal,
    Admin,
}

/// Candidate fields captured by the submission form. Contact details are normalized separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_experience_years: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice_period_days: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningAnswer {
    pub question_id: String,
    pub answer: String,
}

/// Metadata for an uploaded file; the bytes live with the upload service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub name: String,
    pub kind: FileKind,
    pub storage_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Resume,
    CoverLetter,
    Other,
}

/// Inbound submission as received from the recruiter portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub job_id: JobId,
    pub email: String,
    pub phone: String,
    pub candidate: CandidateProfile,
    pub submitted_by: Actor,
    #[serde(default)]
    pub screening_answers: Vec<ScreeningAnswer>,
    #[serde(default)]
    pub attachments: Vec<FileReference>,
}

/// A candidate's submission against one job.
///
/// `status` and `status_timestamps` are written only by the state machine. The type is
/// serialize-only so no payload can set them either.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub identity: CandidateIdentity,
    pub candidate: CandidateProfile,
    pub submitted_by: Actor,
    pub screening_answers: Vec<ScreeningAnswer>,
    pub attachments: Vec<FileReference>,
    status: ApplicationStatus,
    status_timestamps: StatusTimestamps,
}

/// Everything an application needs before it enters the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDraft {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub identity: CandidateIdentity,
    pub candidate: CandidateProfile,
    pub submitted_by: Actor,
    pub screening_answers: Vec<ScreeningAnswer>,
    pub attachments: Vec<FileReference>,
}

impl Application {
    pub(super) fn from_draft(draft: ApplicationDraft, submitted_at: DateTime<Utc>) -> Self {
        let mut status_timestamps = StatusTimestamps::default();
        status_timestamps.record(ApplicationStatus::Submitted, submitted_at);

        Self {
            id: draft.id,
            job_id: draft.job_id,
            identity: draft.identity,
            candidate: draft.candidate,
            submitted_by: draft.submitted_by,
            screening_answers: draft.screening_answers,
            attachments: draft.attachments,
            status: ApplicationStatus::Submitted,
            status_timestamps,
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn status_timestamps(&self) -> &StatusTimestamps {
        &self.status_timestamps
    }

    pub fn candidate_key(&self) -> CandidateKey {
        CandidateKey {
            job_id: self.job_id.clone(),
            identity: self.identity.clone(),
        }
    }

    pub(super) fn enter(&mut self, status: ApplicationStatus, at: DateTime<Utc>) {
        self.status = status;
        self.status_timestamps.record(status, at);
    }
}

/// Storage uniqueness key: one live application per candidate per job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateKey {
    pub job_id: JobId,
    pub identity: CandidateIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip_through_from_str() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.label().parse::<ApplicationStatus>(), Ok(status));
        }
        assert_eq!(
            "interview in process".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::InterviewInProcess)
        );
        assert!("ARCHIVED".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_wire_labels() {
        let json = serde_json::to_string(&ApplicationStatus::OnHold).expect("serialize");
        assert_eq!(json, "\"ONHOLD\"");
        let json = serde_json::to_string(&ApplicationStatus::SelectedInFinalInterview)
            .expect("serialize");
        assert_eq!(json, "\"SELECTED_IN_FINAL_INTERVIEW\"");
    }
}
