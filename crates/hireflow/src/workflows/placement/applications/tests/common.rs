use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::placement::applications::domain::{
    Actor, Application, ApplicationDraft, ApplicationId, CandidateProfile, FileKind,
    FileReference, ScreeningAnswer, SubmissionRequest,
};
use crate::workflows::placement::applications::identity::{
    CandidateIdentity, NormalizedEmail, NormalizedPhone,
};
use crate::workflows::placement::applications::lifecycle::ApplicationStateMachine;
use crate::workflows::placement::applications::repository::{
    ApplicationRecord, ApplicationRepository, RepositoryError,
};
use crate::workflows::placement::applications::{application_router, ApplicationWorkflowService};
use crate::workflows::placement::commission::{CommissionSettings, JobCommissionTerms};
use crate::workflows::placement::jobs::{JobCommissionSnapshot, JobId};
pub(super) use crate::workflows::placement::memory::{
    InMemoryApplicationRepository, InMemoryJobDirectory, InMemoryPayoutLedger,
};

pub(super) type MemoryService =
    ApplicationWorkflowService<InMemoryApplicationRepository, InMemoryJobDirectory, InMemoryPayoutLedger>;

pub(super) const EMAIL: &str = "a@x.com";
pub(super) const PHONE: &str = "+15551234567";

pub(super) fn job_id() -> JobId {
    JobId("job1".to_string())
}

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 3, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn identity() -> CandidateIdentity {
    CandidateIdentity::parse(EMAIL, PHONE).expect("valid identity")
}

pub(super) fn submission() -> SubmissionRequest {
    SubmissionRequest {
        job_id: job_id(),
        email: EMAIL.to_string(),
        phone: PHONE.to_string(),
        candidate: CandidateProfile {
            full_name: "Asha Rao".to_string(),
            current_title: Some("Backend Engineer".to_string()),
            current_company: Some("Northwind".to_string()),
            location: Some("Pune".to_string()),
            total_experience_years: Some(6.5),
            current_salary: Some(1_800_000.0),
            expected_salary: Some(2_400_000.0),
            notice_period_days: Some(30),
        },
        submitted_by: Actor::recruiter("rec-17"),
        screening_answers: vec![ScreeningAnswer {
            question_id: "q-relocate".to_string(),
            answer: "yes".to_string(),
        }],
        attachments: vec![FileReference {
            name: "asha-rao.pdf".to_string(),
            kind: FileKind::Resume,
            storage_key: "uploads/resumes/asha-rao.pdf".to_string(),
        }],
    }
}

pub(super) fn draft(id: &str, job: &str) -> ApplicationDraft {
    let request = submission();
    ApplicationDraft {
        id: ApplicationId(id.to_string()),
        job_id: JobId(job.to_string()),
        identity: identity(),
        candidate: request.candidate,
        submitted_by: request.submitted_by,
        screening_answers: request.screening_answers,
        attachments: request.attachments,
    }
}

pub(super) fn opened(id: &str) -> Application {
    ApplicationStateMachine::default().open(draft(id, "job1"), at(9))
}

/// Store an application through the regular insert path.
pub(super) fn seed(repository: &InMemoryApplicationRepository, application: Application) {
    repository.insert(application).expect("seed application");
}

pub(super) fn percentage_job() -> JobCommissionSnapshot {
    JobCommissionSnapshot {
        job_id: job_id(),
        title: "Senior Backend Engineer".to_string(),
        terms: JobCommissionTerms::percentage(10.0, 40.0),
        salary_max: 600_000.0,
    }
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryApplicationRepository>,
    Arc<InMemoryJobDirectory>,
    Arc<InMemoryPayoutLedger>,
) {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let jobs = Arc::new(InMemoryJobDirectory::with_listings([percentage_job()]));
    let payouts = Arc::new(InMemoryPayoutLedger::default());
    let service = ApplicationWorkflowService::new(
        repository.clone(),
        jobs.clone(),
        payouts.clone(),
        CommissionSettings::default(),
    );
    (service, repository, jobs, payouts)
}

pub(super) fn service_with<R>(
    repository: Arc<R>,
) -> ApplicationWorkflowService<R, InMemoryJobDirectory, InMemoryPayoutLedger>
where
    R: ApplicationRepository + 'static,
{
    ApplicationWorkflowService::new(
        repository,
        Arc::new(InMemoryJobDirectory::with_listings([percentage_job()])),
        Arc::new(InMemoryPayoutLedger::default()),
        CommissionSettings::default(),
    )
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Writes the stored record again behind the service's back a fixed number of times, so
/// the service's next write carries a stale version.
pub(super) struct InterferingRepository {
    pub(super) inner: InMemoryApplicationRepository,
    pub(super) interferences: AtomicUsize,
}

impl InterferingRepository {
    pub(super) fn new(interferences: usize) -> Self {
        Self {
            inner: InMemoryApplicationRepository::default(),
            interferences: AtomicUsize::new(interferences),
        }
    }
}

impl ApplicationRepository for InterferingRepository {
    fn find_by_candidate(
        &self,
        email: &NormalizedEmail,
        phone: &NormalizedPhone,
        job_id: Option<&JobId>,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.find_by_candidate(email, phone, job_id)
    }

    fn insert(&self, application: Application) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(application)
    }

    fn update_status(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let remaining = self.interferences.load(Ordering::SeqCst);
        if remaining > 0 {
            self.interferences.store(remaining - 1, Ordering::SeqCst);
            if let Some(stored) = self.inner.fetch(&record.application.id)? {
                self.inner.update_status(stored)?;
            }
        }
        self.inner.update_status(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }
}

/// Reports no prior applications but loses the uniqueness race at write time.
pub(super) struct RacingRepository;

impl ApplicationRepository for RacingRepository {
    fn find_by_candidate(
        &self,
        _email: &NormalizedEmail,
        _phone: &NormalizedPhone,
        _job_id: Option<&JobId>,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn insert(&self, application: Application) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::DuplicateCandidate {
            job_id: application.job_id,
        })
    }

    fn update_status(
        &self,
        _record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(None)
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn find_by_candidate(
        &self,
        _email: &NormalizedEmail,
        _phone: &NormalizedPhone,
        _job_id: Option<&JobId>,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert(&self, _application: Application) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _record: ApplicationRecord,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
