use hireflow::workflows::placement::applications::ApplicationWorkflowService;
use hireflow::workflows::placement::commission::{CommissionSettings, JobCommissionTerms};
use hireflow::workflows::placement::jobs::{JobCommissionSnapshot, JobId};
use hireflow::workflows::placement::memory::{
    InMemoryApplicationRepository, InMemoryJobDirectory, InMemoryPayoutLedger,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryService =
    ApplicationWorkflowService<InMemoryApplicationRepository, InMemoryJobDirectory, InMemoryPayoutLedger>;

pub(crate) struct InMemoryStack {
    pub(crate) service: Arc<InMemoryService>,
    pub(crate) jobs: Arc<InMemoryJobDirectory>,
    pub(crate) payouts: Arc<InMemoryPayoutLedger>,
}

/// Service over process-local storage, with the job directory seeded from [`demo_jobs`].
pub(crate) fn in_memory_stack(settings: CommissionSettings) -> InMemoryStack {
    let jobs = Arc::new(InMemoryJobDirectory::with_listings(demo_jobs()));
    let payouts = Arc::new(InMemoryPayoutLedger::default());
    let service = Arc::new(ApplicationWorkflowService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        jobs.clone(),
        payouts.clone(),
        settings,
    ));
    InMemoryStack {
        service,
        jobs,
        payouts,
    }
}

pub(crate) const DEMO_JOB_ID: &str = "job-backend-01";

pub(crate) fn demo_jobs() -> Vec<JobCommissionSnapshot> {
    vec![
        JobCommissionSnapshot {
            job_id: JobId(DEMO_JOB_ID.to_string()),
            title: "Senior Backend Engineer".to_string(),
            terms: JobCommissionTerms::percentage(8.33, 40.0),
            salary_max: 2_400_000.0,
        },
        JobCommissionSnapshot {
            job_id: JobId("job-data-02".to_string()),
            title: "Data Platform Lead".to_string(),
            terms: JobCommissionTerms::fixed(150_000.0, 30.0),
            salary_max: 3_600_000.0,
        },
        JobCommissionSnapshot {
            job_id: JobId("job-ops-03".to_string()),
            title: "Operations Manager".to_string(),
            terms: JobCommissionTerms::percentage(12.0, 40.0),
            salary_max: 1_200_000.0,
        },
    ]
}
