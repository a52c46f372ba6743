use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::workflows::placement::applications::domain::{Actor, ApplicationId, ApplicationStatus};
use crate::workflows::placement::applications::lifecycle::TransitionError;
use crate::workflows::placement::applications::repository::{
    ApplicationRepository, RepositoryError,
};
use crate::workflows::placement::applications::ApplicationServiceError;
use crate::workflows::placement::commission::{
    CommissionAnomaly, CommissionType, JobCommissionTerms,
};
use crate::workflows::placement::jobs::{JobCommissionSnapshot, JobDirectoryError, JobId};

#[test]
fn submit_creates_application_in_submitted() {
    let (service, repository, _, _) = build_service();

    let record = service
        .submit_at(submission(), at(9))
        .expect("submission succeeds");

    let application = &record.application;
    assert_eq!(application.status(), ApplicationStatus::Submitted);
    assert_eq!(
        application
            .status_timestamps()
            .get(ApplicationStatus::Submitted),
        Some(at(9))
    );
    assert_eq!(application.status_timestamps().len(), 1);
    assert_eq!(application.identity.email.as_str(), EMAIL);
    assert_eq!(application.screening_answers.len(), 1);
    assert_eq!(record.version, 1);
    assert_eq!(repository.len(), 1);
}

#[test]
fn duplicate_submission_is_rejected_without_writing() {
    let (service, repository, _, _) = build_service();
    service.submit(submission()).expect("first submission");

    let mut again = submission();
    again.email = "A@X.COM".to_string();
    again.submitted_by = Actor::recruiter("rec-99");

    match service.submit(again) {
        Err(ApplicationServiceError::Validation(result)) => {
            assert!(result.is_duplicate_for_job());
            assert!(result.warnings.is_empty());
        }
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
    assert_eq!(repository.len(), 1);
}

#[test]
fn same_candidate_can_apply_to_another_job() {
    let (service, repository, _, _) = build_service();
    service.submit(submission()).expect("first job");

    let mut other_job = submission();
    other_job.job_id = JobId("job2".to_string());
    service.submit(other_job).expect("second job accepted");

    assert_eq!(repository.len(), 2);
}

#[test]
fn malformed_contact_details_are_validation_errors() {
    let (service, repository, _, _) = build_service();
    let mut request = submission();
    request.phone = "98765 43210".to_string();

    match service.submit(request) {
        Err(ApplicationServiceError::Validation(result)) => {
            assert!(!result.is_valid);
            assert_eq!(result.errors[0].field, "phone");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(repository.len(), 0);
}

#[test]
fn lost_uniqueness_race_surfaces_as_duplicate() {
    let service = service_with(Arc::new(RacingRepository));

    match service.submit(submission()) {
        Err(ApplicationServiceError::Validation(result)) => {
            assert!(result.is_duplicate_for_job())
        }
        other => panic!("expected duplicate from storage race, got {other:?}"),
    }
}

#[test]
fn hire_records_payout_from_job_terms() {
    let (service, _, _, payouts) = build_service();
    let record = service.submit(submission()).expect("submission");
    let id = record.application.id.clone();

    let hired = service
        .change_status(&id, ApplicationStatus::Hired, &Actor::internal("ops-1"), Some(at(15)))
        .expect("hire");
    assert_eq!(hired.application.status(), ApplicationStatus::Hired);
    assert_eq!(hired.version, 2);

    let payout = payouts.get(&id).expect("payout recorded");
    assert_eq!(payout.recruiter_id, "rec-17");
    assert_eq!(payout.currency, "INR");
    assert_eq!(payout.hired_at, at(15));
    assert_eq!(payout.breakdown.original_amount, 60_000.0);
    assert_eq!(payout.breakdown.recruiter_amount, 36_000.0);
    assert_eq!(payout.breakdown.platform_fee_amount, 24_000.0);
}

#[test]
fn payout_is_not_recomputed_when_terms_change_after_hire() {
    let (service, _, jobs, payouts) = build_service();
    let id = service
        .submit(submission())
        .expect("submission")
        .application
        .id;
    service
        .change_status(&id, ApplicationStatus::Hired, &Actor::internal("ops-1"), Some(at(15)))
        .expect("hire");

    jobs.upsert(JobCommissionSnapshot {
        terms: JobCommissionTerms::fixed(10_000.0, 40.0),
        ..percentage_job()
    });
    service
        .change_status(&id, ApplicationStatus::Reviewed, &Actor::internal("ops-1"), Some(at(16)))
        .expect("administrative correction");

    let payout = payouts.get(&id).expect("payout kept");
    assert_eq!(payout.breakdown.commission_type, CommissionType::Percentage);
    assert_eq!(payout.breakdown.recruiter_amount, 36_000.0);
    assert_eq!(payouts.len(), 1);
}

#[test]
fn rehire_keeps_the_payout_recorded_at_first_hire() {
    let (service, _, jobs, payouts) = build_service();
    let ops = Actor::internal("ops-1");
    let id = service.submit(submission()).expect("submission").application.id;
    let first = service
        .change_status(&id, ApplicationStatus::Hired, &ops, Some(at(15)))
        .expect("hire");

    jobs.upsert(JobCommissionSnapshot {
        terms: JobCommissionTerms::fixed(10_000.0, 40.0),
        ..percentage_job()
    });
    let repeated = service
        .change_status(&id, ApplicationStatus::Hired, &ops, Some(at(15)))
        .expect("repeated hire");
    assert_eq!(repeated.application, first.application);

    service
        .change_status(&id, ApplicationStatus::Reviewed, &ops, Some(at(16)))
        .expect("administrative correction");
    service
        .change_status(&id, ApplicationStatus::Hired, &ops, Some(at(17)))
        .expect("hired again");

    let payout = payouts.get(&id).expect("payout kept");
    assert_eq!(payout.breakdown.commission_type, CommissionType::Percentage);
    assert_eq!(payout.breakdown.recruiter_amount, 36_000.0);
    assert_eq!(payout.hired_at, at(15));
    assert_eq!(payouts.len(), 1);
}

#[test]
fn non_hire_transitions_do_not_touch_payouts() {
    let (service, _, _, payouts) = build_service();
    let id = service.submit(submission()).expect("submission").application.id;

    for status in [
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewInProcess,
        ApplicationStatus::Offered,
    ] {
        service
            .change_status(&id, status, &Actor::internal("ops-1"), None)
            .expect("transition");
    }

    assert!(payouts.is_empty());
    let stored = service.get(&id).expect("stored");
    assert_eq!(stored.application.status(), ApplicationStatus::Offered);
    assert_eq!(stored.application.status_timestamps().len(), 5);
    assert_eq!(stored.version, 5);
}

#[test]
fn stale_write_is_retried_once() {
    let repository = Arc::new(InterferingRepository::new(1));
    let service = service_with(repository.clone());
    let id = service.submit(submission()).expect("submission").application.id;

    let record = service
        .change_status(&id, ApplicationStatus::Reviewed, &Actor::internal("ops-1"), None)
        .expect("retry succeeds");

    assert_eq!(record.application.status(), ApplicationStatus::Reviewed);
    assert_eq!(record.version, 3);
}

#[test]
fn repeated_stale_writes_surface_retryable_conflict() {
    let repository = Arc::new(InterferingRepository::new(2));
    let service = service_with(repository.clone());
    let id = service.submit(submission()).expect("submission").application.id;

    match service.change_status(&id, ApplicationStatus::Reviewed, &Actor::internal("ops-1"), None)
    {
        Err(err @ ApplicationServiceError::ConcurrencyConflict { .. }) => {
            assert!(err.is_retryable())
        }
        other => panic!("expected concurrency conflict, got {other:?}"),
    }

    let stored = repository
        .fetch(&id)
        .expect("fetch")
        .expect("record present");
    assert_eq!(stored.application.status(), ApplicationStatus::Submitted);
}

#[test]
fn concurrent_transitions_on_one_application_are_serialized() {
    let (service, _, _, _) = build_service();
    let service = Arc::new(service);
    let id = service.submit(submission()).expect("submission").application.id;

    let statuses = [
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::OnHold,
        ApplicationStatus::InterviewInProcess,
        ApplicationStatus::Interviewed,
        ApplicationStatus::SelectedInFinalInterview,
        ApplicationStatus::Offered,
        ApplicationStatus::OfferDeclined,
    ];

    let handles: Vec<_> = statuses
        .into_iter()
        .map(|status| {
            let service = service.clone();
            let id = id.clone();
            thread::spawn(move || {
                service.change_status(&id, status, &Actor::internal("ops-1"), None)
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .expect("thread completes")
            .expect("transition applied without conflict");
    }

    let stored = service.get(&id).expect("stored");
    assert_eq!(stored.version, 1 + statuses.len() as u64);
    assert_eq!(stored.application.status_timestamps().len(), 1 + statuses.len());
}

#[test]
fn reentering_submitted_is_rejected() {
    let (service, _, _, _) = build_service();
    let id = service.submit(submission()).expect("submission").application.id;

    match service.change_status(&id, ApplicationStatus::Submitted, &Actor::internal("ops-1"), None)
    {
        Err(ApplicationServiceError::Transition(TransitionError::InitialStateReentry { .. })) => {}
        other => panic!("expected transition error, got {other:?}"),
    }
}

#[test]
fn change_status_on_missing_application_is_not_found() {
    let (service, _, _, _) = build_service();

    match service.change_status(
        &ApplicationId("missing".to_string()),
        ApplicationStatus::Reviewed,
        &Actor::internal("ops-1"),
        None,
    ) {
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn commission_for_job_clamps_terms_and_reports_anomalies() {
    let (service, _, jobs, _) = build_service();
    jobs.upsert(JobCommissionSnapshot {
        job_id: JobId("job-rich".to_string()),
        title: "Principal Engineer".to_string(),
        terms: JobCommissionTerms::percentage(75.0, 40.0),
        salary_max: 1_000_000.0,
    });

    let quote = service
        .commission_for_job(&JobId("job-rich".to_string()))
        .expect("quote");

    assert_eq!(quote.breakdown.original_percentage, 50.0);
    assert_eq!(quote.breakdown.original_amount, 500_000.0);
    assert_eq!(
        quote.anomalies,
        vec![CommissionAnomaly::PercentageOutOfBounds {
            percentage: 75.0,
            min: 1.0,
            max: 50.0,
        }]
    );
}

#[test]
fn negative_salary_quotes_zero_with_anomaly() {
    let (service, _, _, _) = build_service();
    let quote = service.quote(&JobCommissionTerms::percentage(10.0, 40.0), -600_000.0);

    assert_eq!(quote.breakdown.original_amount, 0.0);
    assert_eq!(quote.breakdown.recruiter_amount, 0.0);
    assert_eq!(
        quote.anomalies,
        vec![CommissionAnomaly::NegativeSalary {
            salary_max: -600_000.0
        }]
    );
}

#[test]
fn unknown_job_commission_is_not_found() {
    let (service, _, _, _) = build_service();

    match service.commission_for_job(&JobId("ghost".to_string())) {
        Err(ApplicationServiceError::Jobs(JobDirectoryError::NotFound(job))) => {
            assert_eq!(job.0, "ghost")
        }
        other => panic!("expected job not found, got {other:?}"),
    }
}

#[test]
fn hire_for_unknown_job_fails_before_status_is_stored() {
    let (service, repository, _, payouts) = build_service();
    let mut request = submission();
    request.job_id = JobId("unlisted".to_string());
    let id = service.submit(request).expect("submission").application.id;

    match service.change_status(&id, ApplicationStatus::Hired, &Actor::internal("ops-1"), None) {
        Err(ApplicationServiceError::Jobs(JobDirectoryError::NotFound(_))) => {}
        other => panic!("expected job lookup failure, got {other:?}"),
    }

    let stored = repository.fetch(&id).expect("fetch").expect("present");
    assert_eq!(stored.application.status(), ApplicationStatus::Submitted);
    assert_eq!(stored.application.status_timestamps().get(ApplicationStatus::Hired), None);
    assert_eq!(stored.version, 1);
    assert!(payouts.is_empty());
}

#[test]
fn reopening_duplicate_conflicts_with_live_application() {
    let (service, _, _, _) = build_service();
    let first = service.submit(submission()).expect("first").application.id;
    service
        .change_status(&first, ApplicationStatus::Duplicate, &Actor::internal("ops-1"), None)
        .expect("mark duplicate");
    service.submit(submission()).expect("slot freed");

    match service.change_status(&first, ApplicationStatus::Reviewed, &Actor::internal("ops-1"), None)
    {
        Err(ApplicationServiceError::Repository(RepositoryError::DuplicateCandidate { job_id })) => {
            assert_eq!(job_id, JobId("job1".to_string()))
        }
        other => panic!("expected uniqueness violation, got {other:?}"),
    }
}
