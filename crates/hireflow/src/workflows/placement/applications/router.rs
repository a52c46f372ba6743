use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Actor, ApplicationId, ApplicationStatus, SubmissionRequest};
use super::duplicates::DUPLICATE_FOR_JOB;
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{ApplicationServiceError, ApplicationWorkflowService};
use crate::workflows::placement::commission::JobCommissionTerms;
use crate::workflows::placement::jobs::{JobDirectory, JobDirectoryError, JobId};
use crate::workflows::placement::payout::PayoutLedger;

type SharedService<R, J, P> = Arc<ApplicationWorkflowService<R, J, P>>;

#[derive(Debug, Deserialize)]
pub struct ValidateCandidateRequest {
    pub job_id: JobId,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ApplicationStatus,
    pub actor: Actor,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CommissionQuoteRequest {
    pub terms: JobCommissionTerms,
    pub salary_max: f64,
}

/// Router builder exposing HTTP endpoints for submissions, status changes, and commissions.
pub fn application_router<R, J, P>(service: SharedService<R, J, P>) -> Router
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<R, J, P>))
        .route(
            "/api/v1/applications/validate",
            post(validate_handler::<R, J, P>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(status_handler::<R, J, P>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            post(change_status_handler::<R, J, P>),
        )
        .route(
            "/api/v1/jobs/:job_id/commission",
            get(job_commission_handler::<R, J, P>),
        )
        .route(
            "/api/v1/commission/quote",
            post(quote_handler::<R, J, P>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    axum::Json(request): axum::Json<SubmissionRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    match service.submit(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn validate_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    axum::Json(request): axum::Json<ValidateCandidateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    match service.validate(&request.email, &request.phone, &request.job_id) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn change_status_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusChangeRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    let id = ApplicationId(application_id);
    match service.change_status(&id, request.status, &request.actor, request.occurred_at) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn job_commission_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    Path(job_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    match service.commission_for_job(&JobId(job_id)) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn quote_handler<R, J, P>(
    State(service): State<SharedService<R, J, P>>,
    axum::Json(request): axum::Json<CommissionQuoteRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    J: JobDirectory + 'static,
    P: PayoutLedger + 'static,
{
    let quote = service.quote(&request.terms, request.salary_max);
    (StatusCode::OK, axum::Json(quote)).into_response()
}

fn error_response(error: ApplicationServiceError) -> Response {
    match error {
        ApplicationServiceError::Validation(result) => {
            let status = if result.is_duplicate_for_job() {
                StatusCode::CONFLICT
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            (status, axum::Json(result)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::NotFound)
        | ApplicationServiceError::Jobs(JobDirectoryError::NotFound(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::Transition(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::ConcurrencyConflict { .. } => {
            let payload = json!({
                "error": error.to_string(),
                "retryable": true,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "application already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::DuplicateCandidate { .. }) => {
            let payload = json!({
                "error": error.to_string(),
                "code": DUPLICATE_FOR_JOB,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
