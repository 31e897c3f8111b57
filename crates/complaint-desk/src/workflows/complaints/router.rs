use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{
    CitizenId, ComplaintId, ComplaintInput, ComplaintStatus, ComplaintSubmission, StatusChange,
};
use super::repository::{
    ComplaintFilter, ComplaintRepository, NotificationPublisher, RepositoryError,
};
use super::routing::AuthorityId;
use super::service::{ComplaintService, ComplaintServiceError};
use super::webhooks::{self, WebhookError, WebhookEvent, WebhookKind, WEBHOOK_TYPE_HEADER};

/// Router builder exposing complaint intake, tracking, and triage endpoints.
pub fn complaint_router<R, N>(service: Arc<ComplaintService<R, N>>) -> Router
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/complaints",
            post(submit_handler::<R, N>).get(list_handler::<R, N>),
        )
        .route("/api/v1/complaints/triage", post(triage_handler::<R, N>))
        .route(
            "/api/v1/complaints/:complaint_id",
            get(status_handler::<R, N>),
        )
        .route(
            "/api/v1/complaints/:complaint_id/status",
            put(update_status_handler::<R, N>),
        )
        .route("/api/v1/webhooks", post(webhook_handler::<R, N>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ComplaintListQuery {
    #[serde(default)]
    pub(crate) citizen_id: Option<String>,
    #[serde(default)]
    pub(crate) authority_id: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<ComplaintStatus>,
}

async fn simulate_latency<R, N>(service: &ComplaintService<R, N>)
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let latency = service.simulated_latency();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<ComplaintService<R, N>>>,
    Json(submission): Json<ComplaintSubmission>,
) -> Response
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    simulate_latency(&service).await;
    match service.submit(submission) {
        Ok(complaint) => (StatusCode::CREATED, Json(complaint)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn triage_handler<R, N>(
    State(service): State<Arc<ComplaintService<R, N>>>,
    Json(input): Json<ComplaintInput>,
) -> Response
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    simulate_latency(&service).await;
    (StatusCode::OK, Json(service.preview(&input))).into_response()
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<ComplaintService<R, N>>>,
    Query(query): Query<ComplaintListQuery>,
) -> Response
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let citizen_id = query.citizen_id.filter(|id| !id.trim().is_empty());
    let authority_id = query.authority_id.filter(|id| !id.trim().is_empty());
    if citizen_id.is_none() && authority_id.is_none() {
        let payload = json!({ "error": "missing citizen_id or authority_id" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    let filter = ComplaintFilter {
        citizen_id: citizen_id.map(CitizenId),
        authority_id: authority_id.map(AuthorityId),
        status: query.status,
        category: None,
    };

    match service.list(&filter) {
        Ok(complaints) => (StatusCode::OK, Json(complaints)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<ComplaintService<R, N>>>,
    Path(complaint_id): Path<String>,
) -> Response
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.get(&ComplaintId(complaint_id)) {
        Ok(complaint) => (StatusCode::OK, Json(complaint)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn update_status_handler<R, N>(
    State(service): State<Arc<ComplaintService<R, N>>>,
    Path(complaint_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.update_status(&ComplaintId(complaint_id), change) {
        Ok(complaint) => (StatusCode::OK, Json(complaint)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn webhook_handler<R, N>(
    State(service): State<Arc<ComplaintService<R, N>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let kind = headers
        .get(WEBHOOK_TYPE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(WebhookKind::from_header)
        .ok_or(WebhookError::UnknownType);

    let outcome = kind
        .and_then(|kind| WebhookEvent::decode(kind, body))
        .and_then(|event| webhooks::dispatch(&service, event));

    match outcome {
        Ok(_) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(WebhookError::Service(err)) => service_error_response(err),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

impl ComplaintServiceError {
    /// HTTP status shared by the complaint routes and `AppError`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Intake(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Repository(RepositoryError::Conflict | RepositoryError::StatusChanged(_)) => {
                StatusCode::CONFLICT
            }
            Self::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub(crate) fn service_error_response(err: ComplaintServiceError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (err.status_code(), Json(payload)).into_response()
}
