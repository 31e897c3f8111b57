use crate::infra::{deserialize_optional_date, AppState};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use complaint_desk::error::AppError;
use complaint_desk::workflows::complaints::{complaint_router, ComplaintCategory};
use complaint_desk::workflows::reports::export::attachment_name;
use complaint_desk::workflows::reports::{
    AnalyticsPeriod, ComplaintAnalytics, Report, ReportFormat, ReportKind,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnalyticsQuery {
    #[serde(default)]
    pub(crate) period: Option<String>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) format: Option<String>,
}

pub(crate) fn with_complaint_routes(state: &AppState) -> axum::Router {
    complaint_router(state.complaints.clone())
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/analytics", axum::routing::get(analytics_endpoint))
        .route("/api/v1/reports", axum::routing::get(report_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// `all` or an empty value means no category filter.
pub(crate) fn category_filter(raw: Option<&str>) -> Option<ComplaintCategory> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("all"))
        .map(ComplaintCategory::parse)
}

pub(crate) async fn analytics_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ComplaintAnalytics>, AppError> {
    let period = query
        .period
        .as_deref()
        .map(AnalyticsPeriod::parse)
        .unwrap_or_default();
    let category = category_filter(query.category.as_deref());
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());

    let complaints = state.complaints.all()?;
    Ok(Json(ComplaintAnalytics::compute(
        &complaints,
        period,
        today,
        category,
    )))
}

pub(crate) async fn report_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let kind = query
        .kind
        .as_deref()
        .map(ReportKind::parse)
        .unwrap_or_default();
    let format = query
        .format
        .as_deref()
        .map(ReportFormat::parse)
        .unwrap_or_default();

    let complaints = state.complaints.all()?;
    let report = Report::build(kind, &complaints, state.complaints.authorities());

    let response = match format {
        ReportFormat::Json => Json(report.to_json()?).into_response(),
        ReportFormat::Csv => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", attachment_name(kind)),
                ),
            ],
            report.to_csv()?,
        )
            .into_response(),
    };
    Ok(response)
}
