use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::complaints::ComplaintServiceError;
use crate::workflows::reports::ReportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Complaint(ComplaintServiceError),
    Report(ReportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Complaint(err) => write!(f, "complaint error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Complaint(err) => Some(err),
            AppError::Report(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Complaint(err) => err.status_code(),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ComplaintServiceError> for AppError {
    fn from(value: ComplaintServiceError) -> Self {
        Self::Complaint(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::complaints::{ComplaintStatus, IntakeError, RepositoryError};

    #[test]
    fn client_errors_map_to_client_statuses() {
        let intake = AppError::from(ComplaintServiceError::from(IntakeError::MissingField(
            "title",
        )));
        assert_eq!(intake.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(ComplaintServiceError::from(RepositoryError::NotFound));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let transition = AppError::from(ComplaintServiceError::InvalidTransition {
            from: ComplaintStatus::Resolved,
            to: ComplaintStatus::Pending,
        });
        assert_eq!(transition.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_conflicts_map_to_conflict_like_the_complaint_routes() {
        for err in [
            RepositoryError::Conflict,
            RepositoryError::StatusChanged(ComplaintStatus::Rejected),
        ] {
            let err = ComplaintServiceError::from(err);
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
            assert_eq!(
                AppError::from(err).into_response().status(),
                StatusCode::CONFLICT
            );
        }

        let offline = AppError::from(ComplaintServiceError::from(RepositoryError::Unavailable(
            "database offline".to_string(),
        )));
        assert_eq!(
            offline.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
