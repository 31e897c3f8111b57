use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::domain::{Complaint, ComplaintId, ComplaintSubmission, StatusChange};
use super::repository::{ComplaintRepository, NotificationPublisher};
use super::service::{ComplaintService, ComplaintServiceError};

pub const WEBHOOK_TYPE_HEADER: &str = "x-webhook-type";

/// Event types partner systems may push to the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    ComplaintStatusUpdate,
    NewComplaint,
    PaymentNotification,
}

impl WebhookKind {
    pub fn from_header(value: &str) -> Option<Self> {
        match value.trim() {
            "complaint_status_update" => Some(Self::ComplaintStatusUpdate),
            "new_complaint" => Some(Self::NewComplaint),
            "payment_notification" => Some(Self::PaymentNotification),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusWebhook {
    pub complaint_id: ComplaintId,
    #[serde(flatten)]
    pub change: StatusChange,
}

/// Decoded webhook payload.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    ComplaintStatusUpdate(StatusWebhook),
    NewComplaint(ComplaintSubmission),
    PaymentNotification(Value),
}

impl WebhookEvent {
    pub fn decode(kind: WebhookKind, body: Value) -> Result<Self, WebhookError> {
        let event = match kind {
            WebhookKind::ComplaintStatusUpdate => {
                Self::ComplaintStatusUpdate(serde_json::from_value(body)?)
            }
            WebhookKind::NewComplaint => Self::NewComplaint(serde_json::from_value(body)?),
            WebhookKind::PaymentNotification => Self::PaymentNotification(body),
        };
        Ok(event)
    }
}

/// What a processed webhook changed, if anything.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Updated(Complaint),
    Registered(Complaint),
    Acknowledged,
}

pub fn dispatch<R, N>(
    service: &ComplaintService<R, N>,
    event: WebhookEvent,
) -> Result<WebhookOutcome, WebhookError>
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match event {
        WebhookEvent::ComplaintStatusUpdate(StatusWebhook {
            complaint_id,
            change,
        }) => Ok(WebhookOutcome::Updated(
            service.update_status(&complaint_id, change)?,
        )),
        WebhookEvent::NewComplaint(submission) => {
            Ok(WebhookOutcome::Registered(service.submit(submission)?))
        }
        WebhookEvent::PaymentNotification(payload) => {
            info!(%payload, "payment notification received");
            Ok(WebhookOutcome::Acknowledged)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("unknown webhook type")]
    UnknownType,
    #[error("malformed webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Service(#[from] ComplaintServiceError),
}
