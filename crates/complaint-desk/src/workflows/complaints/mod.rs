//! Complaint intake, priority triage, department routing, and status tracking.

pub mod domain;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod routing;
pub mod service;
pub mod triage;
pub mod webhooks;

#[cfg(test)]
mod tests;

pub use domain::{
    CitizenId, Complaint, ComplaintCategory, ComplaintId, ComplaintInput, ComplaintStatus,
    ComplaintSubmission, StatusChange, StatusUpdate,
};
pub use repository::{
    CitizenContact, CitizenDirectory, ComplaintFilter, ComplaintRepository, NoCitizenDirectory,
    Notification, NotificationChannel, NotificationError, NotificationPublisher, RepositoryError,
};
pub use router::complaint_router;
pub use routing::{assign_authority, Authority, AuthorityDirectory, AuthorityId, RoutingTable};
pub use service::{ComplaintService, ComplaintServiceError, IntakeError, TriagePreview};
pub use triage::{KeywordSet, Priority, PriorityScore, PriorityScorer, ScoringTier, MAX_SCORE};
pub use webhooks::{WebhookError, WebhookEvent, WebhookKind, WebhookOutcome};
