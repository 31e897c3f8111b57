use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    CitizenId, Complaint, ComplaintId, ComplaintInput, ComplaintStatus, ComplaintSubmission,
    StatusChange, StatusUpdate,
};
use super::notifications;
use super::repository::{
    CitizenDirectory, ComplaintFilter, ComplaintRepository, NoCitizenDirectory,
    NotificationError, NotificationPublisher, RepositoryError,
};
use super::routing::{AuthorityDirectory, AuthorityId, RoutingTable};
use super::triage::{PriorityScore, PriorityScorer};
use crate::config::TriageConfig;

const REGISTERED_NOTE: &str = "Complaint registered";
/// Re-reads allowed when a concurrent status move wins the write.
const UPDATE_ATTEMPTS: usize = 3;

static COMPLAINT_SEQUENCE: AtomicU64 = AtomicU64::new(10_001);

fn next_complaint_id() -> ComplaintId {
    let id = COMPLAINT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ComplaintId(format!("CM{id:05}"))
}

/// Score plus routing decision for a complaint that has not been filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriagePreview {
    #[serde(flatten)]
    pub triage: PriorityScore,
    pub authority: AuthorityId,
}

/// Service composing triage, routing, storage, and notifications.
pub struct ComplaintService<R, N> {
    scorer: Arc<PriorityScorer>,
    routing: Arc<RoutingTable>,
    authorities: Arc<AuthorityDirectory>,
    citizens: Arc<dyn CitizenDirectory>,
    repository: Arc<R>,
    notifier: Arc<N>,
    config: TriageConfig,
}

impl<R, N> ComplaintService<R, N>
where
    R: ComplaintRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, config: TriageConfig) -> Self {
        Self {
            scorer: Arc::new(PriorityScorer::default()),
            routing: Arc::new(RoutingTable::standard()),
            authorities: Arc::new(AuthorityDirectory::standard()),
            citizens: Arc::new(NoCitizenDirectory),
            repository,
            notifier,
            config,
        }
    }

    pub fn with_citizen_directory(mut self, citizens: Arc<dyn CitizenDirectory>) -> Self {
        self.citizens = citizens;
        self
    }

    pub fn with_routing(mut self, routing: RoutingTable) -> Self {
        self.routing = Arc::new(routing);
        self
    }

    pub fn simulated_latency(&self) -> Duration {
        self.config.simulated_latency
    }

    pub fn authorities(&self) -> &AuthorityDirectory {
        &self.authorities
    }

    /// Score and route without storing anything.
    pub fn preview(&self, input: &ComplaintInput) -> TriagePreview {
        TriagePreview {
            triage: self.scorer.score(input),
            authority: self.routing.assign_authority(input.category).clone(),
        }
    }

    /// Register a new complaint and notify the department it was routed to.
    pub fn submit(
        &self,
        submission: ComplaintSubmission,
    ) -> Result<Complaint, ComplaintServiceError> {
        self.submit_on(submission, Local::now().date_naive())
    }

    pub fn submit_on(
        &self,
        submission: ComplaintSubmission,
        today: NaiveDate,
    ) -> Result<Complaint, ComplaintServiceError> {
        validate_submission(&submission)?;

        let ComplaintSubmission {
            complaint: input,
            citizen_id,
        } = submission;

        let TriagePreview { triage, authority } = self.preview(&input);
        let complaint = Complaint {
            id: next_complaint_id(),
            title: input.title,
            description: input.description,
            category: input.category,
            location: input.location,
            citizen_id,
            status: ComplaintStatus::Pending,
            triage,
            filed_on: today,
            assigned_to: Some(authority),
            updates: vec![StatusUpdate {
                date: today,
                status: ComplaintStatus::Pending,
                description: REGISTERED_NOTE.to_string(),
            }],
        };

        let stored = self.repository.insert(complaint)?;
        info!(
            complaint_id = %stored.id,
            category = stored.category.key(),
            score = stored.triage.score,
            priority = stored.triage.priority.key(),
            "complaint registered"
        );

        if let Err(err) = self.notify_authority(&stored) {
            warn!(complaint_id = %stored.id, error = %err, "authority notification failed");
        }

        Ok(stored)
    }

    /// Apply a manual status move and tell the resident about it.
    pub fn update_status(
        &self,
        id: &ComplaintId,
        change: StatusChange,
    ) -> Result<Complaint, ComplaintServiceError> {
        self.update_status_on(id, change, Local::now().date_naive())
    }

    pub fn update_status_on(
        &self,
        id: &ComplaintId,
        change: StatusChange,
        today: NaiveDate,
    ) -> Result<Complaint, ComplaintServiceError> {
        let StatusChange {
            status,
            notes,
            assigned_to,
        } = change;
        let notes = notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());

        let mut attempt = 1;
        let complaint = loop {
            let mut complaint = self.get(id)?;
            let previous = complaint.status;
            if !previous.can_transition_to(status) {
                return Err(ComplaintServiceError::InvalidTransition {
                    from: previous,
                    to: status,
                });
            }

            complaint.status = status;
            if let Some(authority) = assigned_to.clone() {
                complaint.assigned_to = Some(authority);
            }
            complaint.updates.push(StatusUpdate {
                date: today,
                status,
                description: notes
                    .clone()
                    .unwrap_or_else(|| format!("Status updated to {}", status.key())),
            });

            match self.repository.update(complaint.clone(), previous) {
                Ok(()) => break complaint,
                Err(RepositoryError::StatusChanged(current)) if attempt < UPDATE_ATTEMPTS => {
                    debug!(
                        complaint_id = %id,
                        current = current.key(),
                        "status changed underneath update, retrying"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(complaint_id = %complaint.id, status = status.key(), "complaint status updated");

        match self.citizens.contact(&complaint.citizen_id) {
            Some(contact) => {
                let message =
                    notifications::status_update(&contact, &complaint, status, notes.as_deref());
                if let Err(err) = self.notifier.publish(message) {
                    warn!(complaint_id = %complaint.id, error = %err, "status notification failed");
                }
            }
            None => debug!(
                complaint_id = %complaint.id,
                citizen_id = %complaint.citizen_id.0,
                "no contact on file, skipping status notification"
            ),
        }

        Ok(complaint)
    }

    pub fn get(&self, id: &ComplaintId) -> Result<Complaint, ComplaintServiceError> {
        let complaint = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(complaint)
    }

    pub fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, ComplaintServiceError> {
        let mut complaints = self.repository.list(filter)?;
        complaints.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(complaints)
    }

    pub fn for_citizen(&self, id: &CitizenId) -> Result<Vec<Complaint>, ComplaintServiceError> {
        self.list(&ComplaintFilter::for_citizen(id.clone()))
    }

    pub fn for_authority(
        &self,
        id: &AuthorityId,
    ) -> Result<Vec<Complaint>, ComplaintServiceError> {
        self.list(&ComplaintFilter::for_authority(id.clone()))
    }

    pub fn all(&self) -> Result<Vec<Complaint>, ComplaintServiceError> {
        self.list(&ComplaintFilter::default())
    }

    fn notify_authority(&self, complaint: &Complaint) -> Result<(), NotificationError> {
        let Some(authority) = complaint
            .assigned_to
            .as_ref()
            .and_then(|id| self.authorities.get(id))
        else {
            return Ok(());
        };

        self.notifier
            .publish(notifications::new_complaint_assigned(authority, complaint))
    }
}

fn validate_submission(submission: &ComplaintSubmission) -> Result<(), IntakeError> {
    let required = [
        ("title", submission.complaint.title.as_str()),
        ("description", submission.complaint.description.as_str()),
        ("location", submission.complaint.location.as_str()),
        ("citizen_id", submission.citizen_id.0.as_str()),
    ];

    match required.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(IntakeError::MissingField(*field)),
        None => Ok(()),
    }
}

/// Submission rejected before triage.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Error raised by the complaint service.
#[derive(Debug, thiserror::Error)]
pub enum ComplaintServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error("cannot move complaint from {} to {}", .from.key(), .to.key())]
    InvalidTransition {
        from: ComplaintStatus,
        to: ComplaintStatus,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
