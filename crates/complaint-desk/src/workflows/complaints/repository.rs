use serde::{Deserialize, Serialize};

use super::domain::{CitizenId, Complaint, ComplaintCategory, ComplaintId, ComplaintStatus};
use super::routing::AuthorityId;

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ComplaintRepository: Send + Sync {
    fn insert(&self, complaint: Complaint) -> Result<Complaint, RepositoryError>;
    /// Replace a stored complaint only while its status is still `expected`.
    fn update(
        &self,
        complaint: Complaint,
        expected: ComplaintStatus,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError>;
    fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("complaint already exists")]
    Conflict,
    #[error("complaint not found")]
    NotFound,
    #[error("complaint moved to {} concurrently", .0.key())]
    StatusChanged(ComplaintStatus),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Conjunctive filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintFilter {
    #[serde(default)]
    pub citizen_id: Option<CitizenId>,
    #[serde(default)]
    pub authority_id: Option<AuthorityId>,
    #[serde(default)]
    pub status: Option<ComplaintStatus>,
    #[serde(default)]
    pub category: Option<ComplaintCategory>,
}

impl ComplaintFilter {
    pub fn for_citizen(citizen_id: CitizenId) -> Self {
        Self {
            citizen_id: Some(citizen_id),
            ..Self::default()
        }
    }

    pub fn for_authority(authority_id: AuthorityId) -> Self {
        Self {
            authority_id: Some(authority_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        self.citizen_id
            .as_ref()
            .map_or(true, |id| &complaint.citizen_id == id)
            && self
                .authority_id
                .as_ref()
                .map_or(true, |id| complaint.assigned_to.as_ref() == Some(id))
            && self.status.map_or(true, |status| complaint.status == status)
            && self
                .category
                .map_or(true, |category| complaint.category == category)
    }
}

/// Delivery channel for outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Email,
}

/// Rendered message handed to the outbound transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub channel: NotificationChannel,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    pub complaint_id: ComplaintId,
}

/// Outbound hook for mail adapters.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Contact details for a resident, used for status e-mails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenContact {
    pub citizen_id: CitizenId,
    pub name: String,
    pub email: String,
}

pub trait CitizenDirectory: Send + Sync {
    fn contact(&self, id: &CitizenId) -> Option<CitizenContact>;
}

/// Directory that knows nobody; status updates are then only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCitizenDirectory;

impl CitizenDirectory for NoCitizenDirectory {
    fn contact(&self, _id: &CitizenId) -> Option<CitizenContact> {
        None
    }
}
