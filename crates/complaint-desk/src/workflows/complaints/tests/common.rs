use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::TriageConfig;
use crate::workflows::complaints::domain::{
    CitizenId, Complaint, ComplaintCategory, ComplaintId, ComplaintInput, ComplaintStatus,
    ComplaintSubmission,
};
use crate::workflows::complaints::repository::{
    CitizenContact, CitizenDirectory, ComplaintFilter, ComplaintRepository, Notification,
    NotificationError, NotificationPublisher, RepositoryError,
};
use crate::workflows::complaints::{complaint_router, ComplaintService};

pub(super) fn input(
    title: &str,
    description: &str,
    category: ComplaintCategory,
) -> ComplaintInput {
    ComplaintInput {
        title: title.to_string(),
        description: description.to_string(),
        category,
        location: "Block C, Main Road".to_string(),
    }
}

pub(super) fn submission() -> ComplaintSubmission {
    ComplaintSubmission {
        complaint: input(
            "Urgent water leak",
            "severe leak near block C",
            ComplaintCategory::Water,
        ),
        citizen_id: CitizenId("user1".to_string()),
    }
}

pub(super) fn street_light_submission() -> ComplaintSubmission {
    ComplaintSubmission {
        complaint: input(
            "Street light",
            "light not working for a week",
            ComplaintCategory::Electricity,
        ),
        citizen_id: CitizenId("user2".to_string()),
    }
}

pub(super) fn filing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).expect("valid date")
}

pub(super) fn build_service() -> (
    ComplaintService<MemoryRepository, MemoryOutbox>,
    Arc<MemoryRepository>,
    Arc<MemoryOutbox>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let outbox = Arc::new(MemoryOutbox::default());
    let service =
        ComplaintService::new(repository.clone(), outbox.clone(), TriageConfig::default())
            .with_citizen_directory(Arc::new(MemoryCitizens::seeded()));
    (service, repository, outbox)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ComplaintId, Complaint>>>,
}

impl ComplaintRepository for MemoryRepository {
    fn insert(&self, complaint: Complaint) -> Result<Complaint, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&complaint.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(complaint.id.clone(), complaint.clone());
        Ok(complaint)
    }

    fn update(
        &self,
        complaint: Complaint,
        expected: ComplaintStatus,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let current = guard
            .get(&complaint.id)
            .map(|stored| stored.status)
            .ok_or(RepositoryError::NotFound)?;
        if current != expected {
            return Err(RepositoryError::StatusChanged(current));
        }
        guard.insert(complaint.id.clone(), complaint);
        Ok(())
    }

    fn fetch(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|complaint| filter.matches(complaint))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryOutbox {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryOutbox {
    pub(super) fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("outbox mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryOutbox {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("outbox mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineOutbox;

impl NotificationPublisher for OfflineOutbox {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

pub(super) struct MemoryCitizens {
    contacts: HashMap<CitizenId, CitizenContact>,
}

impl MemoryCitizens {
    pub(super) fn seeded() -> Self {
        let contact = CitizenContact {
            citizen_id: CitizenId("user1".to_string()),
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
        };
        Self {
            contacts: HashMap::from([(contact.citizen_id.clone(), contact)]),
        }
    }
}

impl CitizenDirectory for MemoryCitizens {
    fn contact(&self, id: &CitizenId) -> Option<CitizenContact> {
        self.contacts.get(id).cloned()
    }
}

pub(super) struct ConflictRepository;

impl ComplaintRepository for ConflictRepository {
    fn insert(&self, _complaint: Complaint) -> Result<Complaint, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(
        &self,
        _complaint: Complaint,
        _expected: ComplaintStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        Ok(None)
    }

    fn list(&self, _filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ComplaintRepository for UnavailableRepository {
    fn insert(&self, _complaint: Complaint) -> Result<Complaint, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _complaint: Complaint,
        _expected: ComplaintStatus,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: ComplaintService<MemoryRepository, MemoryOutbox>,
) -> axum::Router {
    complaint_router(Arc::new(service))
}
