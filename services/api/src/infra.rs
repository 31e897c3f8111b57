use chrono::NaiveDate;
use complaint_desk::config::TriageConfig;
use complaint_desk::workflows::complaints::{
    CitizenContact, CitizenDirectory, CitizenId, Complaint, ComplaintFilter, ComplaintId,
    ComplaintRepository, ComplaintService, ComplaintStatus, Notification, NotificationError,
    NotificationPublisher, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

pub(crate) type DeskService = ComplaintService<InMemoryComplaintRepository, LoggingOutbox>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) complaints: Arc<DeskService>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryComplaintRepository {
    records: Arc<Mutex<HashMap<ComplaintId, Complaint>>>,
}

impl ComplaintRepository for InMemoryComplaintRepository {
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

/// Mail relay stand-in for the server: each message becomes a log event.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingOutbox;

impl NotificationPublisher for LoggingOutbox {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        info!(
            complaint_id = %notification.complaint_id,
            to = %notification.to,
            subject = notification.subject.as_deref().unwrap_or(""),
            "notification sent"
        );
        Ok(())
    }
}

/// Outbox for the demo; messages are kept for inspection.
#[derive(Default, Clone)]
pub(crate) struct InMemoryOutbox {
    messages: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationPublisher for InMemoryOutbox {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut guard = self.messages.lock().expect("outbox mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryOutbox {
    pub(crate) fn messages(&self) -> Vec<Notification> {
        self.messages.lock().expect("outbox mutex poisoned").clone()
    }
}

pub(crate) struct InMemoryCitizenDirectory {
    contacts: HashMap<CitizenId, CitizenContact>,
}

impl InMemoryCitizenDirectory {
    pub(crate) fn seeded() -> Self {
        let contacts = [
            ("user1", "John Doe", "john@example.com"),
            ("user2", "Jane Smith", "jane@example.com"),
            ("user3", "Robert Johnson", "robert@example.com"),
            ("user4", "Emily Davis", "emily@example.com"),
        ]
        .into_iter()
        .map(|(id, name, email)| {
            let citizen_id = CitizenId(id.to_string());
            let contact = CitizenContact {
                citizen_id: citizen_id.clone(),
                name: name.to_string(),
                email: email.to_string(),
            };
            (citizen_id, contact)
        })
        .collect();

        Self { contacts }
    }
}

impl CitizenDirectory for InMemoryCitizenDirectory {
    fn contact(&self, id: &CitizenId) -> Option<CitizenContact> {
        self.contacts.get(id).cloned()
    }
}

/// Complaint service over in-memory storage and the seeded residents.
pub(crate) fn in_memory_service<N>(
    config: TriageConfig,
    notifier: Arc<N>,
) -> Arc<ComplaintService<InMemoryComplaintRepository, N>>
where
    N: NotificationPublisher + 'static,
{
    let service = ComplaintService::new(
        Arc::new(InMemoryComplaintRepository::default()),
        notifier,
        config,
    )
    .with_citizen_directory(Arc::new(InMemoryCitizenDirectory::seeded()));
    Arc::new(service)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
