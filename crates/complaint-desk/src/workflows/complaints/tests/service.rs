use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Duration;

use super::common::*;
use crate::config::TriageConfig;
use crate::workflows::complaints::domain::{
    CitizenId, Complaint, ComplaintCategory, ComplaintId, ComplaintStatus, StatusChange,
};
use crate::workflows::complaints::repository::{
    ComplaintFilter, ComplaintRepository, NotificationChannel, RepositoryError,
};
use crate::workflows::complaints::routing::{AuthorityId, RoutingTable};
use crate::workflows::complaints::service::{
    ComplaintService, ComplaintServiceError, IntakeError,
};
use crate::workflows::complaints::triage::Priority;

fn change(status: ComplaintStatus, notes: Option<&str>) -> StatusChange {
    StatusChange {
        status,
        notes: notes.map(str::to_string),
        assigned_to: None,
    }
}

#[test]
fn submit_scores_routes_and_records_history() {
    let (service, repository, _) = build_service();

    let complaint = service
        .submit_on(submission(), filing_date())
        .expect("submission succeeds");

    assert!(complaint.id.0.starts_with("CM"));
    assert_eq!(complaint.status, ComplaintStatus::Pending);
    assert_eq!(complaint.triage.score, 105);
    assert_eq!(complaint.triage.priority, Priority::High);
    assert_eq!(complaint.assigned_to, Some(AuthorityId::new("auth1")));
    assert_eq!(complaint.filed_on, filing_date());
    assert_eq!(complaint.updates.len(), 1);
    assert_eq!(complaint.updates[0].status, ComplaintStatus::Pending);
    assert_eq!(complaint.updates[0].description, "Complaint registered");

    let stored = repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .get(&complaint.id)
        .cloned()
        .expect("complaint stored");
    assert_eq!(stored, complaint);
}

#[test]
fn submit_notifies_the_assigned_department() {
    let (service, _, outbox) = build_service();

    let complaint = service
        .submit_on(street_light_submission(), filing_date())
        .expect("submission succeeds");

    let sent = outbox.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.channel, NotificationChannel::Email);
    assert_eq!(message.to, "electricity@example.com");
    assert_eq!(
        message.subject.as_deref(),
        Some(format!("New Complaint Assigned - {}", complaint.id).as_str())
    );
    assert!(message.body.contains("Dear Electricity Department,"));
    assert!(message.body.contains("Priority: MEDIUM"));
    assert_eq!(message.complaint_id, complaint.id);
}

#[test]
fn complaint_ids_are_unique() {
    let (service, _, _) = build_service();

    let first = service.submit_on(submission(), filing_date()).expect("first");
    let second = service.submit_on(submission(), filing_date()).expect("second");

    assert_ne!(first.id, second.id);
}

#[test]
fn blank_required_fields_are_rejected_before_triage() {
    let (service, repository, outbox) = build_service();

    let mut untitled = submission();
    untitled.complaint.title = "   ".to_string();
    let err = service
        .submit_on(untitled, filing_date())
        .expect_err("blank title rejected");
    assert!(matches!(
        err,
        ComplaintServiceError::Intake(IntakeError::MissingField("title"))
    ));

    let mut anonymous = submission();
    anonymous.citizen_id = CitizenId(String::new());
    let err = service
        .submit_on(anonymous, filing_date())
        .expect_err("missing citizen rejected");
    assert!(matches!(
        err,
        ComplaintServiceError::Intake(IntakeError::MissingField("citizen_id"))
    ));

    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
    assert!(outbox.sent().is_empty());
}

#[test]
fn notification_failure_does_not_fail_submission() {
    let repository = Arc::new(MemoryRepository::default());
    let service = ComplaintService::new(
        repository.clone(),
        Arc::new(OfflineOutbox),
        TriageConfig::default(),
    );

    let complaint = service
        .submit_on(submission(), filing_date())
        .expect("submission succeeds without a mail relay");

    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .contains_key(&complaint.id));
}

#[test]
fn repository_conflict_surfaces_to_caller() {
    let service = ComplaintService::new(
        Arc::new(ConflictRepository),
        Arc::new(MemoryOutbox::default()),
        TriageConfig::default(),
    );

    let err = service
        .submit_on(submission(), filing_date())
        .expect_err("conflict surfaces");
    assert!(matches!(
        err,
        ComplaintServiceError::Repository(RepositoryError::Conflict)
    ));
}

#[test]
fn lifecycle_moves_through_processing_to_resolved() {
    let (service, _, _) = build_service();
    let complaint = service
        .submit_on(submission(), filing_date())
        .expect("submission succeeds");

    let processing = service
        .update_status_on(
            &complaint.id,
            change(ComplaintStatus::Processing, None),
            filing_date() + Duration::days(1),
        )
        .expect("pending to processing");
    assert_eq!(processing.status, ComplaintStatus::Processing);
    assert_eq!(
        processing.updates[1].description,
        "Status updated to processing"
    );

    let resolved = service
        .update_status_on(
            &complaint.id,
            change(ComplaintStatus::Resolved, Some("  Pipe replaced  ")),
            filing_date() + Duration::days(3),
        )
        .expect("processing to resolved");
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    assert_eq!(resolved.updates.len(), 3);
    assert_eq!(resolved.updates[2].description, "Pipe replaced");
    assert_eq!(resolved.resolution_days(), Some(3));

    let stored = service.get(&complaint.id).expect("stored");
    assert_eq!(stored, resolved);
}

#[test]
fn terminal_and_skipped_transitions_are_rejected() {
    let (service, _, _) = build_service();
    let complaint = service
        .submit_on(submission(), filing_date())
        .expect("submission succeeds");

    let err = service
        .update_status_on(
            &complaint.id,
            change(ComplaintStatus::Resolved, None),
            filing_date(),
        )
        .expect_err("pending cannot jump to resolved");
    assert!(matches!(
        err,
        ComplaintServiceError::InvalidTransition {
            from: ComplaintStatus::Pending,
            to: ComplaintStatus::Resolved,
        }
    ));

    let err = service
        .update_status_on(
            &complaint.id,
            change(ComplaintStatus::Pending, None),
            filing_date(),
        )
        .expect_err("same status is not a move");
    assert!(matches!(err, ComplaintServiceError::InvalidTransition { .. }));

    service
        .update_status_on(
            &complaint.id,
            change(ComplaintStatus::Rejected, Some("Duplicate")),
            filing_date(),
        )
        .expect("pending to rejected");

    let err = service
        .update_status_on(
            &complaint.id,
            change(ComplaintStatus::Processing, None),
            filing_date(),
        )
        .expect_err("rejected is terminal");
    assert_eq!(
        err.to_string(),
        "cannot move complaint from rejected to processing"
    );

    let stored = service.get(&complaint.id).expect("stored");
    assert_eq!(stored.status, ComplaintStatus::Rejected);
    assert_eq!(stored.updates.len(), 2);
}

#[test]
fn status_update_reassigns_when_requested() {
    let (service, _, _) = build_service();
    let complaint = service
        .submit_on(submission(), filing_date())
        .expect("submission succeeds");

    let updated = service
        .update_status_on(
            &complaint.id,
            StatusChange {
                status: ComplaintStatus::Processing,
                notes: None,
                assigned_to: Some(AuthorityId::new("auth4")),
            },
            filing_date(),
        )
        .expect("reassigned");

    assert_eq!(updated.assigned_to, Some(AuthorityId::new("auth4")));
    let for_roads = service
        .for_authority(&AuthorityId::new("auth4"))
        .expect("listing");
    assert_eq!(for_roads.len(), 1);
}

#[test]
fn status_update_emails_known_residents_only() {
    let (service, _, outbox) = build_service();
    let known = service
        .submit_on(submission(), filing_date())
        .expect("user1 submission");
    let unknown = service
        .submit_on(street_light_submission(), filing_date())
        .expect("user2 submission");

    service
        .update_status_on(
            &known.id,
            change(ComplaintStatus::Processing, Some("Crew dispatched")),
            filing_date(),
        )
        .expect("update known");
    service
        .update_status_on(
            &unknown.id,
            change(ComplaintStatus::Processing, None),
            filing_date(),
        )
        .expect("update unknown");

    let citizen_mail: Vec<_> = outbox
        .sent()
        .into_iter()
        .filter(|message| message.to == "john@example.com")
        .collect();
    assert_eq!(citizen_mail.len(), 1);
    let message = &citizen_mail[0];
    assert_eq!(message.complaint_id, known.id);
    assert!(message
        .body
        .contains("has been updated to status: PROCESSING."));
    assert!(message.body.contains("Additional notes: Crew dispatched"));
    assert_eq!(outbox.sent().len(), 3);
}

#[test]
fn unknown_complaint_is_not_found() {
    let (service, _, _) = build_service();

    let err = service
        .update_status_on(
            &ComplaintId("CM99999".to_string()),
            change(ComplaintStatus::Processing, None),
            filing_date(),
        )
        .expect_err("missing complaint");
    assert!(matches!(
        err,
        ComplaintServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[test]
fn listings_filter_by_citizen_and_authority() {
    let (service, _, _) = build_service();
    service
        .submit_on(submission(), filing_date())
        .expect("water complaint");
    service
        .submit_on(street_light_submission(), filing_date())
        .expect("light complaint");

    let mine = service
        .for_citizen(&CitizenId("user1".to_string()))
        .expect("citizen listing");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].category, ComplaintCategory::Water);

    let power = service
        .for_authority(&AuthorityId::new("auth3"))
        .expect("authority listing");
    assert_eq!(power.len(), 1);
    assert_eq!(power[0].citizen_id, CitizenId("user2".to_string()));

    let all = service.all().expect("all complaints");
    assert_eq!(all.len(), 2);
    assert!(all[0].id < all[1].id);
}

#[test]
fn custom_routing_is_used_for_previews() {
    let (service, _, _) = build_service();
    let service =
        service.with_routing(RoutingTable::new(Vec::new(), AuthorityId::new("desk")));

    let preview = service.preview(&input("Broken pipe", "", ComplaintCategory::Water));
    assert_eq!(preview.authority, AuthorityId::new("desk"));
    assert_eq!(preview.triage.score, 95);
}

#[test]
fn unavailable_storage_is_reported() {
    let service = ComplaintService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryOutbox::default()),
        TriageConfig::default(),
    );

    let err = service.all().expect_err("storage offline");
    assert!(matches!(
        err,
        ComplaintServiceError::Repository(RepositoryError::Unavailable(_))
    ));
}

/// Holds the first two reads at a barrier so both updates see the same status.
struct RacingRepository {
    inner: MemoryRepository,
    gate: Barrier,
    reads: AtomicUsize,
}

impl RacingRepository {
    fn new() -> Self {
        Self {
            inner: MemoryRepository::default(),
            gate: Barrier::new(2),
            reads: AtomicUsize::new(0),
        }
    }
}

impl ComplaintRepository for RacingRepository {
    fn insert(&self, complaint: Complaint) -> Result<Complaint, RepositoryError> {
        self.inner.insert(complaint)
    }

    fn update(
        &self,
        complaint: Complaint,
        expected: ComplaintStatus,
    ) -> Result<(), RepositoryError> {
        self.inner.update(complaint, expected)
    }

    fn fetch(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        let complaint = self.inner.fetch(id)?;
        if self.reads.fetch_add(1, Ordering::SeqCst) < 2 {
            self.gate.wait();
        }
        Ok(complaint)
    }

    fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>, RepositoryError> {
        self.inner.list(filter)
    }
}

#[test]
fn concurrent_status_updates_cannot_reopen_a_rejected_complaint() {
    let outbox = Arc::new(MemoryOutbox::default());
    let service = ComplaintService::new(
        Arc::new(RacingRepository::new()),
        outbox.clone(),
        TriageConfig::default(),
    )
    .with_citizen_directory(Arc::new(MemoryCitizens::seeded()));
    let complaint = service
        .submit_on(submission(), filing_date())
        .expect("submission succeeds");

    let (rejected, processing) = thread::scope(|scope| {
        let reject = scope.spawn(|| {
            service.update_status_on(
                &complaint.id,
                change(ComplaintStatus::Rejected, Some("Duplicate report")),
                filing_date(),
            )
        });
        let process = scope.spawn(|| {
            service.update_status_on(
                &complaint.id,
                change(ComplaintStatus::Processing, None),
                filing_date(),
            )
        });
        (
            reject.join().expect("reject thread"),
            process.join().expect("process thread"),
        )
    });

    // Rejection is valid from both pending and processing, so it always lands.
    assert_eq!(
        rejected.expect("rejection applied").status,
        ComplaintStatus::Rejected
    );

    let stored = service.get(&complaint.id).expect("complaint stored");
    assert_eq!(stored.status, ComplaintStatus::Rejected);
    let history: Vec<ComplaintStatus> =
        stored.updates.iter().map(|update| update.status).collect();
    match processing {
        Ok(_) => assert_eq!(
            history,
            vec![
                ComplaintStatus::Pending,
                ComplaintStatus::Processing,
                ComplaintStatus::Rejected,
            ]
        ),
        Err(err) => {
            assert!(matches!(
                err,
                ComplaintServiceError::InvalidTransition {
                    from: ComplaintStatus::Rejected,
                    to: ComplaintStatus::Processing,
                }
            ));
            assert_eq!(
                history,
                vec![ComplaintStatus::Pending, ComplaintStatus::Rejected]
            );
        }
    }

    // One department notice plus one resident e-mail per applied move.
    assert_eq!(outbox.sent().len(), history.len());
}

#[test]
fn stale_writes_are_refused_by_storage() {
    let (service, repository, _) = build_service();
    let complaint = service
        .submit_on(submission(), filing_date())
        .expect("submission succeeds");
    service
        .update_status_on(
            &complaint.id,
            change(ComplaintStatus::Rejected, None),
            filing_date(),
        )
        .expect("rejection applied");

    let mut reopened = complaint.clone();
    reopened.status = ComplaintStatus::Processing;
    let err = repository
        .update(reopened, ComplaintStatus::Pending)
        .expect_err("stale write refused");

    assert!(matches!(
        err,
        RepositoryError::StatusChanged(ComplaintStatus::Rejected)
    ));
    assert_eq!(
        service.get(&complaint.id).expect("stored").status,
        ComplaintStatus::Rejected
    );
}
