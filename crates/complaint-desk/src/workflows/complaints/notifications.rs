use std::fmt::Write as _;

use super::domain::{Complaint, ComplaintStatus};
use super::repository::{CitizenContact, Notification, NotificationChannel};
use super::routing::Authority;

const SIGNATURE: &str = "Thank you,\nSlum Management System";

/// E-mail telling a department a complaint has been routed to it.
pub fn new_complaint_assigned(authority: &Authority, complaint: &Complaint) -> Notification {
    let mut body = String::new();
    let _ = writeln!(body, "Dear {},", authority.name);
    let _ = writeln!(body);
    let _ = writeln!(body, "A new complaint has been assigned to your department:");
    let _ = writeln!(body);
    let _ = writeln!(body, "ID: {}", complaint.id);
    let _ = writeln!(body, "Title: {}", complaint.title);
    let _ = writeln!(
        body,
        "Priority: {}",
        complaint.triage.priority.key().to_uppercase()
    );
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "Please login to the SMS portal to view the details and take appropriate action."
    );
    let _ = writeln!(body);
    body.push_str(SIGNATURE);

    Notification {
        channel: NotificationChannel::Email,
        to: authority.email.clone(),
        subject: Some(format!("New Complaint Assigned - {}", complaint.id)),
        body,
        complaint_id: complaint.id.clone(),
    }
}

/// E-mail telling a resident their complaint moved to a new status.
pub fn status_update(
    contact: &CitizenContact,
    complaint: &Complaint,
    status: ComplaintStatus,
    notes: Option<&str>,
) -> Notification {
    let mut body = String::new();
    let _ = writeln!(body, "Dear {},", contact.name);
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "Your complaint (ID: {}) has been updated to status: {}.",
        complaint.id,
        status.key().to_uppercase()
    );
    if let Some(notes) = notes.filter(|notes| !notes.trim().is_empty()) {
        let _ = writeln!(body);
        let _ = writeln!(body, "Additional notes: {}", notes.trim());
    }
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "You can track the status of your complaint in the SMS portal."
    );
    let _ = writeln!(body);
    body.push_str(SIGNATURE);

    Notification {
        channel: NotificationChannel::Email,
        to: contact.email.clone(),
        subject: Some(format!("Complaint Status Update - {}", complaint.id)),
        body,
        complaint_id: complaint.id.clone(),
    }
}
