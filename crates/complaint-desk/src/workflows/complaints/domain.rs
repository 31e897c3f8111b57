use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::routing::AuthorityId;
use super::triage::PriorityScore;

/// Identifier wrapper for registered complaints (`CM10001`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComplaintId(pub String);

impl fmt::Display for ComplaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the resident who filed a complaint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CitizenId(pub String);

/// Service areas a complaint can be filed under.
///
/// Anything the intake form sends that is not recognised lands in `Other`,
/// which keeps routing total without a silent string fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    Water,
    Electricity,
    Waste,
    Sanitation,
    Road,
    Housing,
    #[default]
    Other,
}

impl ComplaintCategory {
    pub const ALL: [ComplaintCategory; 7] = [
        ComplaintCategory::Water,
        ComplaintCategory::Electricity,
        ComplaintCategory::Waste,
        ComplaintCategory::Sanitation,
        ComplaintCategory::Road,
        ComplaintCategory::Housing,
        ComplaintCategory::Other,
    ];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "water" => Self::Water,
            "electricity" => Self::Electricity,
            "waste" => Self::Waste,
            "sanitation" => Self::Sanitation,
            "road" => Self::Road,
            "housing" => Self::Housing,
            _ => Self::Other,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Electricity => "electricity",
            Self::Waste => "waste",
            Self::Sanitation => "sanitation",
            Self::Road => "road",
            Self::Housing => "housing",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Water => "Water",
            Self::Electricity => "Electricity",
            Self::Waste => "Waste",
            Self::Sanitation => "Sanitation",
            Self::Road => "Road",
            Self::Housing => "Housing",
            Self::Other => "Other",
        }
    }

    /// Water and power outages are treated as essential services by triage.
    pub const fn is_essential_service(self) -> bool {
        matches!(self, Self::Water | Self::Electricity)
    }
}

impl<'de> Deserialize<'de> for ComplaintCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Text fields the triage scorer reads. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: ComplaintCategory,
    #[serde(default)]
    pub location: String,
}

/// Payload accepted from the submission form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintSubmission {
    #[serde(flatten)]
    pub complaint: ComplaintInput,
    pub citizen_id: CitizenId,
}

/// Lifecycle states. Moves are driven by authority or admin action only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    Processing,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::Processing,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }

    pub const fn can_transition_to(self, next: ComplaintStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Rejected)
                | (Self::Processing, Self::Resolved)
                | (Self::Processing, Self::Rejected)
        )
    }
}

/// One entry of a complaint's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub date: NaiveDate,
    pub status: ComplaintStatus,
    pub description: String,
}

/// Requested status move, as sent by authority dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ComplaintStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<AuthorityId>,
}

/// Registered complaint with its triage result and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub location: String,
    pub citizen_id: CitizenId,
    pub status: ComplaintStatus,
    pub triage: PriorityScore,
    pub filed_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<AuthorityId>,
    pub updates: Vec<StatusUpdate>,
}

impl Complaint {
    /// Date of the history entry that closed the complaint as resolved.
    pub fn resolved_on(&self) -> Option<NaiveDate> {
        self.updates
            .iter()
            .rev()
            .find(|update| update.status == ComplaintStatus::Resolved)
            .map(|update| update.date)
    }

    pub fn resolution_days(&self) -> Option<i64> {
        self.resolved_on()
            .map(|resolved| (resolved - self.filed_on).num_days().max(0))
    }
}
