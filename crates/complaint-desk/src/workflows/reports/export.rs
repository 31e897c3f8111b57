use chrono::NaiveDate;
use serde::Serialize;

use super::analytics::average_resolution_days;
use crate::workflows::complaints::{AuthorityDirectory, Complaint, ComplaintStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportKind {
    #[default]
    Complaints,
    Authorities,
    Performance,
}

impl ReportKind {
    /// Unknown values fall back to the complaints listing.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "authorities" => Self::Authorities,
            "performance" => Self::Performance,
            _ => Self::Complaints,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Complaints => "complaints",
            Self::Authorities => "authorities",
            Self::Performance => "performance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Self::Csv,
            _ => Self::Json,
        }
    }

    pub fn content_type(self) -> mime::Mime {
        match self {
            Self::Json => mime::APPLICATION_JSON,
            Self::Csv => mime::TEXT_CSV_UTF_8,
        }
    }
}

const COMPLAINT_COLUMNS: [&str; 9] = [
    "id",
    "title",
    "status",
    "priority",
    "score",
    "category",
    "filed_on",
    "citizen_id",
    "authority",
];

const AUTHORITY_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "department",
    "email",
    "phone",
    "assigned_complaints",
    "resolved_complaints",
    "average_resolution_days",
];

const DEPARTMENT_COLUMNS: [&str; 4] = ["department", "efficiency", "complaints", "resolved"];

pub fn attachment_name(kind: ReportKind) -> String {
    format!("{}_report.csv", kind.key())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintRow {
    pub id: String,
    pub title: String,
    pub status: &'static str,
    pub priority: &'static str,
    pub score: u8,
    pub category: &'static str,
    pub filed_on: NaiveDate,
    pub citizen_id: String,
    pub authority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorityRow {
    pub id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    pub phone: String,
    pub assigned_complaints: usize,
    pub resolved_complaints: usize,
    pub average_resolution_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_complaints: usize,
    pub resolved_complaints: usize,
    pub pending_complaints: usize,
    pub processing_complaints: usize,
    pub rejected_complaints: usize,
    pub average_resolution_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentPerformance {
    pub department: String,
    pub efficiency: u8,
    pub complaints: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub overall_stats: OverallStats,
    pub department_performance: Vec<DepartmentPerformance>,
}

/// Exportable admin report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Complaints(Vec<ComplaintRow>),
    Authorities(Vec<AuthorityRow>),
    Performance(PerformanceReport),
}

impl Report {
    pub fn build(
        kind: ReportKind,
        complaints: &[Complaint],
        authorities: &AuthorityDirectory,
    ) -> Self {
        match kind {
            ReportKind::Complaints => {
                Self::Complaints(complaints.iter().map(complaint_row).collect())
            }
            ReportKind::Authorities => Self::Authorities(
                authorities
                    .iter()
                    .map(|authority| {
                        let assigned: Vec<&Complaint> = complaints
                            .iter()
                            .filter(|complaint| {
                                complaint.assigned_to.as_ref() == Some(&authority.id)
                            })
                            .collect();
                        AuthorityRow {
                            id: authority.id.0.clone(),
                            name: authority.name.clone(),
                            department: authority.department.clone(),
                            email: authority.email.clone(),
                            phone: authority.phone.clone(),
                            assigned_complaints: assigned.len(),
                            resolved_complaints: count_status(
                                assigned.iter().copied(),
                                ComplaintStatus::Resolved,
                            ),
                            average_resolution_days: average_resolution_days(
                                assigned.iter().copied(),
                            ),
                        }
                    })
                    .collect(),
            ),
            ReportKind::Performance => Self::Performance(performance(complaints, authorities)),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, ReportError> {
        Ok(serde_json::to_value(self)?)
    }

    /// CSV rendering. The performance report exports its department rows.
    /// The header row is written even when there are no rows.
    pub fn to_csv(&self) -> Result<String, ReportError> {
        match self {
            Self::Complaints(rows) => write_csv(&COMPLAINT_COLUMNS, rows),
            Self::Authorities(rows) => write_csv(&AUTHORITY_COLUMNS, rows),
            Self::Performance(report) => {
                write_csv(&DEPARTMENT_COLUMNS, &report.department_performance)
            }
        }
    }
}

fn complaint_row(complaint: &Complaint) -> ComplaintRow {
    ComplaintRow {
        id: complaint.id.0.clone(),
        title: complaint.title.clone(),
        status: complaint.status.key(),
        priority: complaint.triage.priority.key(),
        score: complaint.triage.score,
        category: complaint.category.key(),
        filed_on: complaint.filed_on,
        citizen_id: complaint.citizen_id.0.clone(),
        authority: complaint
            .assigned_to
            .as_ref()
            .map(|id| id.0.clone())
            .unwrap_or_default(),
    }
}

fn count_status<'a>(
    complaints: impl Iterator<Item = &'a Complaint>,
    status: ComplaintStatus,
) -> usize {
    complaints
        .filter(|complaint| complaint.status == status)
        .count()
}

fn performance(complaints: &[Complaint], authorities: &AuthorityDirectory) -> PerformanceReport {
    let overall_stats = OverallStats {
        total_complaints: complaints.len(),
        resolved_complaints: count_status(complaints.iter(), ComplaintStatus::Resolved),
        pending_complaints: count_status(complaints.iter(), ComplaintStatus::Pending),
        processing_complaints: count_status(complaints.iter(), ComplaintStatus::Processing),
        rejected_complaints: count_status(complaints.iter(), ComplaintStatus::Rejected),
        average_resolution_days: average_resolution_days(complaints),
    };

    let department_performance = authorities
        .iter()
        .map(|authority| {
            let assigned = complaints
                .iter()
                .filter(|complaint| complaint.assigned_to.as_ref() == Some(&authority.id));
            let total = assigned.clone().count();
            let resolved = count_status(assigned, ComplaintStatus::Resolved);
            let efficiency = if total == 0 {
                0
            } else {
                ((resolved as f64 / total as f64) * 100.0).round() as u8
            };
            DepartmentPerformance {
                department: authority.department.clone(),
                efficiency,
                complaints: total,
                resolved,
            }
        })
        .collect();

    PerformanceReport {
        overall_stats,
        department_performance,
    }
}

fn write_csv<T: Serialize>(columns: &[&str], rows: &[T]) -> Result<String, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unable to write csv report: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv report is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("unable to encode json report: {0}")]
    Json(#[from] serde_json::Error),
}
