use crate::infra::{in_memory_service, InMemoryComplaintRepository, InMemoryOutbox, LoggingOutbox};
use crate::routes::category_filter;
use chrono::{Duration, Local, NaiveDate};
use clap::Args;
use complaint_desk::config::TriageConfig;
use complaint_desk::error::AppError;
use complaint_desk::workflows::complaints::{
    CitizenId, Complaint, ComplaintCategory, ComplaintInput, ComplaintService, ComplaintStatus,
    ComplaintSubmission, NotificationPublisher, StatusChange,
};
use complaint_desk::workflows::reports::{
    AnalyticsPeriod, ComplaintAnalytics, Report, ReportError, ReportFormat, ReportKind,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the demo date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct TriageArgs {
    /// Complaint title
    #[arg(long, default_value = "")]
    pub(crate) title: String,
    /// Complaint description
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    /// Complaint category (water, electricity, waste, sanitation, road, housing, other)
    #[arg(long, default_value = "other")]
    pub(crate) category: String,
    /// Where the problem is
    #[arg(long, default_value = "")]
    pub(crate) location: String,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// complaints, authorities, performance, or analytics
    #[arg(long = "type", default_value = "complaints")]
    pub(crate) kind: String,
    /// json or csv (analytics are always json)
    #[arg(long, default_value = "json")]
    pub(crate) format: String,
    /// Analytics window: week, month, or year
    #[arg(long, default_value = "month")]
    pub(crate) period: String,
    /// Restrict analytics to one category
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Reporting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

struct SampleComplaint {
    title: &'static str,
    description: &'static str,
    category: ComplaintCategory,
    location: &'static str,
    citizen: &'static str,
    filed_days_ago: i64,
    /// Status moves as (status, days after filing, notes).
    progress: &'static [(ComplaintStatus, i64, Option<&'static str>)],
}

const SAMPLE_COMPLAINTS: [SampleComplaint; 6] = [
    SampleComplaint {
        title: "Water Leakage",
        description: "There is a water leakage in the main pipeline near Block C.",
        category: ComplaintCategory::Water,
        location: "Block C, Main Road",
        citizen: "user1",
        filed_days_ago: 0,
        progress: &[],
    },
    SampleComplaint {
        title: "Street Light Not Working",
        description: "The street light at the entrance of Block A is not working for the past week.",
        category: ComplaintCategory::Electricity,
        location: "Block A, Entrance",
        citizen: "user2",
        filed_days_ago: 5,
        progress: &[(ComplaintStatus::Processing, 1, Some("Electrician scheduled"))],
    },
    SampleComplaint {
        title: "Garbage Collection Issue",
        description: "Garbage has not been collected from Block D for the last 3 days.",
        category: ComplaintCategory::Waste,
        location: "Block D",
        citizen: "user3",
        filed_days_ago: 10,
        progress: &[
            (ComplaintStatus::Processing, 1, None),
            (ComplaintStatus::Resolved, 3, Some("Collection route restored")),
        ],
    },
    SampleComplaint {
        title: "Broken Sewage Pipe",
        description: "Sewage pipe is broken and causing foul smell in the area.",
        category: ComplaintCategory::Sanitation,
        location: "Block B, Near Park",
        citizen: "user1",
        filed_days_ago: 3,
        progress: &[(ComplaintStatus::Processing, 0, None)],
    },
    SampleComplaint {
        title: "Pothole on Main Road",
        description: "Large pothole on the main road causing accidents.",
        category: ComplaintCategory::Road,
        location: "Main Road, Junction",
        citizen: "user4",
        filed_days_ago: 1,
        progress: &[],
    },
    SampleComplaint {
        title: "Broken Community Tap",
        description: "The community water tap is broken and water is being wasted.",
        category: ComplaintCategory::Water,
        location: "Community Center",
        citizen: "user2",
        filed_days_ago: 7,
        progress: &[(
            ComplaintStatus::Rejected,
            1,
            Some("Duplicate of an earlier report"),
        )],
    },
];

/// Files the sample complaints and replays their status history.
pub(crate) fn seed_sample_complaints<N>(
    service: &ComplaintService<InMemoryComplaintRepository, N>,
    today: NaiveDate,
) -> Result<Vec<Complaint>, AppError>
where
    N: NotificationPublisher + 'static,
{
    let mut seeded = Vec::with_capacity(SAMPLE_COMPLAINTS.len());

    for sample in &SAMPLE_COMPLAINTS {
        let filed_on = today - Duration::days(sample.filed_days_ago);
        let mut complaint = service.submit_on(
            ComplaintSubmission {
                complaint: ComplaintInput {
                    title: sample.title.to_string(),
                    description: sample.description.to_string(),
                    category: sample.category,
                    location: sample.location.to_string(),
                },
                citizen_id: CitizenId(sample.citizen.to_string()),
            },
            filed_on,
        )?;

        for (status, after_days, notes) in sample.progress {
            complaint = service.update_status_on(
                &complaint.id,
                StatusChange {
                    status: *status,
                    notes: notes.map(str::to_string),
                    assigned_to: None,
                },
                filed_on + Duration::days(*after_days),
            )?;
        }

        seeded.push(complaint);
    }

    Ok(seeded)
}

pub(crate) fn run_triage(args: TriageArgs) -> Result<(), AppError> {
    let TriageArgs {
        title,
        description,
        category,
        location,
    } = args;

    let service = in_memory_service(TriageConfig::default(), Arc::new(LoggingOutbox));
    let input = ComplaintInput {
        title,
        description,
        category: ComplaintCategory::parse(&category),
        location,
    };
    let preview = service.preview(&input);
    let authority = service
        .authorities()
        .get(&preview.authority)
        .map(|authority| authority.name.as_str())
        .unwrap_or("Unassigned");

    println!("Complaint triage");
    println!("Category: {}", input.category.label());
    println!(
        "Score: {} | Priority: {} | Tier: {:?}",
        preview.triage.score,
        preview.triage.priority.label(),
        preview.triage.tier
    );
    println!("Reasoning: {}", preview.triage.reasoning);
    println!("Routed to: {} ({})", authority, preview.authority);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let outbox = Arc::new(InMemoryOutbox::default());
    let service = in_memory_service(TriageConfig::default(), outbox.clone());

    println!("Complaint desk demo ({today})");
    let seeded = seed_sample_complaints(&service, today)?;

    println!("\nRegistered complaints");
    for complaint in &seeded {
        let authority = complaint
            .assigned_to
            .as_ref()
            .and_then(|id| service.authorities().get(id))
            .map(|authority| authority.name.as_str())
            .unwrap_or("Unassigned");
        println!(
            "- {} [{}] {}: score {} ({}, tier {:?}) -> {} | {}",
            complaint.id,
            complaint.category.label(),
            complaint.title,
            complaint.triage.score,
            complaint.triage.priority.label(),
            complaint.triage.tier,
            authority,
            complaint.status.label()
        );
    }

    if let Some(pending) = seeded
        .iter()
        .find(|complaint| complaint.status == ComplaintStatus::Pending)
    {
        println!("\nLifecycle walk for {}", pending.id);
        let mut current = pending.clone();
        for (status, notes) in [
            (ComplaintStatus::Processing, "Crew dispatched"),
            (ComplaintStatus::Resolved, "Repair completed"),
        ] {
            current = service.update_status_on(
                &current.id,
                StatusChange {
                    status,
                    notes: Some(notes.to_string()),
                    assigned_to: None,
                },
                today,
            )?;
        }
        for update in &current.updates {
            println!(
                "- {} {}: {}",
                update.date,
                update.status.label(),
                update.description
            );
        }

        let reopen = service.update_status_on(
            &current.id,
            StatusChange {
                status: ComplaintStatus::Processing,
                notes: None,
                assigned_to: None,
            },
            today,
        );
        if let Err(err) = reopen {
            println!("  Reopen attempt refused: {err}");
        }
    }

    let messages = outbox.messages();
    println!("\nOutbox ({} messages)", messages.len());
    for message in &messages {
        println!(
            "- {} -> {}",
            message.to,
            message.subject.as_deref().unwrap_or("(no subject)")
        );
    }

    let complaints = service.all()?;
    if let Report::Performance(performance) = Report::build(
        ReportKind::Performance,
        &complaints,
        service.authorities(),
    ) {
        let stats = &performance.overall_stats;
        println!(
            "\nTotals: {} filed | {} resolved | {} processing | {} pending | {} rejected",
            stats.total_complaints,
            stats.resolved_complaints,
            stats.processing_complaints,
            stats.pending_complaints,
            stats.rejected_complaints
        );
        for department in &performance.department_performance {
            println!(
                "- {}: {}/{} resolved ({}%)",
                department.department,
                department.resolved,
                department.complaints,
                department.efficiency
            );
        }
    }

    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        kind,
        format,
        period,
        category,
        today,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let service = in_memory_service(TriageConfig::default(), Arc::new(LoggingOutbox));
    seed_sample_complaints(&service, today)?;
    let complaints = service.all()?;

    if kind.trim().eq_ignore_ascii_case("analytics") {
        let analytics = ComplaintAnalytics::compute(
            &complaints,
            AnalyticsPeriod::parse(&period),
            today,
            category_filter(category.as_deref()),
        );
        let rendered = serde_json::to_string_pretty(&analytics).map_err(ReportError::from)?;
        println!("{rendered}");
        return Ok(());
    }

    let report = Report::build(
        ReportKind::parse(&kind),
        &complaints,
        service.authorities(),
    );
    match ReportFormat::parse(&format) {
        ReportFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(&report.to_json()?).map_err(ReportError::from)?;
            println!("{rendered}");
        }
        ReportFormat::Csv => print!("{}", report.to_csv()?),
    }

    Ok(())
}
