use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::workflows::complaints::{Complaint, ComplaintCategory, ComplaintStatus, Priority};

/// Lookback window for dashboard analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsPeriod {
    Week,
    #[default]
    Month,
    Year,
}

impl AnalyticsPeriod {
    /// Unknown values fall back to a month.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => Self::Week,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }

    /// Inclusive date ranges of the time-series buckets, oldest first.
    pub fn buckets(self, today: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
        match self {
            Self::Week => daily_buckets(today, 7),
            Self::Month => daily_buckets(today, 30),
            Self::Year => monthly_buckets(today, 12),
        }
    }
}

fn daily_buckets(today: NaiveDate, days: i64) -> Vec<(NaiveDate, NaiveDate)> {
    (0..days)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back);
            (day, day)
        })
        .collect()
}

fn monthly_buckets(today: NaiveDate, months: i32) -> Vec<(NaiveDate, NaiveDate)> {
    (0..months)
        .rev()
        .filter_map(|back| {
            let start = month_start(today, back)?;
            let end = match back {
                0 => today,
                _ => month_start(today, back - 1)?.pred_opt()?,
            };
            Some((start, end))
        })
        .collect()
}

fn month_start(today: NaiveDate, months_back: i32) -> Option<NaiveDate> {
    let index = today.year() * 12 + today.month0() as i32 - months_back;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: &'static str,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub complaints: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionTime {
    pub name: &'static str,
    pub days: f64,
}

/// Dashboard figures computed from stored complaints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintAnalytics {
    pub period: AnalyticsPeriod,
    pub status_data: Vec<NamedCount>,
    pub priority_data: Vec<NamedCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_data: Option<Vec<NamedCount>>,
    pub time_series_data: Vec<TimeSeriesPoint>,
    pub resolution_time_data: Vec<ResolutionTime>,
}

impl ComplaintAnalytics {
    /// Breakdowns cover complaints filed inside the period. A category filter
    /// restricts every figure and drops the category breakdown.
    pub fn compute(
        complaints: &[Complaint],
        period: AnalyticsPeriod,
        today: NaiveDate,
        category: Option<ComplaintCategory>,
    ) -> Self {
        let buckets = period.buckets(today);
        let window_start = buckets.first().map(|(start, _)| *start).unwrap_or(today);

        let scoped: Vec<&Complaint> = complaints
            .iter()
            .filter(|complaint| category.map_or(true, |category| complaint.category == category))
            .collect();
        let in_window: Vec<&Complaint> = scoped
            .iter()
            .copied()
            .filter(|complaint| complaint.filed_on >= window_start && complaint.filed_on <= today)
            .collect();

        let status_data = ComplaintStatus::ALL
            .iter()
            .map(|status| NamedCount {
                name: status.label(),
                value: in_window
                    .iter()
                    .filter(|complaint| complaint.status == *status)
                    .count(),
            })
            .collect();

        let priority_data = Priority::ALL
            .iter()
            .map(|priority| NamedCount {
                name: priority.label(),
                value: in_window
                    .iter()
                    .filter(|complaint| complaint.triage.priority == *priority)
                    .count(),
            })
            .collect();

        let category_data = match category {
            Some(_) => None,
            None => Some(
                ComplaintCategory::ALL
                    .iter()
                    .map(|category| NamedCount {
                        name: category.label(),
                        value: in_window
                            .iter()
                            .filter(|complaint| complaint.category == *category)
                            .count(),
                    })
                    .collect(),
            ),
        };

        let time_series_data = buckets
            .iter()
            .map(|(start, end)| TimeSeriesPoint {
                date: *start,
                complaints: scoped
                    .iter()
                    .filter(|complaint| complaint.filed_on >= *start && complaint.filed_on <= *end)
                    .count(),
                resolved: scoped
                    .iter()
                    .filter_map(|complaint| complaint.resolved_on())
                    .filter(|resolved| resolved >= start && resolved <= end)
                    .count(),
            })
            .collect();

        let resolution_time_data = ComplaintCategory::ALL
            .iter()
            .filter_map(|category| {
                let days = average_resolution_days(
                    in_window
                        .iter()
                        .copied()
                        .filter(|complaint| complaint.category == *category),
                )?;
                Some(ResolutionTime {
                    name: category.label(),
                    days,
                })
            })
            .collect();

        Self {
            period,
            status_data,
            priority_data,
            category_data,
            time_series_data,
            resolution_time_data,
        }
    }
}

/// Mean days from filing to resolution, rounded to one decimal place.
/// `None` when none of the complaints has been resolved.
pub fn average_resolution_days<'a>(
    complaints: impl IntoIterator<Item = &'a Complaint>,
) -> Option<f64> {
    let (total, count) = complaints
        .into_iter()
        .filter_map(Complaint::resolution_days)
        .fold((0_i64, 0_u32), |(total, count), days| (total + days, count + 1));

    if count == 0 {
        return None;
    }

    let mean = total as f64 / f64::from(count);
    Some((mean * 10.0).round() / 10.0)
}
