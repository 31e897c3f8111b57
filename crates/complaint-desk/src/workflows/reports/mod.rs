//! Admin analytics and exportable reports over stored complaints.

pub mod analytics;
pub mod export;

pub use analytics::{
    AnalyticsPeriod, ComplaintAnalytics, NamedCount, ResolutionTime, TimeSeriesPoint,
};
pub use export::{Report, ReportError, ReportFormat, ReportKind};
