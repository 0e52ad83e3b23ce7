//! The financial report: aggregation, the stats endpoint, the reports page
//! and the CSV and printable exports.

mod aggregation;
mod export;
mod reports_page;
pub(crate) mod stats_endpoint;

pub use aggregation::{MonthlyBreakdown, Report, ReportEntry, aggregate};
pub use export::{get_report_csv, get_report_html};
pub use reports_page::get_reports_page;
pub use stats_endpoint::get_report_stats;
