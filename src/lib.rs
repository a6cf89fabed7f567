//! Financial analytics for church tithe and offering records.
//!
//! Raw submissions and members come in as snapshots from the document
//! store; everything in `analytics`, `report` and `export` is a pure
//! transformation over those slices.
pub mod analytics;
pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod output;
pub mod receipt;
pub mod report;
pub mod types;
pub mod util;

pub use analytics::{
    analyze_contribution_patterns, analyze_growth_trends, build_analytics,
    calculate_monthly_comparison, calculate_quarterly_stats, calculate_weekly_averages,
    calculate_yearly_trends,
};
pub use config::Config;
pub use error::{Error, Result};
pub use export::format_enhanced_report_for_excel;
pub use report::{generate_enhanced_report, ReportEntry};
pub use types::{DateInput, DateRange, Member, NumberInput, Submission};
