use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

use crate::util::format_currency;

pub const UNKNOWN_MEMBER: &str = "Unknown Member";

/// A point in time as it arrives from the document store.
///
/// Snapshots mix native datetimes, backend timestamp wrappers, epoch
/// milliseconds and free-form strings. `util::normalize_date` folds all of
/// them into a `NaiveDateTime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Timestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Millis(f64),
    Text(String),
    #[serde(skip_deserializing)]
    Native(NaiveDateTime),
}

/// A numeric field that may have been stored as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Whether the raw value counts as "filled in": non-zero numbers and
    /// non-empty strings. A literal `"0"` string still counts.
    pub fn has_value(&self) -> bool {
        match self {
            NumberInput::Number(n) => *n != 0.0 && !n.is_nan(),
            NumberInput::Text(s) => !s.is_empty(),
        }
    }
}

impl From<f64> for NumberInput {
    fn from(n: f64) -> Self {
        NumberInput::Number(n)
    }
}

impl From<&str> for NumberInput {
    fn from(s: &str) -> Self {
        NumberInput::Text(s.to_string())
    }
}

/// One recorded contribution event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub id: String,
    pub date: Option<DateInput>,
    pub tithe: Option<NumberInput>,
    pub offering: Option<NumberInput>,
    pub member_id: Option<String>,
    pub member_name: Option<String>,
    pub week_number: Option<NumberInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default)]
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Member {
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{} {}", first, last)
            }
            _ => UNKNOWN_MEMBER.to_string(),
        }
    }
}

/// Pre-aggregated totals for one period, as handed to the monthly comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotals {
    pub total_tithes: f64,
    pub total_offerings: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GrowthMetric {
    pub current: f64,
    pub previous: f64,
    pub growth: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyComparison {
    pub tithes: GrowthMetric,
    pub offerings: GrowthMetric,
    pub total: GrowthMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct YearlyTrendPoint {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "Tithes", display_with = "money")]
    pub tithes: f64,
    #[tabled(rename = "Offerings", display_with = "money")]
    pub offerings: f64,
    #[tabled(rename = "Total", display_with = "money")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPattern {
    #[tabled(skip)]
    pub member_id: String,
    #[tabled(rename = "Member")]
    pub member_name: String,
    #[tabled(rename = "Total", display_with = "money")]
    pub total_contributions: f64,
    #[tabled(rename = "Frequency")]
    pub frequency: usize,
    #[tabled(rename = "Average", display_with = "money")]
    pub average_amount: f64,
    #[tabled(rename = "LastContribution", display_with = "optional_date")]
    pub last_contribution: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct QuarterlyStat {
    #[tabled(rename = "Quarter")]
    pub quarter: String,
    #[tabled(rename = "Tithes", display_with = "money")]
    pub tithes: f64,
    #[tabled(rename = "Offerings", display_with = "money")]
    pub offerings: f64,
    #[tabled(rename = "Total", display_with = "money")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAverage {
    #[tabled(rename = "Week")]
    pub week: String,
    #[tabled(skip)]
    pub week_number: u32,
    #[tabled(rename = "AvgTithes", display_with = "money")]
    pub avg_tithes: f64,
    #[tabled(rename = "AvgOfferings", display_with = "money")]
    pub avg_offerings: f64,
    #[tabled(rename = "Total", display_with = "money")]
    pub total_contributions: f64,
    #[tabled(rename = "Count")]
    pub contribution_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct GrowthTrendPoint {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "Tithes", display_with = "money")]
    pub tithes: f64,
    #[tabled(rename = "Offerings", display_with = "money")]
    pub offerings: f64,
    #[tabled(rename = "Total", display_with = "money")]
    pub total: f64,
    #[tabled(rename = "Contributors")]
    pub contributor_count: usize,
}

/// Everything the analytics dashboard renders, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBundle {
    pub monthly_comparison: MonthlyComparison,
    pub yearly_trends: Vec<YearlyTrendPoint>,
    pub contribution_patterns: Vec<ContributionPattern>,
    pub quarterly_stats: Vec<QuarterlyStat>,
    pub weekly_averages: Vec<WeeklyAverage>,
    pub growth_trends: Vec<GrowthTrendPoint>,
}

/// Inclusive ISO date bounds; an empty bound is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateRange {
            start: start.into(),
            end: end.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_tithes: f64,
    pub total_offerings: f64,
    pub total_contributions: f64,
    pub average_contribution: f64,
    pub number_of_contributions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    pub date: Option<NaiveDateTime>,
    pub member_name: String,
    pub tithe: f64,
    pub offering: f64,
    pub week_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedReport {
    pub summary: ReportSummary,
    pub details: Vec<ReportDetail>,
    pub date_range: DateRange,
}

/// A single display-ready spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Int(i64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

pub type Row = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcelSheets {
    pub summary: Vec<Row>,
    pub details: Vec<Row>,
}

fn money(v: &f64) -> String {
    format_currency(*v)
}

fn optional_date(v: &Option<NaiveDateTime>) -> String {
    match v {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}
