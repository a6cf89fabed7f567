// Spreadsheet-ready grids for the enhanced report.
//
// Only plain rows of cells come out of here; styling, workbook assembly and
// file I/O belong to whoever consumes the grids (see `output::write_sheet`).
use crate::types::{Cell, EnhancedReport, ExcelSheets, Row};
use crate::util::{format_currency, format_display_date, format_timestamp};
use chrono::{Local, NaiveDateTime};

pub const NO_DATA: &str = "No data available";
pub const REPORT_TITLE: &str = "Church Finance System - Summary Report";
pub const DETAILS_TITLE: &str = "Detailed Transactions";
pub const DETAIL_HEADERS: [&str; 6] = ["Date", "Member Name", "Tithe", "Offering", "Total", "Week"];

/// Format `report` with the current local time as the generation stamp.
pub fn format_enhanced_report_for_excel(report: Option<&EnhancedReport>) -> ExcelSheets {
    format_enhanced_report_for_excel_at(report, Local::now().naive_local())
}

pub fn format_enhanced_report_for_excel_at(
    report: Option<&EnhancedReport>,
    generated_at: NaiveDateTime,
) -> ExcelSheets {
    let Some(report) = report else {
        return ExcelSheets {
            summary: vec![vec![Cell::from(NO_DATA)]],
            details: vec![vec![Cell::from(NO_DATA)]],
        };
    };
    let s = &report.summary;

    let summary: Vec<Row> = vec![
        vec![REPORT_TITLE.into()],
        vec!["Generated on:".into(), format_timestamp(&generated_at).into()],
        vec![
            "Period:".into(),
            format!("{} to {}", report.date_range.start, report.date_range.end).into(),
        ],
        vec!["".into()],
        vec!["Key Metrics".into()],
        vec![
            "Total Contributions:".into(),
            format_currency(s.total_contributions).into(),
        ],
        vec!["Total Tithes:".into(), format_currency(s.total_tithes).into()],
        vec![
            "Total Offerings:".into(),
            format_currency(s.total_offerings).into(),
        ],
        vec![
            "Average Contribution:".into(),
            format_currency(s.average_contribution).into(),
        ],
        vec![
            "Number of Contributions:".into(),
            Cell::Int(s.number_of_contributions as i64),
        ],
    ];

    let mut details: Vec<Row> = Vec::with_capacity(report.details.len() + 2);
    details.push(vec![DETAILS_TITLE.into()]);
    details.push(DETAIL_HEADERS.iter().map(|h| Cell::from(*h)).collect());
    for d in &report.details {
        details.push(vec![
            d.date
                .as_ref()
                .map_or_else(|| "N/A".to_string(), format_display_date)
                .into(),
            d.member_name.as_str().into(),
            format_currency(d.tithe).into(),
            format_currency(d.offering).into(),
            format_currency(d.tithe + d.offering).into(),
            Cell::Int(i64::from(d.week_number)),
        ]);
    }

    ExcelSheets { summary, details }
}
