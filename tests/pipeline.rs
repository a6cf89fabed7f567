use chrono::NaiveDate;
use std::fs;
use tithe_analytics::export::format_enhanced_report_for_excel_at;
use tithe_analytics::loader::{load_members, load_submissions};
use tithe_analytics::report::filter_by_date_range;
use tithe_analytics::types::Cell;
use tithe_analytics::{build_analytics, generate_enhanced_report, output, DateRange};

const SUBMISSIONS: &str = r#"[
    {"id": "s1", "date": "2024-01-07", "tithe": "500", "offering": 50, "memberId": "m1", "memberName": "Ruth Banda", "weekNumber": 1},
    {"id": "s2", "date": {"seconds": 1705795200, "nanoseconds": 0}, "tithe": 300, "offering": "25.50", "memberId": "m2", "memberName": "John Phiri", "weekNumber": "3"},
    {"id": "s3", "date": "2024-02-04T10:15:00", "tithe": 450, "offering": 0, "memberId": "m1", "memberName": "Ruth Banda", "weekNumber": 1},
    {"id": "s4", "date": "2024-04-14", "tithe": "abc", "offering": 40, "memberId": "ghost", "weekNumber": 2},
    {"id": "s5", "date": "someday", "tithe": 1000, "offering": 0, "memberId": "m2"}
]"#;

const MEMBERS: &str = "id,firstName,lastName\nm1,Ruth,Banda\nm2,John,Phiri\nm3,Esther,Zulu\n";

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn snapshot_to_sheets() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let subs_path = dir.path().join("submissions.json");
    let members_path = dir.path().join("members.csv");
    fs::write(&subs_path, SUBMISSIONS).unwrap();
    fs::write(&members_path, MEMBERS).unwrap();

    let (submissions, load_report) = load_submissions(&subs_path).unwrap();
    let (members, _) = load_members(&members_path).unwrap();
    assert_eq!(submissions.len(), 5);
    assert_eq!(load_report.undated_rows, 1);
    assert_eq!(members.len(), 3);

    let today = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
    let bundle = build_analytics(&submissions, &members, today);

    // February vs January.
    assert!(close(bundle.monthly_comparison.tithes.current, 450.0));
    assert!(close(bundle.monthly_comparison.tithes.previous, 800.0));
    assert!(close(bundle.monthly_comparison.offerings.current, 0.0));

    let months: Vec<&str> = bundle.yearly_trends.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-04"]);

    assert_eq!(bundle.quarterly_stats.len(), 4);
    let dated_tithes: f64 = bundle.quarterly_stats.iter().map(|q| q.tithes).sum();
    assert!(close(dated_tithes, 1250.0));

    assert_eq!(bundle.contribution_patterns.len(), 3);
    assert_eq!(bundle.contribution_patterns[0].member_id, "m2");
    assert!(close(bundle.contribution_patterns[0].total_contributions, 1325.5));
    assert_eq!(bundle.contribution_patterns[0].frequency, 2);
    assert_eq!(bundle.contribution_patterns[2].member_id, "m3");
    assert_eq!(bundle.contribution_patterns[2].frequency, 0);

    let weeks: Vec<u32> = bundle.weekly_averages.iter().map(|w| w.week_number).collect();
    assert_eq!(weeks, vec![1, 2, 3]);

    assert_eq!(bundle.growth_trends[0].month, "2024-01");
    assert_eq!(bundle.growth_trends[0].contributor_count, 2);

    let range = DateRange::new("2024-01-01", "2024-01-31");
    let january = filter_by_date_range(&submissions, &range);
    let report = generate_enhanced_report(Some(january.as_slice()), Some(&range));
    assert_eq!(report.summary.number_of_contributions, 2);
    assert!(close(report.summary.total_contributions, 875.5));
    assert!(close(report.summary.average_contribution, 437.75));

    let stamp = NaiveDate::from_ymd_opt(2024, 2, 20)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let sheets = format_enhanced_report_for_excel_at(Some(&report), stamp);
    assert_eq!(sheets.summary[5][1], Cell::from("K875.50"));
    assert_eq!(sheets.details.len(), 4);
    assert_eq!(sheets.details[3][1], Cell::from("John Phiri"));

    let summary_path = dir.path().join("summary.csv");
    output::write_sheet(&summary_path, &sheets.summary).unwrap();
    let written = fs::read_to_string(&summary_path).unwrap();
    assert!(written.starts_with("Church Finance System - Summary Report\n"));
    assert!(written.contains("Number of Contributions:,2"));

    let json_path = dir.path().join("analytics.json");
    output::write_json(&json_path, &bundle).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["quarterlyStats"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["monthlyComparison"]["tithes"]["current"], 450.0);
}
