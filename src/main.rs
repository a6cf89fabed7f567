// Entry point and menu loop.
//
// - Option [1] loads the submission and member snapshots.
// - Option [2] prints analytics previews and writes them to CSV/JSON.
// - Option [3] builds the enhanced report and writes both export sheets.
// - Option [4] checks which submissions are eligible for a receipt.
use chrono::Local;
use log::{error, warn};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tithe_analytics::types::{Member, Submission};
use tithe_analytics::{analytics, calendar, export, loader, output, receipt, report, util, Config};

// Snapshots stay loaded between menu choices so reports can be rerun
// without rereading the files.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Snapshot>,
}

#[derive(Clone)]
struct Snapshot {
    submissions: Vec<Submission>,
    members: Vec<Member>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn loaded_snapshot() -> Option<Snapshot> {
    let data = state().data.clone();
    if data.is_none() {
        println!("Error: No data loaded. Please load the snapshots first (option 1).\n");
    }
    data
}

fn handle_load(config: &Config) {
    let loaded = loader::load_submissions(&config.submissions_path).and_then(|(subs, sub_report)| {
        loader::load_members(&config.members_path).map(|(members, _)| (subs, sub_report, members))
    });
    match loaded {
        Ok((submissions, load_report, members)) => {
            println!(
                "Loaded {} submissions and {} members.",
                util::format_int(load_report.loaded_rows as u64),
                util::format_int(members.len() as u64)
            );
            if load_report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse errors.",
                    util::format_int(load_report.parse_errors as u64)
                );
            }
            if load_report.undated_rows > 0 {
                println!(
                    "Note: {} submissions have no usable date and are left out of date-based views.",
                    util::format_int(load_report.undated_rows as u64)
                );
            }
            println!();
            state().data = Some(Snapshot {
                submissions,
                members,
            });
        }
        Err(e) => {
            error!("failed to load snapshots: {}", e);
            eprintln!("Failed to load snapshots: {}\n", e);
        }
    }
}

fn handle_analytics(config: &Config) {
    let Some(data) = loaded_snapshot() else {
        return;
    };
    let today = Local::now().date_naive();
    let bundle = analytics::build_analytics(&data.submissions, &data.members, today);
    let rows = config.preview_rows;

    let cmp = &bundle.monthly_comparison;
    println!("Month over month (current week {}):", calendar::week_number_for(today));
    println!(
        "  Tithes    {} vs {} ({}%)",
        util::format_currency(cmp.tithes.current),
        util::format_currency(cmp.tithes.previous),
        util::format_number(cmp.tithes.growth, 2)
    );
    println!(
        "  Offerings {} vs {} ({}%)",
        util::format_currency(cmp.offerings.current),
        util::format_currency(cmp.offerings.previous),
        util::format_number(cmp.offerings.growth, 2)
    );
    println!(
        "  Total     {} vs {} ({}%)\n",
        util::format_currency(cmp.total.current),
        util::format_currency(cmp.total.previous),
        util::format_number(cmp.total.growth, 2)
    );

    println!("Monthly Trends");
    output::preview_table_rows(&bundle.yearly_trends, rows);
    println!("Quarterly Stats");
    output::preview_table_rows(&bundle.quarterly_stats, 4);
    println!("Weekly Averages");
    output::preview_table_rows(&bundle.weekly_averages, 5);
    println!("Growth Trends");
    output::preview_table_rows(&bundle.growth_trends, rows);
    println!("Top Contributors");
    output::preview_table_rows(&bundle.contribution_patterns, rows);

    let writes = [
        output::write_csv(config.output_path("yearly_trends.csv"), &bundle.yearly_trends),
        output::write_csv(config.output_path("quarterly_stats.csv"), &bundle.quarterly_stats),
        output::write_csv(config.output_path("weekly_averages.csv"), &bundle.weekly_averages),
        output::write_csv(config.output_path("growth_trends.csv"), &bundle.growth_trends),
        output::write_csv(
            config.output_path("contribution_patterns.csv"),
            &bundle.contribution_patterns,
        ),
        output::write_json(config.output_path("analytics.json"), &bundle),
    ];
    for result in writes {
        if let Err(e) = result {
            eprintln!("Write error: {}", e);
        }
    }
    println!("(Full analytics exported to {})\n", config.output_dir.display());
}

fn handle_report(config: &Config) {
    let Some(data) = loaded_snapshot() else {
        return;
    };
    let range = config.report_range.clone().unwrap_or_default();
    let in_range = report::filter_by_date_range(&data.submissions, &range);
    let enhanced = report::generate_enhanced_report(Some(in_range.as_slice()), Some(&range));
    let sheets = export::format_enhanced_report_for_excel(Some(&enhanced));

    output::preview_sheet("Summary", &sheets.summary);
    let preview_len = (config.preview_rows + 2).min(sheets.details.len());
    output::preview_sheet("Details", &sheets.details[..preview_len]);

    for (name, rows) in [
        ("report_summary.csv", &sheets.summary),
        ("report_details.csv", &sheets.details),
    ] {
        if let Err(e) = output::write_sheet(config.output_path(name), rows) {
            eprintln!("Write error: {}", e);
        }
    }
    println!("(Report sheets exported to {})\n", config.output_dir.display());
}

fn handle_receipts() {
    let Some(data) = loaded_snapshot() else {
        return;
    };
    let mut eligible = 0usize;
    for s in &data.submissions {
        match receipt::validate_receipt(s) {
            Ok(amounts) => {
                eligible += 1;
                println!(
                    "  {}  {}  {}",
                    receipt::receipt_number(amounts.date.date(), eligible as u32),
                    s.member_name.as_deref().unwrap_or_default(),
                    util::format_currency(amounts.total)
                );
            }
            Err(e) => warn!("submission '{}' not eligible for a receipt: {}", s.id, e),
        }
    }
    println!(
        "{} of {} submissions are eligible for receipts.\n",
        util::format_int(eligible as u64),
        util::format_int(data.submissions.len() as u64)
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    loop {
        println!("Church Finance Analytics");
        println!("[1] Load snapshots");
        println!("[2] Generate analytics");
        println!("[3] Export enhanced report");
        println!("[4] Check receipt eligibility");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&config),
            "2" => handle_analytics(&config),
            "3" => handle_report(&config),
            "4" => handle_receipts(),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-4.\n"),
        }
    }
}
