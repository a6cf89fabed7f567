use crate::error::{Error, Result};
use crate::types::{DateInput, Member, NumberInput, Submission};
use crate::util::normalize_date;
use csv::ReaderBuilder;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Loaded rows whose date could not be normalized.
    pub undated_rows: usize,
}

/// A CSV submission row; every cell is optional text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionRow {
    id: Option<String>,
    date: Option<String>,
    tithe: Option<String>,
    offering: Option<String>,
    member_id: Option<String>,
    member_name: Option<String>,
    week_number: Option<String>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Submission {
            id: row.id.unwrap_or_default().trim().to_string(),
            date: row.date.map(DateInput::Text),
            tithe: row.tithe.map(NumberInput::Text),
            offering: row.offering.map(NumberInput::Text),
            member_id: row.member_id.map(|v| v.trim().to_string()),
            member_name: row.member_name.map(|v| v.trim().to_string()),
            week_number: row.week_number.map(NumberInput::Text),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberRow {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id.unwrap_or_default().trim().to_string(),
            first_name: row.first_name.map(|v| v.trim().to_string()),
            last_name: row.last_name.map(|v| v.trim().to_string()),
        }
    }
}

enum Format {
    Json,
    Csv,
}

fn detect_format(path: &Path) -> Result<Format> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("json") => Ok(Format::Json),
        Some("csv") => Ok(Format::Csv),
        _ => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, LoadReport)> {
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut report = LoadReport::default();
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        report.total_rows += 1;
        match serde_json::from_value::<T>(record) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("skipping record {} of {}: {}", report.total_rows, path.display(), e);
                report.parse_errors += 1;
            }
        }
    }
    report.loaded_rows = rows.len();
    Ok((rows, report))
}

fn read_csv<R, T>(path: &Path) -> Result<(Vec<T>, LoadReport)>
where
    R: DeserializeOwned,
    T: From<R>,
{
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::Headers).from_path(path)?;
    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    for result in rdr.deserialize::<R>() {
        report.total_rows += 1;
        match result {
            Ok(row) => rows.push(T::from(row)),
            Err(e) => {
                warn!("skipping row {} of {}: {}", report.total_rows, path.display(), e);
                report.parse_errors += 1;
            }
        }
    }
    report.loaded_rows = rows.len();
    Ok((rows, report))
}

/// Load a submission snapshot from a `.json` array or a `.csv` file.
pub fn load_submissions(path: impl AsRef<Path>) -> Result<(Vec<Submission>, LoadReport)> {
    let path = path.as_ref();
    let (submissions, mut report) = match detect_format(path)? {
        Format::Json => read_json::<Submission>(path)?,
        Format::Csv => read_csv::<SubmissionRow, Submission>(path)?,
    };
    report.undated_rows = submissions
        .iter()
        .filter(|s| normalize_date(s.date.as_ref()).is_none())
        .count();
    info!(
        "loaded {} submissions from {} ({} undated, {} rejected)",
        report.loaded_rows,
        path.display(),
        report.undated_rows,
        report.parse_errors
    );
    Ok((submissions, report))
}

/// Load a member snapshot from a `.json` array or a `.csv` file.
pub fn load_members(path: impl AsRef<Path>) -> Result<(Vec<Member>, LoadReport)> {
    let path = path.as_ref();
    let (members, report) = match detect_format(path)? {
        Format::Json => read_json::<Member>(path)?,
        Format::Csv => read_csv::<MemberRow, Member>(path)?,
    };
    info!("loaded {} members from {}", report.loaded_rows, path.display());
    Ok((members, report))
}
