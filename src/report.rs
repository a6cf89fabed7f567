use crate::types::{
    DateRange, EnhancedReport, NumberInput, ReportDetail, ReportSummary, Submission,
    YearlyTrendPoint, UNKNOWN_MEMBER,
};
use crate::util::{normalize_date, parse_amount, parse_date_str, parse_week_number, ratio};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use std::borrow::Cow;

/// Anything that can appear as a row of the enhanced report.
pub trait ReportEntry {
    fn tithe(&self) -> Option<Cow<'_, NumberInput>>;
    fn offering(&self) -> Option<Cow<'_, NumberInput>>;
    fn entry_date(&self) -> Option<NaiveDateTime>;
    fn member_name(&self) -> Option<&str>;
    fn week_number(&self) -> Option<Cow<'_, NumberInput>>;
}

impl ReportEntry for Submission {
    fn tithe(&self) -> Option<Cow<'_, NumberInput>> {
        self.tithe.as_ref().map(Cow::Borrowed)
    }

    fn offering(&self) -> Option<Cow<'_, NumberInput>> {
        self.offering.as_ref().map(Cow::Borrowed)
    }

    fn entry_date(&self) -> Option<NaiveDateTime> {
        normalize_date(self.date.as_ref())
    }

    fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    fn week_number(&self) -> Option<Cow<'_, NumberInput>> {
        self.week_number.as_ref().map(Cow::Borrowed)
    }
}

/// A trend point reports its month totals, dated on the first of the month.
impl ReportEntry for YearlyTrendPoint {
    fn tithe(&self) -> Option<Cow<'_, NumberInput>> {
        Some(Cow::Owned(NumberInput::Number(self.tithes)))
    }

    fn offering(&self) -> Option<Cow<'_, NumberInput>> {
        Some(Cow::Owned(NumberInput::Number(self.offerings)))
    }

    fn entry_date(&self) -> Option<NaiveDateTime> {
        parse_date_str(&format!("{}-01", self.month))
    }

    fn member_name(&self) -> Option<&str> {
        None
    }

    fn week_number(&self) -> Option<Cow<'_, NumberInput>> {
        None
    }
}

impl<T: ReportEntry + ?Sized> ReportEntry for &T {
    fn tithe(&self) -> Option<Cow<'_, NumberInput>> {
        (**self).tithe()
    }

    fn offering(&self) -> Option<Cow<'_, NumberInput>> {
        (**self).offering()
    }

    fn entry_date(&self) -> Option<NaiveDateTime> {
        (**self).entry_date()
    }

    fn member_name(&self) -> Option<&str> {
        (**self).member_name()
    }

    fn week_number(&self) -> Option<Cow<'_, NumberInput>> {
        (**self).week_number()
    }
}

fn has_value(v: Option<Cow<'_, NumberInput>>) -> bool {
    v.map_or(false, |v| v.has_value())
}

/// Summarise `data` into totals plus one detail row per contributing entry.
///
/// Entries where neither tithe nor offering is filled in are dropped.
/// `None` data yields an all-zero summary with no details.
pub fn generate_enhanced_report<E: ReportEntry>(
    data: Option<&[E]>,
    date_range: Option<&DateRange>,
) -> EnhancedReport {
    let date_range = date_range.cloned().unwrap_or_default();
    let Some(data) = data else {
        warn!("no data provided for the enhanced report");
        return EnhancedReport {
            summary: ReportSummary::default(),
            details: Vec::new(),
            date_range,
        };
    };

    let details: Vec<ReportDetail> = data
        .iter()
        .filter(|e| has_value(e.tithe()) || has_value(e.offering()))
        .map(|e| ReportDetail {
            date: e.entry_date(),
            member_name: e
                .member_name()
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_MEMBER)
                .to_string(),
            tithe: parse_amount(e.tithe().as_deref()),
            offering: parse_amount(e.offering().as_deref()),
            week_number: parse_week_number(e.week_number().as_deref()),
        })
        .collect();
    debug!(
        "enhanced report kept {} of {} entries",
        details.len(),
        data.len()
    );

    let total_tithes: f64 = details.iter().map(|d| d.tithe).sum();
    let total_offerings: f64 = details.iter().map(|d| d.offering).sum();
    let total_contributions = total_tithes + total_offerings;
    EnhancedReport {
        summary: ReportSummary {
            total_tithes,
            total_offerings,
            total_contributions,
            average_contribution: ratio(total_contributions, details.len()),
            number_of_contributions: details.len(),
        },
        details,
        date_range,
    }
}

fn range_bound(raw: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    if raw.trim().is_empty() {
        return None;
    }
    let Some(parsed) = parse_date_str(raw) else {
        warn!("ignoring unparseable report bound '{}'", raw);
        return None;
    };
    if end_of_day {
        let day: NaiveDate = parsed.date();
        day.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        Some(parsed)
    }
}

/// Submissions whose date falls inside `range`, both ends inclusive
/// (the end bound covers its whole day). Undated submissions are dropped.
pub fn filter_by_date_range<'a>(
    submissions: &'a [Submission],
    range: &DateRange,
) -> Vec<&'a Submission> {
    let start = range_bound(&range.start, false);
    let end = range_bound(&range.end, true);
    submissions
        .iter()
        .filter(|s| match normalize_date(s.date.as_ref()) {
            Some(d) => start.map_or(true, |b| d >= b) && end.map_or(true, |b| d <= b),
            None => false,
        })
        .collect()
}
