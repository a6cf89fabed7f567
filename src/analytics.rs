use crate::types::{
    AnalyticsBundle, ContributionPattern, GrowthMetric, GrowthTrendPoint, Member,
    MonthlyComparison, MonthlyTotals, QuarterlyStat, Submission, WeeklyAverage, YearlyTrendPoint,
};
use crate::util::{
    finite_or_zero, growth_rate, month_key, normalize_date, parse_amount, parse_week_number,
    quarter_index, ratio,
};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

const QUARTERS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

fn metric(current: f64, previous: f64) -> GrowthMetric {
    GrowthMetric {
        current,
        previous,
        growth: growth_rate(current, previous),
    }
}

/// Compare two pre-aggregated periods. The caller decides which
/// submissions belong to "current" and "previous".
pub fn calculate_monthly_comparison(
    current: &MonthlyTotals,
    previous: &MonthlyTotals,
) -> MonthlyComparison {
    let (cur_tithes, cur_offerings) = (
        finite_or_zero(current.total_tithes),
        finite_or_zero(current.total_offerings),
    );
    let (prev_tithes, prev_offerings) = (
        finite_or_zero(previous.total_tithes),
        finite_or_zero(previous.total_offerings),
    );
    MonthlyComparison {
        tithes: metric(cur_tithes, prev_tithes),
        offerings: metric(cur_offerings, prev_offerings),
        total: metric(cur_tithes + cur_offerings, prev_tithes + prev_offerings),
    }
}

/// Sum tithes and offerings per `YYYY-MM` month. Undated submissions are left out.
pub fn bucket_by_month(submissions: &[Submission]) -> HashMap<String, MonthlyTotals> {
    let mut buckets: HashMap<String, MonthlyTotals> = HashMap::new();
    for s in submissions {
        let Some(date) = normalize_date(s.date.as_ref()) else {
            continue;
        };
        let e = buckets.entry(month_key(&date)).or_default();
        e.total_tithes += parse_amount(s.tithe.as_ref());
        e.total_offerings += parse_amount(s.offering.as_ref());
    }
    buckets
}

/// Totals for a single calendar month (`month` is 1-based).
pub fn totals_for_month(submissions: &[Submission], year: i32, month: u32) -> MonthlyTotals {
    submissions
        .iter()
        .filter(|s| {
            normalize_date(s.date.as_ref())
                .map_or(false, |d| d.year() == year && d.month() == month)
        })
        .fold(MonthlyTotals::default(), |mut acc, s| {
            acc.total_tithes += parse_amount(s.tithe.as_ref());
            acc.total_offerings += parse_amount(s.offering.as_ref());
            acc
        })
}

/// Compare the month containing `today` with the calendar month before it.
/// January is compared with December of the previous year.
pub fn month_over_month(submissions: &[Submission], today: NaiveDate) -> MonthlyComparison {
    let (year, month) = (today.year(), today.month());
    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    calculate_monthly_comparison(
        &totals_for_month(submissions, year, month),
        &totals_for_month(submissions, prev_year, prev_month),
    )
}

/// One point per month key, ascending.
pub fn calculate_yearly_trends(monthly: &HashMap<String, MonthlyTotals>) -> Vec<YearlyTrendPoint> {
    let mut months: Vec<(&String, &MonthlyTotals)> = monthly.iter().collect();
    months.sort_by(|a, b| a.0.cmp(b.0));
    months
        .into_iter()
        .map(|(month, totals)| {
            let tithes = finite_or_zero(totals.total_tithes);
            let offerings = finite_or_zero(totals.total_offerings);
            YearlyTrendPoint {
                month: month.clone(),
                tithes,
                offerings,
                total: tithes + offerings,
            }
        })
        .collect()
}

/// Per-member totals, frequency and recency, largest contributors first.
///
/// Every member with an id gets an entry, even without submissions.
/// Submissions that name no member, or an unknown one, are ignored here.
pub fn analyze_contribution_patterns(
    submissions: &[Submission],
    members: &[Member],
) -> Vec<ContributionPattern> {
    let mut patterns: Vec<ContributionPattern> = Vec::with_capacity(members.len());
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for member in members {
        if member.id.is_empty() {
            continue;
        }
        if slots.contains_key(member.id.as_str()) {
            debug!("duplicate member id {} ignored", member.id);
            continue;
        }
        slots.insert(member.id.as_str(), patterns.len());
        patterns.push(ContributionPattern {
            member_id: member.id.clone(),
            member_name: member.display_name(),
            total_contributions: 0.0,
            frequency: 0,
            average_amount: 0.0,
            last_contribution: None,
        });
    }

    let mut unmatched = 0usize;
    for s in submissions {
        let Some(&slot) = s.member_id.as_deref().and_then(|id| slots.get(id)) else {
            unmatched += 1;
            continue;
        };
        let p = &mut patterns[slot];
        p.total_contributions += parse_amount(s.tithe.as_ref()) + parse_amount(s.offering.as_ref());
        p.frequency += 1;
        if let Some(date) = normalize_date(s.date.as_ref()) {
            if p.last_contribution.map_or(true, |last| date > last) {
                p.last_contribution = Some(date);
            }
        }
    }
    debug!(
        "contribution patterns: {} members, {} unmatched submissions",
        patterns.len(),
        unmatched
    );

    for p in &mut patterns {
        p.average_amount = ratio(p.total_contributions, p.frequency);
    }
    patterns.sort_by(|a, b| {
        b.total_contributions
            .partial_cmp(&a.total_contributions)
            .unwrap_or(Ordering::Equal)
    });
    patterns
}

/// Always four entries, Q1 through Q4, whatever range the data covers.
pub fn calculate_quarterly_stats(submissions: &[Submission]) -> Vec<QuarterlyStat> {
    let mut sums = [(0.0f64, 0.0f64); 4];
    let mut skipped = 0usize;
    for s in submissions {
        let Some(date) = normalize_date(s.date.as_ref()) else {
            skipped += 1;
            continue;
        };
        let q = &mut sums[quarter_index(&date)];
        q.0 += parse_amount(s.tithe.as_ref());
        q.1 += parse_amount(s.offering.as_ref());
    }
    if skipped > 0 {
        debug!("quarterly stats skipped {} undated submissions", skipped);
    }
    QUARTERS
        .iter()
        .zip(sums)
        .map(|(quarter, (tithes, offerings))| QuarterlyStat {
            quarter: quarter.to_string(),
            tithes,
            offerings,
            total: tithes + offerings,
        })
        .collect()
}

/// Averages per observed week number, ascending. Weeks with no
/// submissions do not appear.
pub fn calculate_weekly_averages(submissions: &[Submission]) -> Vec<WeeklyAverage> {
    #[derive(Default)]
    struct Acc {
        tithes: f64,
        offerings: f64,
        count: usize,
    }
    let mut weeks: BTreeMap<u32, Acc> = BTreeMap::new();
    for s in submissions {
        let e = weeks
            .entry(parse_week_number(s.week_number.as_ref()))
            .or_default();
        e.tithes += parse_amount(s.tithe.as_ref());
        e.offerings += parse_amount(s.offering.as_ref());
        e.count += 1;
    }
    weeks
        .into_iter()
        .map(|(week, acc)| WeeklyAverage {
            week: format!("Week {}", week),
            week_number: week,
            avg_tithes: ratio(acc.tithes, acc.count),
            avg_offerings: ratio(acc.offerings, acc.count),
            total_contributions: acc.tithes + acc.offerings,
            contribution_count: acc.count,
        })
        .collect()
}

/// Monthly totals with the number of distinct contributing members, ascending by month.
pub fn analyze_growth_trends(submissions: &[Submission]) -> Vec<GrowthTrendPoint> {
    #[derive(Default)]
    struct Acc<'a> {
        tithes: f64,
        offerings: f64,
        contributors: HashSet<&'a str>,
    }
    let mut months: BTreeMap<String, Acc> = BTreeMap::new();
    for s in submissions {
        let Some(date) = normalize_date(s.date.as_ref()) else {
            continue;
        };
        let e = months.entry(month_key(&date)).or_default();
        e.tithes += parse_amount(s.tithe.as_ref());
        e.offerings += parse_amount(s.offering.as_ref());
        if let Some(id) = s.member_id.as_deref().filter(|id| !id.is_empty()) {
            e.contributors.insert(id);
        }
    }
    months
        .into_iter()
        .map(|(month, acc)| GrowthTrendPoint {
            month,
            tithes: acc.tithes,
            offerings: acc.offerings,
            total: acc.tithes + acc.offerings,
            contributor_count: acc.contributors.len(),
        })
        .collect()
}

/// Run every aggregator over one snapshot, with `today` anchoring the
/// month-over-month comparison.
pub fn build_analytics(
    submissions: &[Submission],
    members: &[Member],
    today: NaiveDate,
) -> AnalyticsBundle {
    AnalyticsBundle {
        monthly_comparison: month_over_month(submissions, today),
        yearly_trends: calculate_yearly_trends(&bucket_by_month(submissions)),
        contribution_patterns: analyze_contribution_patterns(submissions, members),
        quarterly_stats: calculate_quarterly_stats(submissions),
        weekly_averages: calculate_weekly_averages(submissions),
        growth_trends: analyze_growth_trends(submissions),
    }
}
