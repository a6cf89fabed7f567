// Week-of-month bookkeeping. Weeks start on Sunday and are counted from the
// first Sunday of the month; the form only offers weeks 1 through 5.
use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn first_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 - first.weekday().num_days_from_sunday()) % 7;
    first.checked_add_signed(Duration::days(i64::from(offset)))
}

/// Week number (1..=5) that `date` is recorded against. Days before the
/// month's first Sunday count as week 1.
pub fn week_number_for(date: NaiveDate) -> u32 {
    let Some(sunday) = first_sunday(date.year(), date.month()) else {
        return 1;
    };
    let week = (date - sunday).num_days().div_euclid(7) + 1;
    week.clamp(1, 5) as u32
}

/// Sunday-to-Saturday span of `week` in the given month.
pub fn week_dates(week: u32, year: i32, month: u32) -> Option<WeekSpan> {
    let start = first_sunday(year, month)?
        .checked_add_signed(Duration::weeks(i64::from(week) - 1))?;
    let end = start.checked_add_signed(Duration::days(6))?;
    Some(WeekSpan { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_sunday_of_month() {
        // 1 September 2024 is itself a Sunday.
        assert_eq!(first_sunday(2024, 9), Some(d(2024, 9, 1)));
        assert_eq!(first_sunday(2024, 1), Some(d(2024, 1, 7)));
        assert_eq!(first_sunday(2024, 13), None);
    }

    #[test]
    fn week_numbers() {
        assert_eq!(week_number_for(d(2024, 1, 2)), 1);
        assert_eq!(week_number_for(d(2024, 1, 7)), 1);
        assert_eq!(week_number_for(d(2024, 1, 14)), 2);
        assert_eq!(week_number_for(d(2024, 1, 20)), 2);
        assert_eq!(week_number_for(d(2024, 9, 29)), 5);
        assert_eq!(week_number_for(d(2024, 3, 31)), 5);
    }

    #[test]
    fn week_span() {
        let span = week_dates(2, 2024, 1).unwrap();
        assert_eq!(span.start, d(2024, 1, 14));
        assert_eq!(span.end, d(2024, 1, 20));
        assert_eq!(week_dates(1, 2024, 0), None);
    }

    #[test]
    fn week_span_out_of_range_is_none() {
        assert_eq!(week_dates(u32::MAX, 2024, 1), None);
        assert_eq!(week_dates(6, NaiveDate::MAX.year(), 12), None);
    }
}
