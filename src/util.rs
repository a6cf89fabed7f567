// Normalization and formatting helpers.
//
// Snapshot records carry dates and amounts in whatever shape the writer
// used. Everything here turns those into plain values without ever failing:
// bad dates become `None`, bad amounts become `0.0`.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use num_format::{Locale, ToFormattedString};

use crate::types::{DateInput, NumberInput};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y"];

/// Fold any supported date representation into a `NaiveDateTime`.
///
/// Returns `None` for missing input, out-of-range timestamps and strings
/// that match none of the accepted formats.
pub fn normalize_date(input: Option<&DateInput>) -> Option<NaiveDateTime> {
    match input? {
        DateInput::Native(dt) => Some(*dt),
        DateInput::Timestamp {
            seconds,
            nanoseconds,
        } => DateTime::<Utc>::from_timestamp(*seconds, *nanoseconds).map(|dt| dt.naive_utc()),
        DateInput::Millis(ms) => {
            if !ms.is_finite() {
                return None;
            }
            DateTime::<Utc>::from_timestamp_millis(*ms as i64).map(|dt| dt.naive_utc())
        }
        DateInput::Text(s) => parse_date_str(s),
    }
}

/// Parse a textual date. Offsets are converted to UTC; bare dates land on midnight.
pub fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerce a stored amount into a finite number.
///
/// Text is read up to the first character that cannot continue a decimal
/// number, so `"12.50"` is 12.5, `"12abc"` is 12 and `"abc"` is 0.
/// Negative values pass through untouched; rejecting them is the caller's
/// business rule (see `receipt::validate_receipt`).
pub fn parse_amount(input: Option<&NumberInput>) -> f64 {
    let value = match input {
        None => return 0.0,
        Some(NumberInput::Number(n)) => *n,
        Some(NumberInput::Text(s)) => match numeric_prefix(s.trim_start()).parse::<f64>() {
            Ok(v) => v,
            Err(_) => return 0.0,
        },
    };
    finite_or_zero(value)
}

/// Week of the month a submission was recorded against. Anything missing,
/// unparseable or outside 1..=5 is week 1.
pub fn parse_week_number(input: Option<&NumberInput>) -> u32 {
    let week = match input {
        Some(NumberInput::Number(n)) if n.is_finite() => Some(n.trunc() as i64),
        Some(NumberInput::Text(s)) => integer_prefix(s.trim_start()).parse::<i64>().ok(),
        _ => None,
    };
    match week {
        Some(w @ 1..=5) => w as u32,
        _ => 1,
    }
}

fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - end - 1;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return "";
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    &s[..end]
}

fn integer_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits {
        return "";
    }
    &s[..end]
}

pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Percentage change from `previous` to `current`. A zero (or non-finite)
/// baseline yields 0 rather than infinity.
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() {
        return 0.0;
    }
    finite_or_zero((current - previous) / previous * 100.0)
}

/// Mean of `total` over `count` items; 0 when there are no items.
pub fn ratio(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total / count as f64
}

/// Zero-padded `YYYY-MM`, which sorts chronologically as a plain string.
pub fn month_key(date: &NaiveDateTime) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Calendar quarter index 0..=3 for a date.
pub fn quarter_index(date: &NaiveDateTime) -> usize {
    (date.month0() / 3) as usize
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware thousands separators, e.g. `1,234,567.89`.
    let n = finite_or_zero(n);
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n < 0.0 && s.bytes().any(|b| (b'1'..=b'9').contains(&b));
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => group_digits(int_part),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

// Beyond u128 the digits are grouped by hand.
fn group_digits(digits: &str) -> String {
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    out.push_str(&digits[..lead.min(digits.len())]);
    let mut i = lead;
    while i < digits.len() {
        out.push(',');
        out.push_str(&digits[i..i + 3]);
        i += 3;
    }
    out
}

/// Kwacha amounts as shown on receipts and exports: `K1,234.56`.
pub fn format_currency(amount: f64) -> String {
    let formatted = format_number(amount, 2);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-K{}", rest),
        None => format!("K{}", formatted),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn format_display_date(date: &NaiveDateTime) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_timestamp(date: &NaiveDateTime) -> String {
    date.format("%d/%m/%Y, %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn amount_defaults() {
        assert_eq!(parse_amount(None), 0.0);
        assert_eq!(parse_amount(Some(&"12.50".into())), 12.5);
        assert_eq!(parse_amount(Some(&"abc".into())), 0.0);
        assert_eq!(parse_amount(Some(&"".into())), 0.0);
        assert_eq!(parse_amount(Some(&NumberInput::Number(f64::NAN))), 0.0);
        assert_eq!(parse_amount(Some(&NumberInput::Number(f64::INFINITY))), 0.0);
    }

    #[test]
    fn amount_reads_leading_number() {
        assert_eq!(parse_amount(Some(&"  42kw".into())), 42.0);
        assert_eq!(parse_amount(Some(&"1,000".into())), 1.0);
        assert_eq!(parse_amount(Some(&".5".into())), 0.5);
        assert_eq!(parse_amount(Some(&"2e3".into())), 2000.0);
        assert_eq!(parse_amount(Some(&"7e".into())), 7.0);
        assert_eq!(parse_amount(Some(&"-".into())), 0.0);
    }

    #[test]
    fn amount_keeps_negatives() {
        assert_eq!(parse_amount(Some(&"-5".into())), -5.0);
        assert_eq!(parse_amount(Some(&NumberInput::Number(-2.5))), -2.5);
    }

    #[test]
    fn week_number_defaults_to_one() {
        assert_eq!(parse_week_number(None), 1);
        assert_eq!(parse_week_number(Some(&"3".into())), 3);
        assert_eq!(parse_week_number(Some(&NumberInput::Number(4.7))), 4);
        assert_eq!(parse_week_number(Some(&"0".into())), 1);
        assert_eq!(parse_week_number(Some(&"9".into())), 1);
        assert_eq!(parse_week_number(Some(&"week".into())), 1);
    }

    #[test]
    fn normalizes_every_date_shape() {
        let expected = ymd(2024, 3, 15);
        let native = DateInput::Native(expected);
        let ts = DateInput::Timestamp {
            seconds: expected.and_utc().timestamp(),
            nanoseconds: 0,
        };
        let millis = DateInput::Millis(expected.and_utc().timestamp_millis() as f64);
        let iso = DateInput::Text("2024-03-15".to_string());
        let rfc = DateInput::Text("2024-03-15T02:00:00+02:00".to_string());
        let spaced = DateInput::Text("2024-03-15 00:00:00".to_string());
        let us = DateInput::Text("03/15/2024".to_string());
        let long = DateInput::Text("March 15, 2024".to_string());
        for input in [native, ts, millis, iso, rfc, spaced, us, long] {
            assert_eq!(normalize_date(Some(&input)), Some(expected), "{:?}", input);
        }
    }

    #[test]
    fn bad_dates_are_none() {
        assert_eq!(normalize_date(None), None);
        assert_eq!(normalize_date(Some(&DateInput::Text("not a date".into()))), None);
        assert_eq!(normalize_date(Some(&DateInput::Text("".into()))), None);
        assert_eq!(normalize_date(Some(&DateInput::Millis(f64::NAN))), None);
        assert_eq!(
            normalize_date(Some(&DateInput::Timestamp {
                seconds: i64::MAX,
                nanoseconds: 0
            })),
            None
        );
    }

    #[test]
    fn growth_rate_zero_baseline() {
        assert_eq!(growth_rate(500.0, 0.0), 0.0);
        assert_eq!(growth_rate(0.0, 0.0), 0.0);
        assert_eq!(growth_rate(150.0, 100.0), 50.0);
        assert_eq!(growth_rate(50.0, 100.0), -50.0);
    }

    #[test]
    fn month_keys_are_padded() {
        assert_eq!(month_key(&ymd(2024, 3, 1)), "2024-03");
        assert_eq!(month_key(&ymd(2024, 11, 30)), "2024-11");
        assert_eq!(quarter_index(&ymd(2024, 3, 31)), 0);
        assert_eq!(quarter_index(&ymd(2024, 4, 1)), 1);
        assert_eq!(quarter_index(&ymd(2024, 12, 1)), 3);
    }

    #[test]
    fn currency_format() {
        assert_eq!(format_currency(1234.5), "K1,234.50");
        assert_eq!(format_currency(0.0), "K0.00");
        assert_eq!(format_currency(-1.0), "-K1.00");
        assert_eq!(format_currency(f64::NAN), "K0.00");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn currency_format_large_amounts() {
        assert_eq!(format_currency(9.3e18), "K9,300,000,000,000,000,000.00");
        assert_eq!(format_currency(1e20), "K100,000,000,000,000,000,000.00");
        assert_eq!(format_currency(-1e20), "-K100,000,000,000,000,000,000.00");

        let huge = format_currency(1e40);
        assert!(huge.starts_with("K10,000,000,000,000,000,"), "{}", huge);
        assert!(huge.ends_with(".00"));
        assert_eq!(group_digits("1234567"), "1,234,567");
        assert_eq!(group_digits("123"), "123");
    }
}
