use crate::types::Submission;
use crate::util::{normalize_date, parse_amount};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Amounts that passed receipt validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiptAmounts {
    pub date: NaiveDateTime,
    pub tithe: f64,
    pub offering: f64,
    pub total: f64,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ReceiptError {
    #[error("missing required submission field '{0}'")]
    MissingField(&'static str),
    #[error("invalid amount: negative values are not allowed")]
    NegativeAmount,
    #[error("invalid amount: no valid contribution found")]
    NoContribution,
}

/// Check that a submission can be issued a receipt.
///
/// The shared amount parser keeps negative numbers, so this is where they
/// get rejected.
pub fn validate_receipt(submission: &Submission) -> Result<ReceiptAmounts, ReceiptError> {
    if submission.id.is_empty() {
        return Err(ReceiptError::MissingField("id"));
    }
    let date = normalize_date(submission.date.as_ref()).ok_or(ReceiptError::MissingField("date"))?;
    if submission.member_name.as_deref().map_or(true, str::is_empty) {
        return Err(ReceiptError::MissingField("memberName"));
    }

    let tithe = parse_amount(submission.tithe.as_ref());
    let offering = parse_amount(submission.offering.as_ref());
    if tithe < 0.0 || offering < 0.0 {
        return Err(ReceiptError::NegativeAmount);
    }
    if tithe == 0.0 && offering == 0.0 {
        return Err(ReceiptError::NoContribution);
    }
    Ok(ReceiptAmounts {
        date,
        tithe,
        offering,
        total: tithe + offering,
    })
}

/// `RCP-YYMM-NNNN`, where `NNNN` is the caller's serial modulo 10,000.
pub fn receipt_number(date: NaiveDate, serial: u32) -> String {
    format!(
        "RCP-{:02}{:02}-{:04}",
        date.year().rem_euclid(100),
        date.month(),
        serial % 10_000
    )
}
