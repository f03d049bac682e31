use chrono::{NaiveDate, NaiveTime};
use ginko_core::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Why a single CSV row or OFX transaction block was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("invalid date format: {0}")]
    InvalidDate(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("missing required field {0}")]
    MissingField(&'static str),
}

/// Calendar-date layouts seen in bank CSV exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    /// `YYYY/MM/DD`
    YmdSlash,
    /// `YYYY.MM.DD`
    YmdDot,
    /// `YYYY-MM-DD`
    YmdDash,
    /// `YYYYMMDD`
    Compact,
}

impl DateFormat {
    fn separator(self) -> Option<char> {
        match self {
            DateFormat::YmdSlash => Some('/'),
            DateFormat::YmdDot => Some('.'),
            DateFormat::YmdDash => Some('-'),
            DateFormat::Compact => None,
        }
    }
}

pub fn parse_date(s: &str, format: DateFormat) -> Option<NaiveDate> {
    let s = s.trim();
    let (y, m, d) = match format.separator() {
        Some(sep) => {
            let parts: Vec<&str> = s.split(sep).collect();
            if parts.len() != 3 {
                return None;
            }
            (
                leading_int(parts[0])?,
                leading_int(parts[1])?,
                leading_int(parts[2])?,
            )
        }
        None => {
            if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            (s[0..4].parse().ok()?, s[4..6].parse().ok()?, s[6..8].parse().ok()?)
        }
    };
    NaiveDate::from_ymd_opt(i32::try_from(y).ok()?, m, d)
}

/// Parses an OFX `YYYYMMDD[HHMMSS[.XXX]][tz]` stamp. The bracketed timezone
/// is discarded; the time is kept only when all six digits are present.
pub fn parse_ofx_datetime(s: &str) -> Result<(NaiveDate, Option<NaiveTime>), RowError> {
    let invalid = || RowError::InvalidDate(s.trim().to_string());
    let stamp = s.split('[').next().unwrap_or_default().trim();
    let digits: String = stamp.chars().take_while(|c| c.is_ascii_digit()).collect();

    if digits.len() < 8 {
        return Err(invalid());
    }

    let y: i32 = digits[0..4].parse().map_err(|_| invalid())?;
    let m: u32 = digits[4..6].parse().map_err(|_| invalid())?;
    let d: u32 = digits[6..8].parse().map_err(|_| invalid())?;
    let date = NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)?;

    let time = if digits.len() >= 14 {
        let h: u32 = digits[8..10].parse().map_err(|_| invalid())?;
        let min: u32 = digits[10..12].parse().map_err(|_| invalid())?;
        let sec: u32 = digits[12..14].parse().map_err(|_| invalid())?;
        Some(NaiveTime::from_hms_opt(h, min, sec).ok_or_else(invalid)?)
    } else {
        None
    };

    Ok((date, time))
}

/// Largest magnitude accepted from a statement, in yen. Keeps running totals
/// far away from the `Decimal` range.
pub const MAX_AMOUNT_YEN: i64 = 1_000_000_000_000_000;

/// Lenient amount for CSV cells: strips thousands separators, yen glyphs and
/// whitespace. Anything unparsable counts as zero; a number beyond
/// [`MAX_AMOUNT_YEN`] is an error.
pub fn parse_amount(s: &str) -> Result<Money, RowError> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, ',' | '円' | '￥' | '¥') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return Ok(Money::zero());
    }
    match leading_number(&cleaned) {
        Some(n) if !in_range(n) => Err(RowError::InvalidAmount(s.trim().to_string())),
        Some(n) => Ok(Money::from_decimal(n)),
        None => Ok(Money::zero()),
    }
}

/// Tolerant float parse: reads the longest numeric prefix, ignoring
/// thousands separators. `None` when no digits lead the value or it is out
/// of range.
pub fn parse_decimal(s: &str) -> Option<Money> {
    let cleaned = s.trim().replace(',', "");
    leading_number(&cleaned)
        .filter(|n| in_range(*n))
        .map(Money::from_decimal)
}

fn in_range(n: Decimal) -> bool {
    n.abs() <= Decimal::from(MAX_AMOUNT_YEN)
}

fn leading_number(s: &str) -> Option<Decimal> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if !bytes[digits_start..end].iter().any(u8::is_ascii_digit) {
        return None;
    }

    let number = s[..end].trim_start_matches('+').trim_end_matches('.');
    Decimal::from_str(number).ok()
}

fn leading_int(s: &str) -> Option<u32> {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
