//! Time-text parsing for search and navigation
//!
//! Converts human input ("2024-03-05", "500 BCE", "13.8 Ga", "65 million
//! years ago", "big bang") into a canonical epoch value plus a span hinting
//! how wide a window the text denotes. The result feeds viewport-setting
//! logic; parsing itself is pure and performs no I/O.
//!
//! [`parse_at`] is the pure core; [`parse`] supplies the current instant for
//! the `now`/`today` anchors from the system clock.

use crate::types::{TimeSecs, BIG_BANG, EARTH_FORMATION, SECS_PER_DAY, SECS_PER_YEAR};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Span reported for a bare year
const YEAR_SPAN: TimeSecs = SECS_PER_YEAR;

/// Span reported for a year-month date (~30 days)
const MONTH_SPAN: TimeSecs = 30 * SECS_PER_DAY;

/// Span reported for megaannum-scale input
const MA_SPAN: TimeSecs = 1_000_000 * SECS_PER_YEAR;

/// Span reported for gigaannum-scale input
const GA_SPAN: TimeSecs = 1_000_000_000 * SECS_PER_YEAR;

/// Errors produced by time-text parsing.
///
/// These are expected outcomes surfaced to the user, not engine failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Historical year numbering has no year zero
    #[error("Year zero is not valid")]
    YearZero,

    /// The input matched none of the recognized forms
    #[error("No match for time expression: {0:?}")]
    NoMatch(String),
}

/// A parsed time expression: the canonical instant plus the span of time the
/// expression naturally denotes (a year for "2024", a day for "2024-03-05").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTime {
    /// Canonical instant, seconds from the epoch
    pub time: TimeSecs,
    /// Width of the window the text denotes, in seconds
    pub span: TimeSecs,
}

/// Parse a time expression, resolving `now`/`today` from the system clock.
pub fn parse(text: &str) -> Result<ParsedTime, ParseError> {
    parse_at(text, Utc::now().timestamp() as TimeSecs)
}

/// Parse a time expression against an explicit current instant.
///
/// Pure and idempotent: the same `(text, now)` pair always yields the same
/// result.
pub fn parse_at(text: &str, now: TimeSecs) -> Result<ParsedTime, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::NoMatch(text.to_string()));
    }
    let lower = trimmed.to_ascii_lowercase();

    match lower.as_str() {
        "now" | "today" => {
            return Ok(ParsedTime {
                time: now,
                span: SECS_PER_DAY,
            })
        }
        "big bang" => {
            return Ok(ParsedTime {
                time: BIG_BANG,
                span: GA_SPAN,
            })
        }
        "earth formation" => {
            return Ok(ParsedTime {
                time: EARTH_FORMATION,
                span: GA_SPAN,
            })
        }
        _ => {}
    }

    if let Some(parsed) = parse_years_ago(&lower) {
        return Ok(parsed);
    }
    if let Some(parsed) = parse_era_year(&lower)? {
        return Ok(parsed);
    }
    if let Some(parsed) = parse_calendar(trimmed) {
        return Ok(parsed);
    }
    if let Some(parsed) = parse_bare_year(trimmed)? {
        return Ok(parsed);
    }

    Err(ParseError::NoMatch(trimmed.to_string()))
}

/// Geological notation: "13.8 Ga", "66Ma", "65 million years ago".
fn parse_years_ago(lower: &str) -> Option<ParsedTime> {
    let (mantissa, years_per_unit, span) = if let Some(rest) = lower.strip_suffix("ga") {
        (rest.trim_end(), 1_000_000_000, GA_SPAN)
    } else if let Some(rest) = lower.strip_suffix("ma") {
        (rest.trim_end(), 1_000_000, MA_SPAN)
    } else if let Some(rest) = lower.strip_suffix("billion years ago") {
        (rest.trim_end(), 1_000_000_000, GA_SPAN)
    } else if let Some(rest) = lower.strip_suffix("million years ago") {
        (rest.trim_end(), 1_000_000, MA_SPAN)
    } else {
        return None;
    };

    let secs = decimal_years_to_secs(mantissa, years_per_unit)?;
    Some(ParsedTime { time: -secs, span })
}

/// Parse a non-negative decimal literal into an exact second count of
/// `value * years_per_unit` years, without routing the time value through a
/// float.
fn decimal_years_to_secs(text: &str, years_per_unit: i128) -> Option<TimeSecs> {
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut mantissa: i128 = 0;
    for b in int_part.bytes().chain(frac_part.bytes()) {
        mantissa = mantissa.checked_mul(10)?.checked_add((b - b'0') as i128)?;
    }
    let divisor = 10i128.checked_pow(frac_part.len() as u32)?;
    let secs = mantissa
        .checked_mul(years_per_unit)?
        .checked_mul(SECS_PER_YEAR)?
        / divisor;
    Some(secs)
}

/// Era-suffixed years: "500 BCE", "44 bc", "1066 CE", "79 AD".
fn parse_era_year(lower: &str) -> Result<Option<ParsedTime>, ParseError> {
    let (digits, is_bce) = if let Some(rest) = lower.strip_suffix("bce") {
        (rest.trim_end(), true)
    } else if let Some(rest) = lower.strip_suffix("bc") {
        (rest.trim_end(), true)
    } else if let Some(rest) = lower.strip_suffix("ce") {
        (rest.trim_end(), false)
    } else if let Some(rest) = lower.strip_suffix("ad") {
        (rest.trim_end(), false)
    } else {
        return Ok(None);
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let year: i128 = match digits.parse() {
        Ok(y) => y,
        Err(_) => return Ok(None),
    };
    if year == 0 {
        return Err(ParseError::YearZero);
    }

    // Historical convention: 1 BCE is astronomical year 0
    let astronomical = if is_bce { 1 - year } else { year };
    Ok(Some(ParsedTime {
        time: year_midpoint(astronomical),
        span: YEAR_SPAN,
    }))
}

/// Calendar forms via chrono: full ISO 8601 datetimes (zone optional, UTC
/// assumed when absent), `YYYY-MM-DD`, and `YYYY-MM`.
fn parse_calendar(text: &str) -> Option<ParsedTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedTime {
            time: dt.timestamp() as TimeSecs,
            span: 1,
        });
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ParsedTime {
                time: dt.and_utc().timestamp() as TimeSecs,
                span: 1,
            });
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(ParsedTime {
            time: midnight.and_utc().timestamp() as TimeSecs,
            span: SECS_PER_DAY,
        });
    }
    parse_year_month(text)
}

/// `YYYY-MM` is not a chrono format string target, so handle it by hand.
fn parse_year_month(text: &str) -> Option<ParsedTime> {
    let (year, month) = text.split_once('-')?;
    if year.len() < 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(ParsedTime {
        time: midnight.and_utc().timestamp() as TimeSecs,
        span: MONTH_SPAN,
    })
}

/// Bare year, optionally signed; a leading `-` reads as BCE.
fn parse_bare_year(text: &str) -> Result<Option<ParsedTime>, ParseError> {
    let (digits, negative) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let year: i128 = match digits.parse() {
        Ok(y) => y,
        Err(_) => return Ok(None),
    };
    if year == 0 {
        return Err(ParseError::YearZero);
    }

    let astronomical = if negative { 1 - year } else { year };
    Ok(Some(ParsedTime {
        time: year_midpoint(astronomical),
        span: YEAR_SPAN,
    }))
}

/// Midpoint of an astronomical year, in epoch seconds
fn year_midpoint(astronomical_year: i128) -> TimeSecs {
    (astronomical_year - 1970) * SECS_PER_YEAR + SECS_PER_YEAR / 2
}
