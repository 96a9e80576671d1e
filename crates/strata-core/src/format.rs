//! Human-readable time rendering
//!
//! Magnitude-adaptive formatting for axis ticks, cluster summaries, and the
//! accessible mirror: deep time renders in Ga/Ma/ka, historical time as
//! BCE/CE years, and the recent past as a calendar date.

use crate::types::{TimeSecs, SECS_PER_YEAR};
use chrono::DateTime;

/// Years (from the epoch) beyond which output switches to gigaannums
const GA_THRESHOLD: i128 = 1_000_000_000;

/// Years beyond which output switches to megaannums
const MA_THRESHOLD: i128 = 1_000_000;

/// Years beyond which output switches to kiloannums
const KA_THRESHOLD: i128 = 10_000;

/// Format an epoch instant at a precision matched to its magnitude.
pub fn format_time(time: TimeSecs) -> String {
    let years = time / SECS_PER_YEAR;

    if years <= -GA_THRESHOLD {
        return format!("{:.1} Ga", -years as f64 / 1e9);
    }
    if years <= -MA_THRESHOLD {
        return format!("{:.1} Ma", -years as f64 / 1e6);
    }
    if years <= -KA_THRESHOLD {
        return format!("{:.0} ka", -years as f64 / 1e3);
    }

    let astronomical = 1970 + years;
    if astronomical <= 0 {
        return format!("{} BCE", 1 - astronomical);
    }

    // Recent past renders as a calendar date when it fits chrono's range
    if (1000..=9999).contains(&astronomical) {
        if let Ok(secs) = i64::try_from(time) {
            if let Some(dt) = DateTime::from_timestamp(secs, 0) {
                return dt.format("%Y-%m-%d").to_string();
            }
        }
    }

    format!("{} CE", astronomical)
}
