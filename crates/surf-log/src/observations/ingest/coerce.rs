//! Lenient parsing of user-entered values.
//!
//! Blank, unparsable, NaN and infinite inputs fall back to a default instead
//! of raising. This keeps data entry forgiving: a half-filled form still
//! scores and renders, and validation decides what blocks persistence.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses a finite float, or `None` for blank/unparsable/non-finite input.
pub fn lenient_float(value: Option<&str>) -> Option<f64> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Parses a number and truncates it toward zero.
pub fn lenient_int(value: Option<&str>) -> Option<i64> {
    lenient_float(value).map(|parsed| parsed.trunc() as i64)
}

pub fn coerce_int(value: Option<&str>, default: i64) -> i64 {
    lenient_int(value).unwrap_or(default)
}

pub fn coerce_float(value: Option<&str>, default: f64) -> f64 {
    lenient_float(value).unwrap_or(default)
}

/// Trimmed text, treating a literal `nan` left behind by spreadsheet exports as blank.
pub fn lenient_text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.eq_ignore_ascii_case("nan") => text.to_string(),
        _ => String::new(),
    }
}

pub fn lenient_date(value: Option<&str>) -> Option<NaiveDate> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

pub fn lenient_time(value: Option<&str>) -> Option<NaiveTime> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
}
