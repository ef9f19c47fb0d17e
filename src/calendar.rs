// src/calendar.rs
use chrono::{Datelike, NaiveDate};

use crate::error::WatchError;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Weekday of a `YYYY-MM-DD` date, Monday first. The date is taken as-is,
/// no timezone conversion.
pub fn weekday_name(date: &str) -> Result<&'static str, WatchError> {
    let d = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| WatchError::BadDate(date.to_string()))?;
    Ok(WEEKDAYS[d.weekday().num_days_from_monday() as usize])
}
