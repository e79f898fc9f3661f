//! Display conversions for raw API units. All times are rendered in UTC.

use chrono::{DateTime, Timelike, Utc};

const KELVIN_OFFSET: f64 = 273.15;

/// Kelvin to whole degrees Celsius.
pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
    (kelvin - KELVIN_OFFSET).round() as i32
}

/// Metres per second to km/h, one decimal place.
pub fn mps_to_kmph(mps: f64) -> f64 {
    (mps * 3.6 * 10.0).round() / 10.0
}

fn to_utc(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp, 0)
}

/// e.g. "14 Nov 22:13"; `None` for timestamps chrono cannot represent.
pub fn format_date_time(timestamp: i64) -> Option<String> {
    to_utc(timestamp).map(|dt| dt.format("%d %b %H:%M").to_string())
}

/// e.g. "22:13".
pub fn format_time(timestamp: i64) -> Option<String> {
    to_utc(timestamp).map(|dt| dt.format("%H:%M").to_string())
}

pub fn hour_of_day(timestamp: i64) -> Option<u32> {
    to_utc(timestamp).map(|dt| dt.hour())
}
