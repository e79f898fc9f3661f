//! Terminal rendering of sync notifications.

use std::sync::atomic::{AtomicBool, Ordering};

use weather_core::{WeatherError, WeatherRecord, WeatherView, units};

const HOURS_SHOWN: usize = 8;

#[derive(Debug, Default)]
pub struct TerminalView {
    failed: AtomicBool,
}

impl TerminalView {
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

fn time_or_dash(formatted: Option<String>) -> String {
    formatted.unwrap_or_else(|| "--".to_string())
}

pub fn render(record: &WeatherRecord) -> String {
    let mut out = String::new();
    let current = &record.current;

    let marker = if record.is_favorite { "" } else { "  (current location)" };
    out.push_str(&format!("{}, {}{marker}\n", record.place.city, record.place.country));
    out.push_str(&format!("Today, {}\n", time_or_dash(units::format_date_time(current.timestamp))));
    out.push_str(&format!(
        "{}°C  {}\n",
        units::kelvin_to_celsius(current.temperature_k),
        current.condition
    ));
    out.push_str(&format!(
        "Wind {} km/h   Humidity {} %\n",
        units::mps_to_kmph(current.wind_speed_mps),
        current.humidity_pct
    ));

    if !record.hourly.is_empty() {
        out.push_str("\nNext hours:\n");
        for entry in record.hourly.iter().take(HOURS_SHOWN) {
            out.push_str(&format!(
                "  {}  {:>4}°C  {}\n",
                time_or_dash(units::format_time(entry.timestamp)),
                units::kelvin_to_celsius(entry.temperature_k),
                entry.condition
            ));
        }
    }

    if !record.daily.is_empty() {
        out.push_str("\nNext days:\n");
        for entry in &record.daily {
            out.push_str(&format!(
                "  {}  {:>4}°C  {}\n",
                time_or_dash(units::format_date_time(entry.timestamp)),
                units::kelvin_to_celsius(entry.temperature_k),
                entry.condition
            ));
        }
    }

    out
}

impl WeatherView for TerminalView {
    fn on_progress_loading(&self, loading: bool) {
        if loading {
            eprintln!("Loading weather...");
        }
    }

    fn on_current_weather_success(&self, record: &WeatherRecord) {
        print!("{}", render(record));
    }

    fn on_error(&self, error: &WeatherError) {
        self.failed.store(true, Ordering::SeqCst);
        eprintln!("Error: {error}");
    }

    fn on_internet_connection_failed(&self) {
        eprintln!("Network is not responding, showing cached weather.");
    }

    fn on_db_empty(&self) {
        self.failed.store(true, Ordering::SeqCst);
        eprintln!("No cached weather available.");
    }

    fn on_cached_locations(&self, records: &[WeatherRecord]) {
        for record in records {
            let kind = if record.is_favorite { "saved" } else { "current" };
            println!(
                "{:<28} {:>8.3} {:>9.3}  {:<7}  fetched {}",
                record.location_key,
                record.place.latitude,
                record.place.longitude,
                kind,
                record.fetched_at.format("%Y-%m-%d %H:%M")
            );
        }
    }
}
