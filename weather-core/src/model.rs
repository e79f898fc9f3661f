use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters of one sync cycle. Built once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Query the remote API when true, the local cache when false.
    pub use_network: bool,
    /// The device's own (GPS) location rather than a user-selected place.
    pub is_current_location: bool,
}

impl FetchRequest {
    pub fn new(latitude: f64, longitude: f64, use_network: bool, is_current_location: bool) -> Self {
        Self { latitude, longitude, use_network, is_current_location }
    }
}

/// The three independently fetched parts of a weather record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Current,
    Hourly,
    Daily,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Current, Granularity::Hourly, Granularity::Daily];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Current => "current",
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a fetched fragment belongs, as reported by the weather API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    /// Cache key: city name immediately followed by the country code, e.g. "Ho Chi Minh CityVN".
    pub fn location_key(&self) -> String {
        format!("{}{}", self.city, self.country)
    }
}

/// One observation or forecast step, in the units the API delivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    /// Unix seconds.
    pub timestamp: i64,
    pub temperature_k: f64,
    pub wind_speed_mps: f64,
    pub humidity_pct: u8,
    pub condition_code: i32,
    /// Main condition group, e.g. "Clouds".
    pub condition: String,
}

/// Result of a single fetch: the payload plus the place it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment<T> {
    pub place: Place,
    pub data: T,
}

pub type CurrentFragment = Fragment<WeatherEntry>;
pub type ForecastFragment = Fragment<Vec<WeatherEntry>>;

/// A complete weather snapshot for one location.
///
/// Only [`WeatherRecord::join`] builds one, from all three fragments, so a
/// partially fetched record cannot be persisted or displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location_key: String,
    pub place: Place,
    pub current: WeatherEntry,
    pub hourly: Vec<WeatherEntry>,
    pub daily: Vec<WeatherEntry>,
    /// False for the device's own location, true for a manually selected one.
    pub is_favorite: bool,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherRecord {
    /// Combine the three fragments of one cycle. The current fragment names the place.
    pub fn join(
        current: CurrentFragment,
        hourly: ForecastFragment,
        daily: ForecastFragment,
        is_current_location: bool,
    ) -> Self {
        Self {
            location_key: current.place.location_key(),
            place: current.place,
            current: current.data,
            hourly: hourly.data,
            daily: daily.data,
            is_favorite: !is_current_location,
            fetched_at: Utc::now(),
        }
    }

    pub fn current_fragment(&self) -> CurrentFragment {
        Fragment { place: self.place.clone(), data: self.current.clone() }
    }

    pub fn hourly_fragment(&self) -> ForecastFragment {
        Fragment { place: self.place.clone(), data: self.hourly.clone() }
    }

    pub fn daily_fragment(&self) -> ForecastFragment {
        Fragment { place: self.place.clone(), data: self.daily.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saigon() -> Place {
        Place {
            city: "Ho Chi Minh City".into(),
            country: "VN".into(),
            latitude: 10.75,
            longitude: 106.67,
        }
    }

    fn entry(timestamp: i64) -> WeatherEntry {
        WeatherEntry {
            timestamp,
            temperature_k: 303.15,
            wind_speed_mps: 3.1,
            humidity_pct: 74,
            condition_code: 803,
            condition: "Clouds".into(),
        }
    }

    #[test]
    fn location_key_concatenates_city_and_country() {
        assert_eq!(saigon().location_key(), "Ho Chi Minh CityVN");
    }

    #[test]
    fn join_marks_current_location_as_not_favorite() {
        let current = Fragment { place: saigon(), data: entry(1) };
        let hourly = Fragment { place: saigon(), data: vec![entry(2), entry(3)] };
        let daily = Fragment { place: saigon(), data: vec![entry(4)] };

        let record = WeatherRecord::join(current, hourly, daily, true);

        assert_eq!(record.location_key, "Ho Chi Minh CityVN");
        assert!(!record.is_favorite);
        assert_eq!(record.current.timestamp, 1);
        assert_eq!(record.hourly.len(), 2);
        assert_eq!(record.daily.len(), 1);
    }

    #[test]
    fn selected_place_is_favorite() {
        let current = Fragment { place: saigon(), data: entry(1) };
        let hourly = Fragment { place: saigon(), data: vec![] };
        let daily = Fragment { place: saigon(), data: vec![] };

        assert!(WeatherRecord::join(current, hourly, daily, false).is_favorite);
    }

    #[test]
    fn fragments_slice_the_record_back_out() {
        let current = Fragment { place: saigon(), data: entry(1) };
        let hourly = Fragment { place: saigon(), data: vec![entry(2)] };
        let daily = Fragment { place: saigon(), data: vec![entry(3)] };
        let record = WeatherRecord::join(current.clone(), hourly.clone(), daily.clone(), true);

        assert_eq!(record.current_fragment(), current);
        assert_eq!(record.hourly_fragment(), hourly);
        assert_eq!(record.daily_fragment(), daily);
    }
}
