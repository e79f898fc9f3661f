use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    WeatherError,
    model::{CurrentFragment, ForecastFragment, Fragment, Granularity, Place, WeatherEntry},
};

use super::WeatherProvider;

const CURRENT_PATH: &str = "/data/2.5/weather";
const HOURLY_PATH: &str = "/data/2.5/forecast";
const DAILY_PATH: &str = "/data/2.5/forecast/daily";
const DAILY_COUNT: &str = "7";

/// OpenWeather client. Temperatures are requested in Kelvin (no `units` parameter).
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        granularity: Granularity,
        path: &str,
        latitude: f64,
        longitude: f64,
        extra: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        let lat = latitude.to_string();
        let lon = longitude.to_string();

        tracing::debug!(%granularity, %url, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", self.api_key.as_str())])
            .query(extra)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Transport(format!(
                "OpenWeather {granularity} request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::Parse(format!("OpenWeather {granularity} JSON: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    coord: OwCoord,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwDailyTemp {
    day: f64,
}

#[derive(Debug, Deserialize)]
struct OwDailyEntry {
    dt: i64,
    temp: OwDailyTemp,
    humidity: u8,
    weather: Vec<OwWeather>,
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwDailyResponse {
    city: OwCity,
    list: Vec<OwDailyEntry>,
}

impl OwCity {
    fn into_place(self) -> Place {
        Place {
            city: self.name,
            country: self.country,
            latitude: self.coord.lat,
            longitude: self.coord.lon,
        }
    }
}

/// First reported condition, or code 0 / "Unknown" when the list is empty.
fn main_condition(weather: &[OwWeather]) -> (i32, String) {
    weather
        .first()
        .map(|w| (w.id, w.main.clone()))
        .unwrap_or_else(|| (0, "Unknown".to_string()))
}

impl From<OwCurrentResponse> for CurrentFragment {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition_code, condition) = main_condition(&parsed.weather);

        Fragment {
            place: Place {
                city: parsed.name,
                country: parsed.sys.country,
                latitude: parsed.coord.lat,
                longitude: parsed.coord.lon,
            },
            data: WeatherEntry {
                timestamp: parsed.dt,
                temperature_k: parsed.main.temp,
                wind_speed_mps: parsed.wind.speed,
                humidity_pct: parsed.main.humidity,
                condition_code,
                condition,
            },
        }
    }
}

impl From<OwForecastResponse> for ForecastFragment {
    fn from(parsed: OwForecastResponse) -> Self {
        let data = parsed
            .list
            .into_iter()
            .map(|e| {
                let (condition_code, condition) = main_condition(&e.weather);
                WeatherEntry {
                    timestamp: e.dt,
                    temperature_k: e.main.temp,
                    wind_speed_mps: e.wind.speed,
                    humidity_pct: e.main.humidity,
                    condition_code,
                    condition,
                }
            })
            .collect();

        Fragment { place: parsed.city.into_place(), data }
    }
}

impl From<OwDailyResponse> for ForecastFragment {
    fn from(parsed: OwDailyResponse) -> Self {
        let data = parsed
            .list
            .into_iter()
            .map(|e| {
                let (condition_code, condition) = main_condition(&e.weather);
                WeatherEntry {
                    timestamp: e.dt,
                    temperature_k: e.temp.day,
                    wind_speed_mps: e.speed,
                    humidity_pct: e.humidity,
                    condition_code,
                    condition,
                }
            })
            .collect();

        Fragment { place: parsed.city.into_place(), data }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, latitude: f64, longitude: f64) -> Result<CurrentFragment, WeatherError> {
        let parsed: OwCurrentResponse = self
            .get_json(Granularity::Current, CURRENT_PATH, latitude, longitude, &[])
            .await?;

        Ok(parsed.into())
    }

    async fn fetch_hourly(&self, latitude: f64, longitude: f64) -> Result<ForecastFragment, WeatherError> {
        let parsed: OwForecastResponse = self
            .get_json(Granularity::Hourly, HOURLY_PATH, latitude, longitude, &[])
            .await?;

        Ok(parsed.into())
    }

    async fn fetch_daily(&self, latitude: f64, longitude: f64) -> Result<ForecastFragment, WeatherError> {
        let parsed: OwDailyResponse = self
            .get_json(Granularity::Daily, DAILY_PATH, latitude, longitude, &[("cnt", DAILY_COUNT)])
            .await?;

        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
