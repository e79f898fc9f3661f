//! Routes each fetch to the remote provider or the local cache.
//!
//! The repository holds no per-request state, does not retry and does not merge.

use std::sync::Arc;

use crate::{
    WeatherError,
    config::DEFAULT_OFFLINE_RADIUS_KM,
    model::{CurrentFragment, ForecastFragment, WeatherRecord},
    provider::WeatherProvider,
    store::LocalStore,
};

#[derive(Clone)]
pub struct WeatherRepository {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn LocalStore>,
    offline_radius_km: f64,
}

impl WeatherRepository {
    pub fn new(provider: Arc<dyn WeatherProvider>, store: Arc<dyn LocalStore>) -> Self {
        Self { provider, store, offline_radius_km: DEFAULT_OFFLINE_RADIUS_KM }
    }

    pub fn with_offline_radius_km(mut self, radius_km: f64) -> Self {
        self.offline_radius_km = radius_km;
        self
    }

    pub async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
        use_network: bool,
    ) -> Result<CurrentFragment, WeatherError> {
        if use_network {
            self.provider.fetch_current(latitude, longitude).await
        } else {
            self.cached_record(latitude, longitude)
                .map(|record| record.current_fragment())
        }
    }

    pub async fn fetch_hourly(
        &self,
        latitude: f64,
        longitude: f64,
        use_network: bool,
    ) -> Result<ForecastFragment, WeatherError> {
        if use_network {
            self.provider.fetch_hourly(latitude, longitude).await
        } else {
            self.cached_record(latitude, longitude)
                .map(|record| record.hourly_fragment())
        }
    }

    pub async fn fetch_daily(
        &self,
        latitude: f64,
        longitude: f64,
        use_network: bool,
    ) -> Result<ForecastFragment, WeatherError> {
        if use_network {
            self.provider.fetch_daily(latitude, longitude).await
        } else {
            self.cached_record(latitude, longitude)
                .map(|record| record.daily_fragment())
        }
    }

    /// Persist a complete record, replacing any earlier one for the same location.
    pub fn insert(&self, record: &WeatherRecord) -> Result<(), WeatherError> {
        self.store.put(record)
    }

    pub fn get_local(&self, location_key: &str) -> Result<Option<WeatherRecord>, WeatherError> {
        self.store.get(location_key)
    }

    pub fn all_local(&self) -> Result<Vec<WeatherRecord>, WeatherError> {
        self.store.all()
    }

    /// The cached record an offline fetch at these coordinates is served from.
    ///
    /// Each call reads the store again. A caller that needs several slots of
    /// the same record must resolve it once and slice it.
    pub fn cached_record(&self, latitude: f64, longitude: f64) -> Result<WeatherRecord, WeatherError> {
        tracing::debug!(latitude, longitude, "serving fetch from local cache");

        self.store.nearest(latitude, longitude, self.offline_radius_km)?.ok_or_else(|| {
            WeatherError::CacheMiss(format!("({latitude}, {longitude}) within {} km", self.offline_radius_km))
        })
    }
}

impl std::fmt::Debug for WeatherRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherRepository")
            .field("provider", &self.provider)
            .field("offline_radius_km", &self.offline_radius_km)
            .finish_non_exhaustive()
    }
}
