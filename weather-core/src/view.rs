use crate::{WeatherError, model::WeatherRecord};

/// Passive display surface driven by [`crate::WeatherSync`].
///
/// Every call arrives through the coordinator's dispatcher, i.e. on the UI context.
pub trait WeatherView: Send + Sync {
    fn on_progress_loading(&self, loading: bool);

    fn on_current_weather_success(&self, record: &WeatherRecord);

    fn on_error(&self, error: &WeatherError);

    fn on_internet_connection_failed(&self);

    /// Local-only lookup found nothing.
    fn on_db_empty(&self);

    /// Every cached place, e.g. to fill a location picker.
    fn on_cached_locations(&self, _records: &[WeatherRecord]) {}
}
