//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider and the local weather cache
//! - A repository routing fetches to network or cache
//! - The sync coordinator that fetches current/hourly/daily weather
//!   concurrently and joins them into one record
//!
//! It is used by `weather-cli`, but can also be driven by any other front end
//! that implements [`WeatherView`] and supplies a [`Dispatcher`].

pub mod config;
pub mod connectivity;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod provider;
pub mod repository;
pub mod store;
pub mod sync;
pub mod units;
pub mod view;

pub use config::Config;
pub use dispatch::{Dispatcher, InlineDispatcher, QueueDispatcher, UiQueue, ui_queue};
pub use error::WeatherError;
pub use model::{
    CurrentFragment, FetchRequest, ForecastFragment, Fragment, Granularity, Place, WeatherEntry,
    WeatherRecord,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use repository::WeatherRepository;
pub use store::{JsonFileStore, LocalStore, MemoryStore};
pub use sync::{Phase, SyncCycle, WeatherSync};
pub use view::WeatherView;
