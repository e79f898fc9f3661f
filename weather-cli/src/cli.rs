use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use std::{sync::Arc, time::Duration};
use tokio::runtime::Handle;

use weather_core::{
    Config, FetchRequest, InlineDispatcher, JsonFileStore, OpenWeatherProvider, Phase, WeatherRepository,
    WeatherSync, WeatherView, connectivity, provider_from_config, ui_queue,
};

use crate::view::TerminalView;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key (and optionally a different API base URL).
    Configure,

    /// Fetch current, hourly and daily weather for a coordinate pair.
    Show {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Skip the network and answer from the local cache.
        #[arg(long)]
        offline: bool,

        /// The coordinates are a saved place, not the device's own location.
        #[arg(long)]
        selected: bool,
    },

    /// List cached places, or print the cached weather for one location key.
    Cached {
        /// Location key, e.g. "Ho Chi Minh CityVN".
        key: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, offline, selected } => show(lat, lon, offline, selected).await,
            Command::Cached { key } => cached(key.as_deref()),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    let base_url = Text::new("API base URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    config.set_api_key(api_key.trim().to_string());
    config.base_url = base_url.trim().to_string();
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Wire provider and cache together. Without network the provider is never
/// called, so a missing API key is tolerated.
fn build_repository(config: &Config, use_network: bool) -> anyhow::Result<WeatherRepository> {
    let provider = match provider_from_config(config) {
        Ok(provider) => provider,
        Err(e) if !use_network => {
            tracing::debug!("no usable provider ({e}), cache only");
            OpenWeatherProvider::new(String::new(), &config.base_url, timeout(config))?
        }
        Err(e) => return Err(e),
    };

    let cache_path = config.cache_file_path()?;
    let store = JsonFileStore::open(&cache_path)
        .with_context(|| format!("Failed to open weather cache: {}", cache_path.display()))?;

    Ok(WeatherRepository::new(Arc::new(provider), Arc::new(store))
        .with_offline_radius_km(config.offline_radius_km))
}

fn timeout(config: &Config) -> Duration {
    Duration::from_secs(config.timeout_secs)
}

async fn show(lat: f64, lon: f64, offline: bool, selected: bool) -> anyhow::Result<()> {
    let config = Config::load()?;

    let use_network = if offline {
        false
    } else {
        match connectivity::probe(&config.base_url, timeout(&config)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        }
    };

    let repository = build_repository(&config, use_network)?;
    let view = Arc::new(TerminalView::default());
    let (dispatcher, mut queue) = ui_queue();
    let sync = WeatherSync::new(repository, view.clone(), Arc::new(dispatcher), Handle::current());

    if !use_network && !offline {
        view.on_internet_connection_failed();
    }

    let cycle = sync.get_weather(FetchRequest::new(lat, lon, use_network, !selected));

    // This task is the UI context: it runs every queued notification.
    let finished = cycle.finished();
    tokio::pin!(finished);
    let phase = loop {
        tokio::select! {
            phase = &mut finished => break phase,
            _ = queue.run_next() => {}
        }
    };
    queue.drain();

    if phase != Phase::Ready || view.failed() {
        return Err(anyhow!("No weather available for ({lat}, {lon})"));
    }
    Ok(())
}

fn cached(key: Option<&str>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let repository = build_repository(&config, false)?;
    let view = Arc::new(TerminalView::default());
    let sync = WeatherSync::new(repository, view.clone(), Arc::new(InlineDispatcher), Handle::current());

    match key {
        Some(key) => sync.get_weather_local(key),
        None => sync.load_cached_locations(),
    }

    if view.failed() {
        return Err(anyhow!("Nothing cached"));
    }
    Ok(())
}
