//! Fan-out / join of the three weather fetches that make up one sync cycle.
//!
//! Each call to [`WeatherSync::get_weather`] allocates its own [`JoinState`];
//! cycles never share slots. The first failure ends a cycle, later sibling
//! completions are absorbed by the abandoned state without notifying anyone.
//!
//! An offline cycle reads the cache once; all three slots are sliced from that
//! one record even if the store changes while the cycle runs.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::{runtime::Handle, sync::OnceCell, task::JoinHandle};

use crate::{
    WeatherError,
    dispatch::Dispatcher,
    model::{CurrentFragment, FetchRequest, ForecastFragment, Granularity, WeatherRecord},
    repository::WeatherRepository,
    view::WeatherView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Ready,
    Failed,
}

/// A successfully fetched slot value.
#[derive(Debug)]
pub enum Arrival {
    Current(CurrentFragment),
    Hourly(ForecastFragment),
    Daily(ForecastFragment),
}

impl Arrival {
    fn slice(record: &WeatherRecord, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Current => Arrival::Current(record.current_fragment()),
            Granularity::Hourly => Arrival::Hourly(record.hourly_fragment()),
            Granularity::Daily => Arrival::Daily(record.daily_fragment()),
        }
    }
}

/// Cached record shared by the three fetches of one offline cycle.
type CacheSnapshot = OnceCell<Result<WeatherRecord, WeatherError>>;

/// What a single completion did to the cycle.
#[derive(Debug, PartialEq)]
pub enum Transition {
    Unchanged,
    Ready(WeatherRecord),
    Failed(WeatherError),
}

/// Per-cycle accumulator for the three fragments.
///
/// `Ready` and `Failed` are terminal: once reached, every further completion
/// yields [`Transition::Unchanged`].
#[derive(Debug)]
pub struct JoinState {
    is_current_location: bool,
    current: Option<CurrentFragment>,
    hourly: Option<ForecastFragment>,
    daily: Option<ForecastFragment>,
    phase: Phase,
}

impl JoinState {
    pub fn new(is_current_location: bool) -> Self {
        Self {
            is_current_location,
            current: None,
            hourly: None,
            daily: None,
            phase: Phase::Pending,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn complete(&mut self, result: Result<Arrival, WeatherError>) -> Transition {
        let arrival = match result {
            Ok(arrival) => arrival,
            Err(err) if self.phase == Phase::Pending => {
                self.phase = Phase::Failed;
                return Transition::Failed(err);
            }
            Err(_) => return Transition::Unchanged,
        };

        match arrival {
            Arrival::Current(f) => self.current = Some(f),
            Arrival::Hourly(f) => self.hourly = Some(f),
            Arrival::Daily(f) => self.daily = Some(f),
        }

        if self.phase != Phase::Pending {
            return Transition::Unchanged;
        }

        match (self.current.take(), self.hourly.take(), self.daily.take()) {
            (Some(current), Some(hourly), Some(daily)) => {
                self.phase = Phase::Ready;
                Transition::Ready(WeatherRecord::join(current, hourly, daily, self.is_current_location))
            }
            (current, hourly, daily) => {
                self.current = current;
                self.hourly = hourly;
                self.daily = daily;
                Transition::Unchanged
            }
        }
    }
}

/// Sends view notifications through the dispatcher.
#[derive(Clone)]
struct Notifier {
    view: Arc<dyn WeatherView>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Notifier {
    fn notify(&self, f: impl FnOnce(&dyn WeatherView) + Send + 'static) {
        let view = Arc::clone(&self.view);
        self.dispatcher.dispatch(Box::new(move || f(view.as_ref())));
    }

    fn fail(&self, err: WeatherError) {
        self.notify(move |view| {
            view.on_progress_loading(false);
            if err.is_cache_miss() {
                view.on_db_empty();
            } else {
                view.on_error(&err);
            }
        });
    }
}

/// Handle to one running sync cycle.
#[derive(Debug)]
pub struct SyncCycle {
    id: u64,
    state: Arc<Mutex<JoinState>>,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncCycle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    /// Wait for all three fetch tasks, including siblings of a failed fetch,
    /// and return the terminal phase.
    pub async fn finished(self) -> Phase {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(cycle = self.id, "fetch task did not complete: {e}");
            }
        }

        self.state.lock().phase()
    }
}

/// Presenter logic: fetch, join, notify, persist.
pub struct WeatherSync {
    repository: WeatherRepository,
    notifier: Notifier,
    runtime: Handle,
    cycles: AtomicU64,
}

impl WeatherSync {
    pub fn new(
        repository: WeatherRepository,
        view: Arc<dyn WeatherView>,
        dispatcher: Arc<dyn Dispatcher>,
        runtime: Handle,
    ) -> Self {
        Self {
            repository,
            notifier: Notifier { view, dispatcher },
            runtime,
            cycles: AtomicU64::new(0),
        }
    }

    /// Start a sync cycle and return without waiting for it.
    pub fn get_weather(&self, request: FetchRequest) -> SyncCycle {
        let id = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let state = Arc::new(Mutex::new(JoinState::new(request.is_current_location)));
        let snapshot = Arc::new(CacheSnapshot::new());

        tracing::debug!(
            cycle = id,
            latitude = request.latitude,
            longitude = request.longitude,
            use_network = request.use_network,
            "starting weather sync"
        );

        self.notifier.notify(|view| view.on_progress_loading(true));

        let tasks = Granularity::ALL
            .into_iter()
            .map(|granularity| {
                self.spawn_fetch(id, granularity, request, Arc::clone(&state), Arc::clone(&snapshot))
            })
            .collect();

        SyncCycle { id, state, tasks }
    }

    /// Show one cached record without touching the network.
    pub fn get_weather_local(&self, location_key: &str) {
        match self.repository.get_local(location_key) {
            Ok(Some(record)) => self.notifier.notify(move |view| view.on_current_weather_success(&record)),
            Ok(None) => self.notifier.notify(|view| view.on_db_empty()),
            Err(err) => self.notifier.notify(move |view| view.on_error(&err)),
        }
    }

    pub fn load_cached_locations(&self) {
        match self.repository.all_local() {
            Ok(records) if records.is_empty() => self.notifier.notify(|view| view.on_db_empty()),
            Ok(records) => self.notifier.notify(move |view| view.on_cached_locations(&records)),
            Err(err) => self.notifier.notify(move |view| view.on_error(&err)),
        }
    }

    fn spawn_fetch(
        &self,
        cycle: u64,
        granularity: Granularity,
        request: FetchRequest,
        state: Arc<Mutex<JoinState>>,
        snapshot: Arc<CacheSnapshot>,
    ) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let notifier = self.notifier.clone();

        self.runtime.spawn(async move {
            let FetchRequest { latitude, longitude, use_network, .. } = request;

            let result = if use_network {
                match granularity {
                    Granularity::Current => repository
                        .fetch_current(latitude, longitude, true)
                        .await
                        .map(Arrival::Current),
                    Granularity::Hourly => repository
                        .fetch_hourly(latitude, longitude, true)
                        .await
                        .map(Arrival::Hourly),
                    Granularity::Daily => repository
                        .fetch_daily(latitude, longitude, true)
                        .await
                        .map(Arrival::Daily),
                }
            } else {
                snapshot
                    .get_or_init(|| async { repository.cached_record(latitude, longitude) })
                    .await
                    .as_ref()
                    .map(|record| Arrival::slice(record, granularity))
                    .map_err(Clone::clone)
            };

            if let Err(err) = &result {
                tracing::warn!(cycle, %granularity, "weather fetch failed: {err}");
            }

            let transition = state.lock().complete(result);

            match transition {
                Transition::Unchanged => {
                    tracing::debug!(cycle, %granularity, "fetch completed, cycle not terminal");
                }
                Transition::Failed(err) => notifier.fail(err),
                Transition::Ready(record) => {
                    tracing::info!(cycle, location = %record.location_key, "weather ready");

                    let shown = record.clone();
                    notifier.notify(move |view| {
                        view.on_progress_loading(false);
                        view.on_current_weather_success(&shown);
                    });

                    if let Err(err) = repository.insert(&record) {
                        tracing::warn!(cycle, location = %record.location_key, "failed to cache weather: {err}");
                    }
                }
            }
        })
    }
}
