//! Local weather cache keyed by location key (city + country).
//!
//! Writes are last-write-wins per key; there is no versioning.

use haversine::{Location as HaversineLocation, Units, distance};
use parking_lot::RwLock;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{WeatherError, model::WeatherRecord};

pub trait LocalStore: Send + Sync {
    fn get(&self, location_key: &str) -> Result<Option<WeatherRecord>, WeatherError>;

    /// Insert or overwrite the record stored under its location key.
    fn put(&self, record: &WeatherRecord) -> Result<(), WeatherError>;

    fn all(&self) -> Result<Vec<WeatherRecord>, WeatherError>;

    /// Closest cached record within `radius_km` of the given coordinates.
    fn nearest(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Option<WeatherRecord>, WeatherError> {
        let closest = self
            .all()?
            .into_iter()
            .map(|record| {
                let dist_km = distance(
                    HaversineLocation { latitude, longitude },
                    HaversineLocation {
                        latitude: record.place.latitude,
                        longitude: record.place.longitude,
                    },
                    Units::Kilometers,
                );
                (record, dist_km)
            })
            .filter(|(_, dist_km)| *dist_km <= radius_km)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(record, _)| record);

        Ok(closest)
    }
}

/// In-process store; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, WeatherRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, location_key: &str) -> Result<Option<WeatherRecord>, WeatherError> {
        Ok(self.records.read().get(location_key).cloned())
    }

    fn put(&self, record: &WeatherRecord) -> Result<(), WeatherError> {
        self.records.write().insert(record.location_key.clone(), record.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<WeatherRecord>, WeatherError> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.location_key.cmp(&b.location_key));
        Ok(records)
    }
}

/// Store persisted as a single JSON document.
///
/// The whole map is kept in memory and rewritten on every `put`, through a
/// temporary sibling file that is renamed over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: RwLock<HashMap<String, WeatherRecord>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WeatherError> {
        let path = path.into();

        let records = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                WeatherError::Storage(format!("failed to read {}: {e}", path.display()))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                WeatherError::Storage(format!("failed to parse {}: {e}", path.display()))
            })?
        } else {
            HashMap::new()
        };

        Ok(Self { path, records: RwLock::new(records) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, records: &HashMap<String, WeatherRecord>) -> Result<(), WeatherError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                WeatherError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| WeatherError::Storage(format!("failed to serialize cache: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| WeatherError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            WeatherError::Storage(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}

impl LocalStore for JsonFileStore {
    fn get(&self, location_key: &str) -> Result<Option<WeatherRecord>, WeatherError> {
        Ok(self.records.read().get(location_key).cloned())
    }

    fn put(&self, record: &WeatherRecord) -> Result<(), WeatherError> {
        // Hold the write lock across the file write so concurrent puts serialize.
        // The map only changes once the file has been replaced.
        let mut records = self.records.write();
        let mut next = records.clone();
        next.insert(record.location_key.clone(), record.clone());
        self.write_file(&next)?;
        *records = next;
        Ok(())
    }

    fn all(&self) -> Result<Vec<WeatherRecord>, WeatherError> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.location_key.cmp(&b.location_key));
        Ok(records)
    }
}
