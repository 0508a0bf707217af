//! Durable state blob
//!
//! A single namespaced JSON blob holds the session and the riders and
//! reservations page filters. Entity caches are never written here.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::view::{ReservationsPageState, RidersPageState};

/// Schema version of the persisted blob
pub const STATE_VERSION: u32 = 1;

/// Key/value store for serialized state blobs
pub trait StateStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&self, key: &str, blob: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Storage backed by one JSON file mapping keys to blobs
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|e| Error::persistence(format!("{}: {}", self.path.display(), e)))?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&text)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::persistence(format!(
                "{}: expected a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::persistence(format!("{}: {}", parent.display(), e)))?;
            }
        }
        let text = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, text)
            .map_err(|e| Error::persistence(format!("{}: {}", self.path.display(), e)))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let map = self.read_all()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn store(&self, key: &str, blob: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every write
        let mut map = self.read_all().unwrap_or_default();
        map.insert(key.to_string(), Value::String(blob.to_string()));
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

/// In-process storage, used when no state path is configured
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn store(&self, key: &str, blob: &str) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.remove(key);
        Ok(())
    }
}

/// Whitelisted slices written to durable storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    #[serde(default)]
    pub auth: Session,
    #[serde(default, deserialize_with = "page_or_default")]
    pub riders: RidersPageState,
    #[serde(default, deserialize_with = "page_or_default")]
    pub reservations: ReservationsPageState,
}

/// A page slice that no longer validates falls back to its defaults
/// without taking the session down with it
fn page_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|err| {
        warn!("resetting invalid persisted page state: {}", err);
        T::default()
    }))
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            auth: Session::default(),
            riders: RidersPageState::default(),
            reservations: ReservationsPageState::default(),
        }
    }
}

/// Reads and writes the persisted blob under one key
///
/// Writes are read-modify-write of the whole blob so that each slice can
/// be saved on its own.
#[derive(Clone)]
pub struct Persistor {
    storage: Arc<dyn StateStorage>,
    key: String,
    state: Arc<Mutex<PersistedState>>,
}

impl fmt::Debug for Persistor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistor").field("key", &self.key).finish()
    }
}

impl Persistor {
    pub fn new(storage: Arc<dyn StateStorage>, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
            state: Arc::new(Mutex::new(PersistedState::default())),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the blob, falling back to empty state when it is missing,
    /// unreadable or from another schema version
    pub fn rehydrate(&self) -> PersistedState {
        let restored = match self.storage.load(&self.key) {
            Ok(Some(blob)) => match serde_json::from_str::<PersistedState>(&blob) {
                Ok(state) if state.version == STATE_VERSION => {
                    debug!("rehydrated persisted state from {}", self.key);
                    state
                }
                Ok(state) => {
                    warn!(
                        "discarding persisted state {}: version {} != {}",
                        self.key, state.version, STATE_VERSION
                    );
                    PersistedState::default()
                }
                Err(err) => {
                    warn!("discarding corrupt persisted state {}: {}", self.key, err);
                    PersistedState::default()
                }
            },
            Ok(None) => PersistedState::default(),
            Err(err) => {
                warn!("could not read persisted state {}: {}", self.key, err);
                PersistedState::default()
            }
        };
        *self.lock() = restored.clone();
        restored
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.update(|state| state.auth = session.clone())
    }

    pub fn save_riders(&self, riders: &RidersPageState) -> Result<()> {
        self.update(|state| state.riders = riders.clone())
    }

    pub fn save_reservations(&self, reservations: &ReservationsPageState) -> Result<()> {
        self.update(|state| state.reservations = reservations.clone())
    }

    /// Drop the blob entirely
    pub fn purge(&self) -> Result<()> {
        *self.lock() = PersistedState::default();
        self.storage.remove(&self.key)
    }

    fn update(&self, apply: impl FnOnce(&mut PersistedState)) -> Result<()> {
        let blob = {
            let mut state = self.lock();
            apply(&mut state);
            serde_json::to_string(&*state)?
        };
        self.storage.store(&self.key, &blob)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PersistedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionUser;
    use crate::view::{DateFilter, SortOrder};
    use tempfile::TempDir;

    fn signed_in() -> Session {
        let mut session = Session::default();
        session.set_credentials(
            SessionUser {
                id: "7".to_string(),
                email: "ops@karnue.test".to_string(),
                full_name: "Ops".to_string(),
            },
            "tok".to_string(),
            Some("ref".to_string()),
        );
        session
    }

    #[test]
    fn test_file_round_trip_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("karnue.json");

        let persistor = Persistor::new(Arc::new(FileStorage::new(&path)), "karnue_admin");
        let mut riders = RidersPageState::default();
        riders.set_search_query("ann");
        riders.set_sort_order(SortOrder::Desc);
        let mut reservations = ReservationsPageState::default();
        reservations.set_date_filter(DateFilter::Week);

        persistor.save_session(&signed_in()).unwrap();
        persistor.save_riders(&riders).unwrap();
        persistor.save_reservations(&reservations).unwrap();

        let reopened = Persistor::new(Arc::new(FileStorage::new(&path)), "karnue_admin");
        let state = reopened.rehydrate();
        assert!(state.auth.is_authenticated());
        assert_eq!(state.riders.filters.search_query(), "ann");
        assert_eq!(state.reservations.date_filter(), DateFilter::Week);
    }

    #[test]
    fn test_transient_fields_not_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let persistor = Persistor::new(storage.clone(), "k");
        let mut session = signed_in();
        session.login_pending();
        session.login_rejected("nope");
        persistor.save_session(&session).unwrap();

        let blob = storage.load("k").unwrap().unwrap();
        assert!(!blob.contains("isLoading"));
        assert!(!blob.contains("nope"));

        let restored = Persistor::new(storage, "k").rehydrate();
        assert!(!restored.auth.is_loading);
        assert_eq!(restored.auth.error, None);
    }

    #[test]
    fn test_incompatible_blob_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .store("k", r#"{"version":99,"auth":{"token":"old"}}"#)
            .unwrap();
        let state = Persistor::new(storage.clone(), "k").rehydrate();
        assert_eq!(state, PersistedState::default());

        storage.store("k", "not json").unwrap();
        let state = Persistor::new(storage, "k").rehydrate();
        assert_eq!(state, PersistedState::default());
    }

    #[test]
    fn test_invalid_page_state_falls_back_to_defaults() {
        let mut reservations = ReservationsPageState::default();
        reservations.set_date_filter(DateFilter::Today);
        let state = PersistedState {
            auth: signed_in(),
            reservations,
            ..PersistedState::default()
        };
        let mut blob = serde_json::to_value(&state).unwrap();
        blob["riders"]["filters"]["currentPage"] = 0.into();
        blob["riders"]["filters"]["itemsPerPage"] = 0.into();

        let storage = Arc::new(MemoryStorage::new());
        storage.store("k", &blob.to_string()).unwrap();
        let restored = Persistor::new(storage, "k").rehydrate();

        assert!(restored.auth.is_authenticated());
        assert_eq!(restored.riders, RidersPageState::default());
        assert_eq!(restored.riders.filters.current_page(), 1);
        assert!(restored.riders.filters.items_per_page() > 0);
        assert_eq!(restored.reservations.date_filter(), DateFilter::Today);
    }

    #[test]
    fn test_purge() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path().join("s.json")));
        let persistor = Persistor::new(storage.clone(), "k");
        persistor.save_session(&signed_in()).unwrap();
        storage.store("other", "keep").unwrap();

        persistor.purge().unwrap();
        assert_eq!(storage.load("k").unwrap(), None);
        assert_eq!(storage.load("other").unwrap().as_deref(), Some("keep"));
    }
}
