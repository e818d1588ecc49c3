//! Persisted user preferences.
//!
//! `PreferencesStore` is created once at startup and handed to whoever needs
//! it by reference. Every mutation takes effect in memory first and is then
//! written through to a [`KeyValueStorage`]; write failures are logged and
//! otherwise ignored so the session keeps the new value.

use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::{
    config::project_dirs,
    error::StorageError,
    model::{Preferences, TemperatureUnit, ThemeMode},
};

pub const UNIT_KEY: &str = "temperatureUnit";
pub const THEME_KEY: &str = "themeMode";
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

pub const MAX_RECENT_SEARCHES: usize = 5;

/// String-keyed durable storage.
pub trait KeyValueStorage: Send + Debug {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, read once on open and rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens `preferences.json` in the platform data directory.
    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = project_dirs()?;
        Ok(Self::open(dirs.data_dir().join("preferences.json")))
    }

    /// Opens the file at `path`. A missing or unreadable file opens empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "preferences file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read preferences file");
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Owner of the process-wide [`Preferences`].
#[derive(Debug)]
pub struct PreferencesStore {
    prefs: Preferences,
    storage: Box<dyn KeyValueStorage>,
}

impl PreferencesStore {
    /// Reads every key independently; anything missing or malformed falls
    /// back to its default.
    pub fn load(storage: Box<dyn KeyValueStorage>) -> Self {
        let temperature_unit: TemperatureUnit =
            read_or_default(storage.as_ref(), UNIT_KEY, |raw| raw.parse().ok());
        let theme_mode: ThemeMode =
            read_or_default(storage.as_ref(), THEME_KEY, |raw| raw.parse().ok());
        let recent_searches = read_or_default(storage.as_ref(), RECENT_SEARCHES_KEY, |raw| {
            serde_json::from_str::<Vec<String>>(raw).ok().map(normalize_history)
        });

        Self {
            prefs: Preferences { temperature_unit, theme_mode, recent_searches },
            storage,
        }
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.prefs.temperature_unit = unit;
        self.persist(UNIT_KEY, unit.as_str());
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.prefs.theme_mode = theme;
        self.persist(THEME_KEY, theme.as_str());
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        let next = self.prefs.theme_mode.toggled();
        self.set_theme(next);
        next
    }

    /// Prepends `name`, dropping any case-insensitive duplicate. The newest
    /// spelling wins.
    pub fn add_recent_search(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }

        let lowered = name.to_lowercase();
        let history = &mut self.prefs.recent_searches;
        history.retain(|existing| existing.to_lowercase() != lowered);
        history.insert(0, name.to_string());
        history.truncate(MAX_RECENT_SEARCHES);

        self.persist_history();
    }

    pub fn clear_recent_searches(&mut self) {
        self.prefs.recent_searches.clear();
        self.persist_history();
    }

    fn persist_history(&mut self) {
        match serde_json::to_string(&self.prefs.recent_searches) {
            Ok(json) => self.persist(RECENT_SEARCHES_KEY, &json),
            Err(e) => warn!(error = %e, "failed to serialize recent searches"),
        }
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            warn!(key, error = %e, "failed to persist preference; keeping it for this session only");
        }
    }
}

fn read_or_default<T: Default>(
    storage: &dyn KeyValueStorage,
    key: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> T {
    let Some(raw) = storage.get(key) else {
        return T::default();
    };

    parse(&raw).unwrap_or_else(|| {
        debug!(key, value = %raw, "ignoring malformed stored preference");
        T::default()
    })
}

/// Re-applies the dedup and cap rules to a list read from storage.
fn normalize_history(stored: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    let mut history = Vec::new();
    for entry in stored {
        let trimmed = entry.trim();
        let lowered = trimmed.to_lowercase();
        if trimmed.is_empty() || seen.contains(&lowered) {
            continue;
        }
        seen.push(lowered);
        history.push(trimmed.to_string());
        if history.len() == MAX_RECENT_SEARCHES {
            break;
        }
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Storage whose writes always fail, recording the attempted keys.
    #[derive(Debug, Default)]
    struct FailingStorage {
        attempts: Arc<Mutex<Vec<String>>>,
    }

    impl KeyValueStorage for FailingStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            self.attempts.lock().unwrap().push(key.to_string());
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    fn memory_store() -> PreferencesStore {
        PreferencesStore::load(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn empty_storage_yields_defaults() {
        let store = memory_store();
        assert_eq!(*store.get(), Preferences::default());
        assert_eq!(store.get().temperature_unit, TemperatureUnit::Celsius);
        assert_eq!(store.get().theme_mode, ThemeMode::Light);
    }

    #[test]
    fn malformed_values_fall_back_per_key() {
        let mut storage = MemoryStorage::new();
        storage.set(UNIT_KEY, "F").unwrap();
        storage.set(THEME_KEY, "purple").unwrap();
        storage.set(RECENT_SEARCHES_KEY, "{not json").unwrap();

        let store = PreferencesStore::load(Box::new(storage));
        assert_eq!(store.get().temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(store.get().theme_mode, ThemeMode::Light);
        assert!(store.get().recent_searches.is_empty());
    }

    #[test]
    fn duplicate_search_keeps_latest_casing() {
        let mut store = memory_store();
        store.add_recent_search("Paris");
        store.add_recent_search("paris");

        assert_eq!(store.get().recent_searches, vec!["paris".to_string()]);
    }

    #[test]
    fn repeated_search_moves_to_front() {
        let mut store = memory_store();
        for city in ["Oslo", "Rome", "Lima"] {
            store.add_recent_search(city);
        }
        store.add_recent_search("ROME");

        assert_eq!(store.get().recent_searches, vec!["ROME", "Lima", "Oslo"]);
    }

    #[test]
    fn history_is_capped_at_five_most_recent() {
        let mut store = memory_store();
        for city in ["A", "B", "C", "D", "E", "F"] {
            store.add_recent_search(city);
        }

        assert_eq!(store.get().recent_searches, vec!["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut store = memory_store();
        store.add_recent_search("   ");
        assert!(store.get().recent_searches.is_empty());
    }

    #[test]
    fn clear_empties_history() {
        let mut store = memory_store();
        store.add_recent_search("Tokyo");
        store.clear_recent_searches();
        assert!(store.get().recent_searches.is_empty());
    }

    #[test]
    fn write_failures_keep_session_value() {
        let storage = FailingStorage::default();
        let attempts = storage.attempts.clone();
        let mut store = PreferencesStore::load(Box::new(storage));

        store.set_unit(TemperatureUnit::Fahrenheit);
        store.set_theme(ThemeMode::Dark);
        store.add_recent_search("Cairo");

        assert_eq!(store.get().temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(store.get().theme_mode, ThemeMode::Dark);
        assert_eq!(store.get().recent_searches, vec!["Cairo"]);
        assert_eq!(*attempts.lock().unwrap(), vec![UNIT_KEY, THEME_KEY, RECENT_SEARCHES_KEY]);
    }

    #[test]
    fn stored_history_is_normalized_on_load() {
        let mut storage = MemoryStorage::new();
        storage
            .set(RECENT_SEARCHES_KEY, r#"["Berlin","berlin"," ","A","B","C","D","E"]"#)
            .unwrap();

        let store = PreferencesStore::load(Box::new(storage));
        assert_eq!(store.get().recent_searches, vec!["Berlin", "A", "B", "C", "D"]);
    }

    #[test]
    fn file_storage_persists_across_reopen() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("prefs").join("preferences.json");

        let mut store = PreferencesStore::load(Box::new(FileStorage::open(&path)));
        store.set_unit(TemperatureUnit::Fahrenheit);
        assert_eq!(store.toggle_theme(), ThemeMode::Dark);
        store.add_recent_search("Madrid");
        store.add_recent_search("Lisbon");
        drop(store);

        let reopened = PreferencesStore::load(Box::new(FileStorage::open(&path)));
        assert_eq!(reopened.get().temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(reopened.get().theme_mode, ThemeMode::Dark);
        assert_eq!(reopened.get().recent_searches, vec!["Lisbon", "Madrid"]);
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json at all").expect("write");

        let storage = FileStorage::open(&path);
        assert!(storage.get(UNIT_KEY).is_none());

        let store = PreferencesStore::load(Box::new(storage));
        assert_eq!(*store.get(), Preferences::default());
    }
}
