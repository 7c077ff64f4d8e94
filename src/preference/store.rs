use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Key under which the theme is persisted.
pub const THEME_KEY: &str = "theme";

/// Persistent string key-value storage, shaped like browser `localStorage`.
pub trait PreferenceStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    /// Human readable location for logs.
    fn describe(&self) -> String;
}

/// RON map on disk, one file per user.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/theme_flight/preferences.ron`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("no per-user config directory on this platform")?;
        Ok(base.join("theme_flight").join("preferences.ron"))
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        ron::from_str(&text).with_context(|| format!("parse {}", self.path.display()))
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let text = ron::ser::to_string_pretty(map, ron::ser::PrettyConfig::default())
            .context("serialize preferences")?;
        std::fs::write(&self.path, text).with_context(|| format!("write {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Process-local store. Clones share the same map, so a test can keep a handle
/// after moving the store into [`super::Preferences`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut map) = store.entries.lock() {
            map.insert(key.to_string(), value.to_string());
        }
        store
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut map = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut map = self.entries.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        map.remove(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_keeps_other_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("prefs.ron");
        let mut store = FileStore::new(&path);
        assert_eq!(store.get(THEME_KEY).expect("get"), None);

        store.set("other", "kept").expect("set other");
        store.set(THEME_KEY, "dark").expect("set theme");
        assert_eq!(store.get(THEME_KEY).expect("get").as_deref(), Some("dark"));

        store.remove(THEME_KEY).expect("remove");
        assert_eq!(store.get(THEME_KEY).expect("get"), None);
        assert_eq!(store.get("other").expect("get").as_deref(), Some("kept"));
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("prefs.ron");
        std::fs::write(&path, "{ this is not ron").expect("write");
        let store = FileStore::new(&path);
        let err = store.get(THEME_KEY).expect_err("corrupt file must error");
        assert!(format!("{err:#}").contains("parse"));
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.set(THEME_KEY, "light").expect("set");
        assert_eq!(store.snapshot().get(THEME_KEY).map(String::as_str), Some("light"));
    }
}
