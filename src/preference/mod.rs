//! Theme preference persistence.
//!
//! Resolution order on read: stored value, then the OS/browser colour-scheme
//! signal, then Light. Absence is never an error; backend failures are logged
//! and treated as absence.

pub mod scheme;
pub mod store;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use scheme::SchemeSignal;
pub use store::{FileStore, MemoryStore, PreferenceStore, THEME_KEY};

use bevy::prelude::*;

use crate::core::config::PreferencesConfig;
use crate::core::theme::Theme;

#[derive(Resource)]
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
    signal: SchemeSignal,
}

impl Preferences {
    pub fn new(store: impl PreferenceStore, signal: SchemeSignal) -> Self {
        Self {
            store: Box::new(store),
            signal,
        }
    }

    /// Volatile store and no scheme signal; used by headless apps and tests.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), SchemeSignal::unavailable())
    }

    /// Platform store: a per-user RON file natively, `localStorage` on the web.
    pub fn for_platform(cfg: &PreferencesConfig) -> Self {
        let signal = match cfg.prefers_dark {
            Some(dark) => SchemeSignal::fixed(dark),
            None => SchemeSignal::detect(),
        };
        #[cfg(target_arch = "wasm32")]
        {
            let _ = &cfg.path;
            Self::new(web::LocalStorageStore, signal)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            let path = match &cfg.path {
                Some(p) => Ok(std::path::PathBuf::from(p)),
                None => FileStore::default_path(),
            };
            match path {
                Ok(path) => Self::new(FileStore::new(path), signal),
                Err(e) => {
                    warn!("preferences: {e:#}; theme will not persist across runs");
                    Self::new(MemoryStore::new(), signal)
                }
            }
        }
    }

    pub fn read(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            // An empty value is the same as nothing saved.
            Ok(Some(raw)) if raw.is_empty() => self.fallback(),
            Ok(Some(raw)) => match Theme::parse(&raw) {
                Some(theme) => theme,
                None => {
                    // A saved value that is not "dark" still counts as a saved choice.
                    warn!(value = %raw, "preferences: unrecognised stored theme, using light");
                    Theme::Light
                }
            },
            Ok(None) => self.fallback(),
            Err(e) => {
                warn!("preferences: read from {} failed: {e:#}", self.store.describe());
                self.fallback()
            }
        }
    }

    pub fn write(&mut self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            warn!("preferences: write to {} failed: {e:#}", self.store.describe());
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.store.remove(THEME_KEY) {
            warn!("preferences: clear on {} failed: {e:#}", self.store.describe());
        }
    }

    pub fn describe(&self) -> String {
        self.store.describe()
    }

    fn fallback(&self) -> Theme {
        self.signal
            .prefers_dark()
            .map(Theme::from_dark)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct BrokenStore;
    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }
        fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk on fire"))
        }
        fn remove(&mut self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk on fire"))
        }
        fn describe(&self) -> String {
            "broken".into()
        }
    }

    #[test]
    fn stored_value_wins_over_signal() {
        let prefs = Preferences::new(
            MemoryStore::with_entry(THEME_KEY, "light"),
            SchemeSignal::fixed(true),
        );
        assert_eq!(prefs.read(), Theme::Light);
    }

    #[test]
    fn signal_used_when_nothing_stored() {
        let prefs = Preferences::new(MemoryStore::new(), SchemeSignal::fixed(true));
        assert_eq!(prefs.read(), Theme::Dark);
    }

    #[test]
    fn light_when_nothing_known() {
        assert_eq!(Preferences::in_memory().read(), Theme::Light);
    }

    #[test]
    fn unrecognised_stored_value_is_light_even_if_os_prefers_dark() {
        let prefs = Preferences::new(
            MemoryStore::with_entry(THEME_KEY, "sepia"),
            SchemeSignal::fixed(true),
        );
        assert_eq!(prefs.read(), Theme::Light);
    }

    #[test]
    fn empty_stored_value_defers_to_signal() {
        let prefs = Preferences::new(MemoryStore::with_entry(THEME_KEY, ""), SchemeSignal::fixed(true));
        assert_eq!(prefs.read(), Theme::Dark);
    }

    #[test]
    fn padded_stored_value_is_not_a_theme() {
        let prefs = Preferences::new(
            MemoryStore::with_entry(THEME_KEY, " dark"),
            SchemeSignal::fixed(true),
        );
        assert_eq!(prefs.read(), Theme::Light);
    }

    #[test]
    fn broken_backend_falls_back_without_panicking() {
        let mut prefs = Preferences::new(BrokenStore, SchemeSignal::fixed(true));
        assert_eq!(prefs.read(), Theme::Dark);
        prefs.write(Theme::Light);
        prefs.clear();
    }

    #[test]
    fn write_then_read_and_clear() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::new(store.clone(), SchemeSignal::unavailable());
        prefs.write(Theme::Dark);
        assert_eq!(store.snapshot().get(THEME_KEY).map(String::as_str), Some("dark"));
        assert_eq!(prefs.read(), Theme::Dark);
        prefs.clear();
        assert!(store.snapshot().is_empty());
        assert_eq!(prefs.read(), Theme::Light);
    }
}
