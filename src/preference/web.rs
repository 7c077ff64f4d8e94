//! Browser backends: `localStorage` and `matchMedia`.

use anyhow::{anyhow, Result};
use web_sys::Storage;

use super::store::PreferenceStore;

/// Handles are looked up per call; `web_sys` objects are not `Send`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

fn storage() -> Result<Storage> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no window"))?;
    window
        .local_storage()
        .map_err(|e| anyhow!("localStorage unavailable: {e:?}"))?
        .ok_or_else(|| anyhow!("localStorage disabled"))
}

impl PreferenceStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        storage()?
            .get_item(key)
            .map_err(|e| anyhow!("localStorage.getItem({key}): {e:?}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        storage()?
            .set_item(key, value)
            .map_err(|e| anyhow!("localStorage.setItem({key}): {e:?}"))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        storage()?
            .remove_item(key)
            .map_err(|e| anyhow!("localStorage.removeItem({key}): {e:?}"))
    }

    fn describe(&self) -> String {
        "localStorage".into()
    }
}

pub fn prefers_dark() -> Option<bool> {
    let window = web_sys::window()?;
    let query = window
        .match_media("(prefers-color-scheme: dark)")
        .ok()??;
    Some(query.matches())
}

/// Mirror the theme onto `<html>` for the page stylesheet.
pub fn mark_document(class_name: &str, data_theme: &str) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    root.set_class_name(class_name);
    let _ = root.set_attribute("data-theme", data_theme);
}
