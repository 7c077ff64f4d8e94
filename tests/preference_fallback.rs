use std::fs;

use theme_flight::core::config::PreferencesConfig;
use theme_flight::core::theme::Theme;
use theme_flight::preference::{FileStore, PreferenceStore, Preferences, SchemeSignal, THEME_KEY};

fn file_prefs(dir: &tempfile::TempDir, signal: SchemeSignal) -> (Preferences, std::path::PathBuf) {
    let path = dir.path().join("nested").join("preferences.ron");
    (Preferences::new(FileStore::new(&path), signal), path)
}

#[test]
fn missing_file_uses_signal_then_light() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (prefs, path) = file_prefs(&dir, SchemeSignal::fixed(true));
    assert_eq!(prefs.read(), Theme::Dark);
    assert!(!path.exists(), "reading must not create the file");

    let (prefs, _) = file_prefs(&dir, SchemeSignal::unavailable());
    assert_eq!(prefs.read(), Theme::Light);
}

#[test]
fn stored_choice_beats_signal_across_instances() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut prefs, path) = file_prefs(&dir, SchemeSignal::fixed(false));
    prefs.write(Theme::Dark);
    assert!(path.exists());

    // A later session with the opposite OS preference still sees the stored value.
    let (prefs, _) = file_prefs(&dir, SchemeSignal::fixed(false));
    assert_eq!(prefs.read(), Theme::Dark);
    let stored = FileStore::new(&path).get(THEME_KEY).expect("readable");
    assert_eq!(stored.as_deref(), Some("dark"));
}

#[test]
fn unrecognised_stored_value_resolves_light() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_, path) = file_prefs(&dir, SchemeSignal::fixed(true));
    let mut store = FileStore::new(&path);
    store.set(THEME_KEY, "sepia").expect("write");

    let prefs = Preferences::new(store, SchemeSignal::fixed(true));
    assert_eq!(prefs.read(), Theme::Light);
}

#[test]
fn corrupt_file_is_treated_as_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (prefs, path) = file_prefs(&dir, SchemeSignal::fixed(true));
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "{ this is not ron").expect("write");
    assert_eq!(prefs.read(), Theme::Dark);
}

#[test]
fn clear_forgets_choice_and_keeps_other_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (mut prefs, path) = file_prefs(&dir, SchemeSignal::unavailable());
    FileStore::new(&path).set("volume", "7").expect("write");
    prefs.write(Theme::Dark);
    prefs.clear();
    assert_eq!(prefs.read(), Theme::Light);
    let store = FileStore::new(&path);
    assert_eq!(store.get(THEME_KEY).expect("readable"), None);
    assert_eq!(store.get("volume").expect("readable").as_deref(), Some("7"));
}

#[test]
fn configured_path_and_signal_are_honoured() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prefs.ron");
    let cfg = PreferencesConfig {
        path: Some(path.to_string_lossy().into_owned()),
        prefers_dark: Some(true),
    };
    let mut prefs = Preferences::for_platform(&cfg);
    assert_eq!(prefs.read(), Theme::Dark);
    prefs.write(Theme::Light);
    assert!(path.exists());
    assert_eq!(Preferences::for_platform(&cfg).read(), Theme::Light);
}
