use std::fs;

use theme_flight::core::config::FlightConfig;

#[test]
fn shipped_config_matches_defaults() {
    let cfg = FlightConfig::load_from_file("assets/config/flight.ron").expect("shipped config parses");
    assert_eq!(cfg, FlightConfig::default());
    assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
}

#[test]
fn local_layer_overrides_nested_keys_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = dir.path().join("flight.ron");
    let local = dir.path().join("flight.local.ron");
    fs::write(
        &base,
        r#"(
            window: (width: 800.0, height: 600.0, title: "Base", autoClose: 0.0),
            bats: (count: (desktop: 12, narrow: 8), gravity: 0.0005),
            toggle: (spawn_delay_ms: 50, block_while_animating: true),
        )"#,
    )
    .expect("write base");
    fs::write(
        &local,
        r#"(
            window: (title: "Local"),
            bats: (count: (desktop: 20)),
            toggle: (block_while_animating: false),
            rng_seed: Some(99),
        )"#,
    )
    .expect("write local");

    let (cfg, used, errors) = FlightConfig::load_layered([&base, &local]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(used.len(), 2);
    assert_eq!(cfg.window.title, "Local");
    assert_eq!(cfg.window.width, 800.0);
    assert_eq!(cfg.bats.count.desktop, 20);
    assert_eq!(cfg.bats.count.narrow, 8);
    assert_eq!(cfg.bats.gravity, 0.0005);
    assert_eq!(cfg.toggle.spawn_delay_ms, 50);
    assert!(!cfg.toggle.block_while_animating);
    assert_eq!(cfg.rng_seed, Some(99));
}

#[test]
fn missing_and_broken_layers_are_reported_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = dir.path().join("broken.ron");
    fs::write(&broken, "(window: (width: ").expect("write");
    let missing = dir.path().join("missing.ron");

    let (cfg, used, errors) = FlightConfig::load_layered([&missing, &broken]);
    assert!(used.is_empty());
    assert_eq!(errors.len(), 2);
    assert_eq!(cfg, FlightConfig::default());
}

#[test]
fn validation_flags_bad_values() {
    let mut cfg = FlightConfig::default();
    cfg.surface.near = 0.0;
    cfg.butterflies.max_age = 100;
    cfg.window.auto_close = -1.0;
    let warnings = cfg.validate();
    assert!(warnings.len() >= 3, "{warnings:?}");
}

#[test]
fn single_partial_layer_keeps_default_pair_halves() {
    let dir = tempfile::tempdir().expect("tempdir");
    let only = dir.path().join("only.ron");
    fs::write(&only, "(bats: (count: (desktop: 20), scale: (desktop: 3.0)))").expect("write");

    let (cfg, used, errors) = FlightConfig::load_layered([&only]);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(used.len(), 1);
    assert_eq!(cfg.bats.count.desktop, 20);
    assert_eq!(cfg.bats.count.narrow, 8);
    assert_eq!(cfg.bats.scale.desktop, 3.0);
    assert_eq!(cfg.bats.scale.narrow, 1.2);
    assert_eq!(cfg.butterflies, FlightConfig::default().butterflies);
    assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
}

#[test]
fn zero_scale_is_flagged() {
    let mut cfg = FlightConfig::default();
    cfg.bats.scale.narrow = 0.0;
    let warnings = cfg.validate();
    assert!(warnings.iter().any(|w| w.contains("bats.scale")), "{warnings:?}");
}
