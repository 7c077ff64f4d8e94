use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;

use theme_flight::app::{ConfigDiagnostics, ThemeFlightPlugin};
use theme_flight::core::config::FlightConfig;
use theme_flight::preference::Preferences;

#[derive(Parser, Debug)]
#[command(name = "theme_flight", about = "Light/dark theme toggle with bat and butterfly flights")]
struct Cli {
    /// Config layers, merged in order (later wins).
    #[arg(long = "config", value_name = "PATH")]
    config: Vec<PathBuf>,
    /// Seed for launch jitter and butterfly colours.
    #[arg(long)]
    seed: Option<u64>,
    /// Override the OS colour-scheme signal.
    #[arg(long, value_name = "BOOL")]
    prefers_dark: Option<bool>,
    /// Preference file location.
    #[arg(long, value_name = "PATH")]
    preferences: Option<PathBuf>,
    /// Forget the stored theme before starting.
    #[arg(long)]
    reset_theme: bool,
    /// Exit after this many seconds (0 disables).
    #[arg(long, value_name = "SECS")]
    auto_close: Option<f32>,
}

fn default_layers() -> Vec<PathBuf> {
    vec![
        PathBuf::from("assets/config/flight.ron"),
        PathBuf::from("assets/config/flight.local.ron"),
    ]
}

#[cfg(target_arch = "wasm32")]
fn load_config(_layers: &[PathBuf]) -> (FlightConfig, ConfigDiagnostics) {
    const RAW: &str = include_str!("../assets/config/flight.ron");
    let mut diag = ConfigDiagnostics::default();
    let cfg = match ron::from_str(RAW) {
        Ok(cfg) => {
            diag.layers.push("embedded flight.ron".into());
            cfg
        }
        Err(e) => {
            diag.errors.push(format!("embedded flight.ron: {e}"));
            FlightConfig::default()
        }
    };
    (cfg, diag)
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(layers: &[PathBuf]) -> (FlightConfig, ConfigDiagnostics) {
    let (cfg, used, mut errors) = FlightConfig::load_layered(layers);
    // The local overlay is optional; its absence is not worth a warning.
    errors.retain(|e| !(e.contains("flight.local.ron") && e.contains("read error")));
    let diag = ConfigDiagnostics {
        layers: used,
        errors,
        warnings: Vec::new(),
    };
    (cfg, diag)
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
    }

    let cli = Cli::parse();
    let layers = if cli.config.is_empty() {
        default_layers()
    } else {
        cli.config.clone()
    };

    let (mut cfg, mut diag) = load_config(&layers);
    if let Some(seed) = cli.seed {
        cfg.rng_seed = Some(seed);
    }
    if let Some(dark) = cli.prefers_dark {
        cfg.preferences.prefers_dark = Some(dark);
    }
    if let Some(path) = &cli.preferences {
        cfg.preferences.path = Some(path.to_string_lossy().into_owned());
    }
    if let Some(secs) = cli.auto_close {
        cfg.window.auto_close = secs;
    }
    diag.warnings = cfg.validate();

    let mut prefs = Preferences::for_platform(&cfg.preferences);
    if cli.reset_theme {
        prefs.clear();
    }

    let mut app = App::new();
    app.insert_resource(cfg.clone())
        .insert_resource(diag)
        .insert_resource(prefs)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: cfg.window.title.clone(),
                resolution: (cfg.window.width, cfg.window.height).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }));

    #[cfg(not(target_arch = "wasm32"))]
    app.insert_resource(theme_flight::interaction::session::ConfigReloadSettings {
        paths: layers,
        ..default()
    });

    app.add_plugins(ThemeFlightPlugin).run();
}
