use bevy::prelude::*;
use std::{collections::HashMap, path::PathBuf, time::Duration, time::SystemTime};

use crate::animation::driver::{AnimationDriver, DriverTuning};
use crate::core::config::FlightConfig;

/// Config layers to watch; set by `main` to the same list it loaded from.
#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings {
    pub paths: Vec<PathBuf>,
    pub interval_secs: f32,
}

impl Default for ConfigReloadSettings {
    fn default() -> Self {
        Self {
            paths: vec![
                PathBuf::from("assets/config/flight.ron"),
                PathBuf::from("assets/config/flight.local.ron"),
            ],
            interval_secs: 0.5,
        }
    }
}

#[derive(Resource, Debug)]
struct ConfigReloadState {
    last_mod: HashMap<PathBuf, SystemTime>,
    timer: Timer,
}

impl FromWorld for ConfigReloadState {
    fn from_world(world: &mut World) -> Self {
        let interval = world
            .get_resource::<ConfigReloadSettings>()
            .map_or(0.5, |s| s.interval_secs)
            .max(0.05);
        let mut last_mod = HashMap::new();
        // Seed with current mtimes so startup does not count as a change.
        if let Some(settings) = world.get_resource::<ConfigReloadSettings>() {
            for path in &settings.paths {
                if let Some(t) = modified(path) {
                    last_mod.insert(path.clone(), t);
                }
            }
        }
        Self {
            last_mod,
            timer: Timer::from_seconds(interval, TimerMode::Repeating),
        }
    }
}

fn modified(path: &std::path::Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Native only: polls the config layers and re-applies them while running.
/// Window size/title and animation tuning follow the file; tuning changes
/// take effect from the next spawn.
pub struct ConfigHotReloadPlugin;

impl Plugin for ConfigHotReloadPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            app.init_resource::<ConfigReloadSettings>()
                .init_resource::<ConfigReloadState>()
                .add_systems(Update, poll_and_reload_config);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = app;
    }
}

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    mut cfg_res: ResMut<FlightConfig>,
    mut driver: ResMut<AnimationDriver>,
    mut windows: Query<&mut Window>,
) {
    let wanted = Duration::from_secs_f32(settings.interval_secs.max(0.05));
    if state.timer.duration() != wanted {
        state.timer.set_duration(wanted);
    }
    if !state.timer.tick(time.delta()).finished() {
        return;
    }

    let mut dirty = false;
    for path in &settings.paths {
        let Some(mod_time) = modified(path) else {
            continue;
        };
        let entry = state
            .last_mod
            .entry(path.clone())
            .or_insert(SystemTime::UNIX_EPOCH);
        if mod_time > *entry {
            *entry = mod_time;
            dirty = true;
        }
    }
    if !dirty {
        return;
    }

    let (mut new_cfg, _used, errors) = FlightConfig::load_layered(settings.paths.iter());
    for e in errors {
        warn!("config hot-reload: {e}");
    }
    // Seed and preference sources are fixed for the session.
    new_cfg.rng_seed = cfg_res.rng_seed;
    new_cfg.preferences = cfg_res.preferences.clone();
    if *cfg_res == new_cfg {
        return;
    }
    for w in new_cfg.validate() {
        warn!("config hot-reload: {w}");
    }

    info!("config hot-reload applied");
    if let Ok(mut window) = windows.single_mut() {
        if window.width() != new_cfg.window.width || window.height() != new_cfg.window.height {
            window
                .resolution
                .set(new_cfg.window.width, new_cfg.window.height);
        }
        if window.title != new_cfg.window.title {
            window.title = new_cfg.window.title.clone();
        }
    }
    driver.retune(DriverTuning::from(&new_cfg));
    *cfg_res = new_cfg;
}
