use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::core::viewport::PerViewport;

#[derive(Debug, Serialize, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Theme Flight".into(),
            auto_close: 0.0,
        }
    }
}

/// Camera and coordinate mapping of the render surface.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Vertical field of view.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_distance: f32,
    /// World units spanned by one NDC unit at the actor plane.
    pub world_extent: f32,
    pub narrow_breakpoint: f32,
}
impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_distance: 5.0,
            world_extent: 2.5,
            narrow_breakpoint: 768.0,
        }
    }
}

/// Bat explosion (entering Dark). Velocities are per frame, not per second.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BatConfig {
    pub count: PerViewport<usize>,
    pub scale: PerViewport<f32>,
    pub base_speed: PerViewport<f32>,
    pub speed_jitter: f32,
    pub lift: f32,
    pub z_jitter: f32,
    pub flap_step: f32,
    pub flap_amplitude: f32,
    pub gravity: f32,
    pub damping: f32,
    pub retire_radius: f32,
    pub frame_ceiling: u32,
}
impl Default for BatConfig {
    fn default() -> Self {
        Self {
            count: PerViewport::new(12, 8),
            scale: PerViewport::new(2.0, 1.2),
            base_speed: PerViewport::new(0.02, 0.015),
            speed_jitter: 0.03,
            lift: 0.01,
            z_jitter: 0.01,
            flap_step: 0.3,
            flap_amplitude: 0.4,
            gravity: 0.0005,
            damping: 0.995,
            retire_radius: 10.0,
            frame_ceiling: 600,
        }
    }
}

/// Butterfly drift (entering Light).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ButterflyConfig {
    pub count: PerViewport<usize>,
    pub scale: PerViewport<f32>,
    pub base_speed: PerViewport<f32>,
    pub speed_jitter: f32,
    pub angle_jitter: f32,
    pub lift: f32,
    pub z_jitter: f32,
    pub flutter_step: f32,
    pub flutter_frequency: f32,
    pub flutter_amplitude: f32,
    pub wander_x: f32,
    pub wander_y: f32,
    pub wander_y_frequency: f32,
    pub damping: f32,
    pub fade_start_age: u32,
    pub max_age: u32,
    pub retire_radius: f32,
    pub frame_ceiling: u32,
}
impl Default for ButterflyConfig {
    fn default() -> Self {
        Self {
            count: PerViewport::new(8, 12),
            scale: PerViewport::new(1.2, 0.8),
            base_speed: PerViewport::new(0.008, 0.006),
            speed_jitter: 0.012,
            angle_jitter: 0.5,
            lift: 0.015,
            z_jitter: 0.005,
            flutter_step: 0.08,
            flutter_frequency: 3.0,
            flutter_amplitude: 0.1,
            wander_x: 0.0002,
            wander_y: 0.0003,
            wander_y_frequency: 1.3,
            damping: 0.998,
            fade_start_age: 200,
            max_age: 400,
            retire_radius: 8.0,
            frame_ceiling: 800,
        }
    }
}
impl ButterflyConfig {
    /// Opacity lost per frame once fading; spans the whole fade window so
    /// opacity reaches zero exactly at `max_age`.
    pub fn fade_step(&self) -> f32 {
        let window = self.max_age.saturating_sub(self.fade_start_age).max(1);
        1.0 / window as f32
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ToggleConfig {
    pub spawn_delay_ms: u64,
    /// Ignore activations while an animation is in flight.
    pub block_while_animating: bool,
}
impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            spawn_delay_ms: 50,
            block_while_animating: true,
        }
    }
}
impl ToggleConfig {
    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Overrides the per-user preference file location.
    pub path: Option<String>,
    /// Replaces the OS colour-scheme signal.
    pub prefers_dark: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct FlightConfig {
    pub window: WindowConfig,
    pub surface: SurfaceConfig,
    pub bats: BatConfig,
    pub butterflies: ButterflyConfig,
    pub toggle: ToggleConfig,
    pub preferences: PreferencesConfig,
    pub rng_seed: Option<u64>,
    pub stats_log_interval: f32,
}
impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            window: Default::default(),
            surface: Default::default(),
            bats: Default::default(),
            butterflies: Default::default(),
            toggle: Default::default(),
            preferences: Default::default(),
            rng_seed: None,
            stats_log_interval: 2.0,
        }
    }
}

impl FlightConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }
    /// Merge RON layers in order over the built-in defaults (later keys win,
    /// maps merge recursively). Returns the config, the layers that were
    /// read, and per-layer errors.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = ron::to_string(&FlightConfig::default())
            .ok()
            .and_then(|txt| ron::from_str::<Value>(&txt).ok());
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut ron::value::Value, overlay: ron::value::Value) {
            use ron::value::Value;
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                if let Some(val) = incoming.take() {
                                    merge_value(ev, val);
                                }
                                break;
                            }
                        }
                        if let Some(val) = incoming {
                            bm.insert(k, val);
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        if used.is_empty() {
            return (FlightConfig::default(), used, errors);
        }
        if let Some(val) = merged {
            match val.into_rust::<FlightConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    let mut evec = errors;
                    evec.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (FlightConfig::default(), used, evec)
                }
            }
        } else {
            (FlightConfig::default(), used, errors)
        }
    }
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        }
        let s = &self.surface;
        if !(1.0..179.0).contains(&s.fov_degrees) {
            w.push(format!("surface.fov_degrees {} outside 1..179", s.fov_degrees));
        }
        if s.near <= 0.0 || s.far <= s.near {
            w.push(format!(
                "surface clip planes invalid (near {}, far {})",
                s.near, s.far
            ));
        }
        if s.narrow_breakpoint <= 0.0 {
            w.push("surface.narrow_breakpoint must be > 0".into());
        }
        fn check_damping(w: &mut Vec<String>, label: &str, d: f32) {
            if !(0.0..=1.0).contains(&d) {
                w.push(format!("{label}.damping {d} outside 0..1 -> actors accelerate"));
            }
        }
        fn check_counts(w: &mut Vec<String>, label: &str, c: &PerViewport<usize>) {
            if c.desktop == 0 || c.narrow == 0 {
                w.push(format!("{label}.count has a zero entry; nothing will spawn"));
            }
            if c.desktop > 512 || c.narrow > 512 {
                w.push(format!("{label}.count very high; frame time may suffer"));
            }
        }
        fn check_scale(w: &mut Vec<String>, label: &str, s: &PerViewport<f32>) {
            if s.desktop <= 0.0 || s.narrow <= 0.0 {
                w.push(format!("{label}.scale must be > 0; actors would be invisible"));
            }
        }
        let b = &self.bats;
        check_counts(&mut w, "bats", &b.count);
        check_scale(&mut w, "bats", &b.scale);
        check_damping(&mut w, "bats", b.damping);
        if b.retire_radius <= 0.0 {
            w.push("bats.retire_radius must be > 0".into());
        }
        if b.gravity <= 0.0 && b.damping >= 1.0 {
            w.push("bats have neither gravity nor damping; slow bats may never leave".into());
        }
        if b.frame_ceiling == 0 {
            w.push("bats.frame_ceiling is 0; runs end immediately".into());
        }
        let f = &self.butterflies;
        check_counts(&mut w, "butterflies", &f.count);
        check_scale(&mut w, "butterflies", &f.scale);
        check_damping(&mut w, "butterflies", f.damping);
        if f.retire_radius <= 0.0 {
            w.push("butterflies.retire_radius must be > 0".into());
        }
        if f.fade_start_age >= f.max_age {
            w.push(format!(
                "butterflies.fade_start_age {} >= max_age {}; no visible fade",
                f.fade_start_age, f.max_age
            ));
        }
        if f.max_age >= f.frame_ceiling {
            w.push(format!(
                "butterflies.max_age {} >= frame_ceiling {}; ceiling will cut the fade short",
                f.max_age, f.frame_ceiling
            ));
        }
        if self.toggle.spawn_delay_ms > 1000 {
            w.push(format!(
                "toggle.spawn_delay_ms {} very long; animation lags the theme change",
                self.toggle.spawn_delay_ms
            ));
        }
        if self.stats_log_interval <= 0.0 {
            w.push("stats_log_interval must be > 0".into());
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_clean() {
        let warnings = FlightConfig::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn default_fade_reaches_zero_at_max_age() {
        let f = ButterflyConfig::default();
        let frames = (f.max_age - f.fade_start_age) as f32;
        assert!((f.fade_step() * frames - 1.0).abs() < 1e-6);
    }

    #[test]
    fn partial_ron_keeps_other_defaults() {
        let cfg: FlightConfig = ron::from_str("(bats: (frame_ceiling: 90))").expect("parse");
        assert_eq!(cfg.bats.frame_ceiling, 90);
        assert_eq!(cfg.bats.count, PerViewport::new(12, 8));
        assert_eq!(cfg.butterflies, ButterflyConfig::default());
    }
}
