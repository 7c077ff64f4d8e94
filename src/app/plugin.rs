// This file is part of Theme Flight.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::animation::AnimationPlugin;
use crate::core::config::FlightConfig;
use crate::core::system::FlightSet;
use crate::debug::DebugPlugin;
use crate::interaction::session::{ConfigHotReloadPlugin, SessionDeadlinePlugin};
use crate::interaction::InteractionPlugin;
use crate::preference::Preferences;
use crate::rendering::RenderingPlugin;

/// Everything except windowing/rendering backends: add after `DefaultPlugins`
/// (or `MinimalPlugins` for headless use). Inserts defaults for
/// `FlightConfig` and an in-memory `Preferences` when the app has none.
pub struct ThemeFlightPlugin;

impl Plugin for ThemeFlightPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Preferences>() {
            app.insert_resource(Preferences::in_memory());
        }
        app.init_resource::<FlightConfig>()
            .configure_sets(
                Update,
                (FlightSet::Input, FlightSet::Animate, FlightSet::Mirror).chain(),
            )
            .add_systems(Startup, log_config_diagnostics)
            .add_plugins((
                RenderingPlugin,
                AnimationPlugin,
                InteractionPlugin,
                DebugPlugin,
                ConfigHotReloadPlugin,
                SessionDeadlinePlugin,
            ));
    }
}

/// Startup notes collected before logging was up (config layers, validation).
#[derive(Resource, Debug, Default, Clone)]
pub struct ConfigDiagnostics {
    pub layers: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigDiagnostics {
    pub fn log(&self) {
        for e in &self.errors {
            warn!("config load issue: {e}");
        }
        for w in &self.warnings {
            warn!("config warning: {w}");
        }
        if self.layers.is_empty() {
            info!("no config layers found; using defaults");
        } else {
            info!(layers = ?self.layers, "config layers loaded");
        }
    }
}

pub fn log_config_diagnostics(diag: Option<Res<ConfigDiagnostics>>, cfg: Res<FlightConfig>) {
    if let Some(diag) = diag {
        diag.log();
    }
    info!(?cfg.window, "window config");
    info!(
        seed = ?cfg.rng_seed,
        spawn_delay_ms = cfg.toggle.spawn_delay_ms,
        block_while_animating = cfg.toggle.block_while_animating,
        "runtime summary"
    );
}
