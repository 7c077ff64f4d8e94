//! Debug module: feature gated run statistics and periodic logging.
//! Built only when compiled with `--features debug`.

#[cfg(feature = "debug")]
mod logging;
#[cfg(feature = "debug")]
pub mod stats;

#[cfg(feature = "debug")]
pub use stats::RunStats;

#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
pub struct DebugPlugin;
#[cfg(feature = "debug")]
impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        use crate::core::system::FlightSet;
        use logging::run_stats_logging_system;
        use stats::run_stats_collect_system;

        app.init_resource::<RunStats>().add_systems(
            Update,
            (run_stats_collect_system, run_stats_logging_system)
                .chain()
                .after(FlightSet::Mirror),
        );
    }
}

#[cfg(not(feature = "debug"))]
pub struct DebugPlugin;
#[cfg(not(feature = "debug"))]
impl bevy::prelude::Plugin for DebugPlugin {
    fn build(&self, _app: &mut bevy::prelude::App) {}
}
