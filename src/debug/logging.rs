use bevy::prelude::*;

use super::stats::RunStats;
use crate::animation::AnimationDriver;
use crate::core::config::FlightConfig;

pub fn run_stats_logging_system(
    time: Res<Time>,
    cfg: Res<FlightConfig>,
    driver: Res<AnimationDriver>,
    mut stats: ResMut<RunStats>,
) {
    stats.time_accum += time.delta_secs();
    if stats.time_accum < cfg.stats_log_interval.max(0.1) {
        return;
    }
    stats.time_accum = 0.0;
    info!(
        "FLIGHT frame={} t={:.3}s fps={:.1} ft_ms={:.1} phase={:?} run={:?} live={} nodes={} presented={} finished={} last={:?}",
        stats.frame_counter,
        time.elapsed_secs(),
        stats.fps,
        stats.frame_time_ms,
        driver.phase(),
        driver.current_run(),
        stats.live_actors,
        stats.scene_nodes,
        stats.presented_frames,
        stats.runs_finished,
        stats.last_run.map(|r| (r.mode, r.frames, r.reason)),
    );
}
