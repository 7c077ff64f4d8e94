use bevy::prelude::*;

use crate::animation::{AnimationDriver, RunFinished, RunSummary};
use crate::rendering::surface::RenderSurface;

#[derive(Resource, Debug, Default)]
pub struct RunStats {
    pub frame_counter: u64,
    pub fps: f32,
    pub frame_time_ms: f32,
    pub live_actors: usize,
    pub scene_nodes: usize,
    pub presented_frames: u64,
    pub runs_finished: u64,
    pub last_run: Option<RunSummary>,
    pub time_accum: f32,
}

pub fn run_stats_collect_system(
    time: Res<Time>,
    driver: Res<AnimationDriver>,
    surface: Res<RenderSurface>,
    mut finished: EventReader<RunFinished>,
    mut stats: ResMut<RunStats>,
) {
    stats.frame_counter += 1;
    let dt = time.delta_secs().max(1e-6);
    let inst_fps = 1.0 / dt;
    stats.fps = if stats.fps == 0.0 {
        inst_fps
    } else {
        stats.fps * 0.9 + inst_fps * 0.1
    };
    let inst_ms = dt * 1000.0;
    stats.frame_time_ms = if stats.frame_time_ms == 0.0 {
        inst_ms
    } else {
        stats.frame_time_ms * 0.9 + inst_ms * 0.1
    };
    stats.live_actors = driver.live_count();
    stats.scene_nodes = surface.node_count();
    stats.presented_frames = surface.presented_frames();
    for RunFinished(summary) in finished.read() {
        stats.runs_finished += 1;
        stats.last_run = Some(*summary);
    }
    if stats.live_actors != stats.scene_nodes {
        warn!(
            live = stats.live_actors,
            nodes = stats.scene_nodes,
            "actor set and scene graph disagree"
        );
    }
}
