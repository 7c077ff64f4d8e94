//! Animation driver: one spawn batch plus its per-frame integration loop.
//!
//! Phases: `Idle -> Spawning -> Running -> Idle`. A new request preempts any
//! run in flight: its token is cancelled and every actor is detached from the
//! surface before the new run starts spawning. Each frame is ticked through a
//! [`ScheduledFrame`]; a frame whose token was cancelled is a no-op.
//!
//! The active actor set and the surface scene graph are kept in lockstep:
//! every attach/detach happens next to the matching push/remove here.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{PI, TAU};
use std::time::Duration;

use super::actor::{Actor, ActorId, ActorKind, Rig};
use super::factory::ParticleFactory;
use super::frame::{CancelToken, RunId, ScheduledFrame};
use crate::core::config::{BatConfig, ButterflyConfig, FlightConfig};
use crate::core::theme::Theme;
use crate::core::viewport::Viewport;
use crate::rendering::surface::RenderSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    /// Bat explosion, played when entering Dark.
    Bats,
    /// Butterfly drift, played when entering Light.
    Butterflies,
}

impl AnimationMode {
    /// Chosen by the theme being entered, never the one being left.
    pub fn entering(theme: Theme) -> Self {
        match theme {
            Theme::Dark => AnimationMode::Bats,
            Theme::Light => AnimationMode::Butterflies,
        }
    }

    pub fn actor_kind(self) -> ActorKind {
        match self {
            AnimationMode::Bats => ActorKind::Bat,
            AnimationMode::Butterflies => ActorKind::Butterfly,
        }
    }
}

/// Everything needed to start a run. `origin` is already in surface space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchRequest {
    pub mode: AnimationMode,
    pub origin: Vec3,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverPhase {
    Idle,
    Spawning { remaining: Duration },
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Every actor retired on its own.
    Drained,
    /// Safety bound hit; remaining actors were retired.
    FrameCeiling,
    /// The surface was unmounted mid-run.
    SurfaceLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub run: RunId,
    pub mode: AnimationMode,
    pub frames: u32,
    pub spawned: usize,
    pub retired: usize,
    pub faulted: usize,
    pub reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Cancelled or superseded frame; nothing happened.
    Stale,
    /// Still inside the spawn delay.
    Waiting,
    Advanced { frame: u32, live: usize },
    Finished(RunSummary),
}

/// Per-mode constants, snapshotted from [`FlightConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct DriverTuning {
    pub bats: BatConfig,
    pub butterflies: ButterflyConfig,
    pub spawn_delay: Duration,
    pub narrow_breakpoint: f32,
}

impl From<&FlightConfig> for DriverTuning {
    fn from(cfg: &FlightConfig) -> Self {
        Self {
            bats: cfg.bats.clone(),
            butterflies: cfg.butterflies.clone(),
            spawn_delay: cfg.toggle.spawn_delay(),
            narrow_breakpoint: cfg.surface.narrow_breakpoint,
        }
    }
}

impl DriverTuning {
    fn frame_ceiling(&self, mode: AnimationMode) -> u32 {
        match mode {
            AnimationMode::Bats => self.bats.frame_ceiling,
            AnimationMode::Butterflies => self.butterflies.frame_ceiling,
        }
    }
}

#[derive(Debug)]
struct AnimationRun {
    id: RunId,
    request: LaunchRequest,
    token: CancelToken,
    frame: u32,
    actors: Vec<Actor>,
    spawned: usize,
    retired: usize,
    faulted: usize,
}

impl AnimationRun {
    fn summary(&self, reason: FinishReason) -> RunSummary {
        RunSummary {
            run: self.id,
            mode: self.request.mode,
            frames: self.frame,
            spawned: self.spawned,
            retired: self.retired,
            faulted: self.faulted,
            reason,
        }
    }
}

enum StepOutcome {
    Alive,
    Retire,
    Fault,
}

#[derive(Resource, Debug)]
pub struct AnimationDriver {
    tuning: DriverTuning,
    phase: DriverPhase,
    run: Option<AnimationRun>,
    scheduled: Option<ScheduledFrame>,
    next_run: u64,
    next_actor: u64,
}

impl FromWorld for AnimationDriver {
    fn from_world(world: &mut World) -> Self {
        let cfg = world
            .get_resource::<FlightConfig>()
            .cloned()
            .unwrap_or_default();
        Self::new(DriverTuning::from(&cfg))
    }
}

impl AnimationDriver {
    pub fn new(tuning: DriverTuning) -> Self {
        Self {
            tuning,
            phase: DriverPhase::Idle,
            run: None,
            scheduled: None,
            next_run: 1,
            next_actor: 1,
        }
    }

    /// New constants apply from the next spawn onwards.
    pub fn retune(&mut self, tuning: DriverTuning) {
        self.tuning = tuning;
    }

    pub fn tuning(&self) -> &DriverTuning {
        &self.tuning
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DriverPhase::Idle)
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.run.as_ref().map(|r| r.id)
    }

    pub fn current_mode(&self) -> Option<AnimationMode> {
        self.run.as_ref().map(|r| r.request.mode)
    }

    pub fn frame(&self) -> u32 {
        self.run.as_ref().map_or(0, |r| r.frame)
    }

    pub fn actors(&self) -> &[Actor] {
        self.run.as_ref().map_or(&[], |r| r.actors.as_slice())
    }

    pub fn live_count(&self) -> usize {
        self.actors().len()
    }

    /// The frame the scheduler should tick next, if any.
    pub fn take_scheduled(&mut self) -> Option<ScheduledFrame> {
        self.scheduled.take()
    }

    /// Start a run, preempting the current one. Returns `None` (and stays
    /// idle) when the surface is not mounted.
    pub fn request(&mut self, request: LaunchRequest, surface: &mut RenderSurface) -> Option<RunId> {
        self.preempt(surface);
        if !surface.is_mounted() {
            debug!(mode = ?request.mode, "animation request skipped: surface not mounted");
            return None;
        }
        let id = RunId(self.next_run);
        self.next_run += 1;
        let token = CancelToken::new();
        self.scheduled = Some(ScheduledFrame {
            run: id,
            token: token.clone(),
        });
        self.run = Some(AnimationRun {
            id,
            request,
            token,
            frame: 0,
            actors: Vec::new(),
            spawned: 0,
            retired: 0,
            faulted: 0,
        });
        self.phase = DriverPhase::Spawning {
            remaining: self.tuning.spawn_delay,
        };
        debug!(run = %id, mode = ?request.mode, origin = ?request.origin, "animation requested");
        Some(id)
    }

    /// Cancel the run in flight and remove its visuals synchronously.
    pub fn preempt(&mut self, surface: &mut RenderSurface) -> Option<RunId> {
        self.scheduled = None;
        self.phase = DriverPhase::Idle;
        let run = self.run.take()?;
        run.token.cancel();
        for actor in &run.actors {
            surface.detach(actor.id);
        }
        info!(run = %run.id, live = run.actors.len(), frame = run.frame, "animation preempted");
        Some(run.id)
    }

    /// Advance the run owning `frame` by one display frame. `dt` only counts
    /// down the spawn delay; motion is integrated per frame.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        frame: &ScheduledFrame,
        dt: Duration,
        surface: &mut RenderSurface,
        rng: &mut R,
    ) -> TickOutcome {
        if !frame.is_live() || self.current_run() != Some(frame.run) {
            return TickOutcome::Stale;
        }
        if !surface.is_mounted() {
            return self.abandon_for_lost_surface();
        }

        if let DriverPhase::Spawning { remaining } = self.phase {
            if remaining > dt {
                self.phase = DriverPhase::Spawning {
                    remaining: remaining - dt,
                };
                self.scheduled = Some(frame.clone());
                return TickOutcome::Waiting;
            }
            self.spawn_batch(surface, rng);
            self.phase = DriverPhase::Running;
        }

        let outcome = self.step_frame(surface);
        if matches!(outcome, TickOutcome::Advanced { .. }) {
            self.scheduled = Some(frame.clone());
        }
        outcome
    }

    fn abandon_for_lost_surface(&mut self) -> TickOutcome {
        self.scheduled = None;
        self.phase = DriverPhase::Idle;
        let Some(run) = self.run.take() else {
            return TickOutcome::Stale;
        };
        run.token.cancel();
        warn!(run = %run.id, live = run.actors.len(), "render surface gone; animation abandoned");
        TickOutcome::Finished(run.summary(FinishReason::SurfaceLost))
    }

    fn spawn_batch<R: Rng + ?Sized>(&mut self, surface: &mut RenderSurface, rng: &mut R) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let tuning = &self.tuning;
        let request = run.request;
        let narrow = request.viewport.is_narrow(tuning.narrow_breakpoint);
        let factory = ParticleFactory::for_viewport(
            request.viewport,
            tuning.narrow_breakpoint,
            &tuning.bats,
            &tuning.butterflies,
        );
        let (x, y) = (request.origin.x, request.origin.y);

        match request.mode {
            AnimationMode::Bats => {
                let b = &tuning.bats;
                let count = b.count.pick(narrow);
                for i in 0..count {
                    let id = ActorId(self.next_actor);
                    self.next_actor += 1;
                    let mut bat = factory.create_bat(id, x, y);
                    let angle = i as f32 / count as f32 * TAU;
                    let speed = b.base_speed.pick(narrow) + rng.gen::<f32>() * b.speed_jitter;
                    bat.velocity = Vec3::new(
                        angle.cos() * speed,
                        angle.sin() * speed + b.lift,
                        (rng.gen::<f32>() - 0.5) * b.z_jitter,
                    );
                    surface.attach(&bat);
                    run.actors.push(bat);
                }
            }
            AnimationMode::Butterflies => {
                let f = &tuning.butterflies;
                let count = f.count.pick(narrow);
                for i in 0..count {
                    let id = ActorId(self.next_actor);
                    self.next_actor += 1;
                    let mut butterfly = factory.create_butterfly(id, x, y, rng);
                    let angle =
                        i as f32 / count as f32 * TAU + rng.gen::<f32>() * f.angle_jitter;
                    let speed = f.base_speed.pick(narrow) + rng.gen::<f32>() * f.speed_jitter;
                    butterfly.velocity = Vec3::new(
                        angle.cos() * speed,
                        angle.sin() * speed + f.lift,
                        (rng.gen::<f32>() - 0.5) * f.z_jitter,
                    );
                    butterfly.phase = rng.gen::<f32>() * PI;
                    surface.attach(&butterfly);
                    run.actors.push(butterfly);
                }
            }
        }
        run.spawned = run.actors.len();
        info!(
            run = %run.id,
            mode = ?request.mode,
            count = run.spawned,
            narrow,
            "animation spawned"
        );
    }

    fn step_frame(&mut self, surface: &mut RenderSurface) -> TickOutcome {
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::Stale;
        };
        let tuning = &self.tuning;
        run.frame += 1;

        let mut retired = 0;
        let mut faulted = 0;
        run.actors.retain_mut(|actor| {
            let outcome = match &actor.rig {
                Rig::Bat(_) => step_bat(actor, &tuning.bats),
                Rig::Butterfly(_) => step_butterfly(actor, &tuning.butterflies),
            };
            match outcome {
                StepOutcome::Alive => true,
                StepOutcome::Retire => {
                    surface.detach(actor.id);
                    retired += 1;
                    false
                }
                StepOutcome::Fault => {
                    warn!(actor = %actor.id, kind = ?actor.kind(), "non-finite actor state; retiring");
                    surface.detach(actor.id);
                    faulted += 1;
                    false
                }
            }
        });
        run.retired += retired;
        run.faulted += faulted;

        surface.present(&run.actors);

        let ceiling = tuning.frame_ceiling(run.request.mode);
        let reason = if run.actors.is_empty() {
            FinishReason::Drained
        } else if run.frame >= ceiling {
            for actor in run.actors.drain(..) {
                surface.detach(actor.id);
                run.retired += 1;
            }
            FinishReason::FrameCeiling
        } else {
            return TickOutcome::Advanced {
                frame: run.frame,
                live: run.actors.len(),
            };
        };

        let summary = run.summary(reason);
        self.run = None;
        self.phase = DriverPhase::Idle;
        info!(
            run = %summary.run,
            frames = summary.frames,
            retired = summary.retired,
            faulted = summary.faulted,
            reason = ?summary.reason,
            "animation finished"
        );
        TickOutcome::Finished(summary)
    }
}

/// Flap, fall, slow down. Bats leave by falling out of the retirement radius.
fn step_bat(actor: &mut Actor, cfg: &BatConfig) -> StepOutcome {
    actor.age = actor.age.saturating_add(1);
    actor.pose.translation += actor.velocity;

    actor.phase += cfg.flap_step;
    let flap = actor.phase.sin() * cfg.flap_amplitude;
    if let Rig::Bat(rig) = &mut actor.rig {
        rig.left_wing.rotation_z = flap;
        rig.right_wing.rotation_z = -flap;
    }

    actor.velocity.y -= cfg.gravity;
    actor.velocity *= cfg.damping;

    if !actor.is_finite() {
        StepOutcome::Fault
    } else if actor.distance_from_origin() > cfg.retire_radius {
        StepOutcome::Retire
    } else {
        StepOutcome::Alive
    }
}

/// Wander, flutter, slow down, fade with age. No gravity.
fn step_butterfly(actor: &mut Actor, cfg: &ButterflyConfig) -> StepOutcome {
    actor.age = actor.age.saturating_add(1);

    actor.phase += cfg.flutter_step;
    actor.velocity.x += actor.phase.sin() * cfg.wander_x;
    actor.velocity.y += (actor.phase * cfg.wander_y_frequency).cos() * cfg.wander_y;
    actor.pose.translation += actor.velocity;

    actor.pose.rotation_z = (actor.phase * cfg.flutter_frequency).sin() * cfg.flutter_amplitude;
    actor.velocity *= cfg.damping;

    if actor.age > cfg.fade_start_age {
        let step = cfg.fade_step();
        for (_, part) in actor.rig.parts_mut() {
            part.opacity = (part.opacity - step).max(0.0);
        }
    }

    if !actor.is_finite() {
        StepOutcome::Fault
    } else if actor.distance_from_origin() > cfg.retire_radius || actor.age > cfg.max_age {
        StepOutcome::Retire
    } else {
        StepOutcome::Alive
    }
}
