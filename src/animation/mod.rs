pub mod actor;
pub mod driver;
pub mod factory;
pub mod frame;

pub use actor::{Actor, ActorId, ActorKind, PartSlot, Rig};
pub use driver::{
    AnimationDriver, AnimationMode, DriverPhase, DriverTuning, FinishReason, LaunchRequest,
    RunSummary, TickOutcome,
};
pub use frame::{CancelToken, RunId, ScheduledFrame};

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::core::config::FlightConfig;
use crate::core::system::FlightSet;
use crate::rendering::surface::RenderSurface;

/// Randomness for launch jitter and butterfly colours. Seeded from
/// `FlightConfig::rng_seed` when set, otherwise from entropy.
#[derive(Resource)]
pub struct AnimationRng(pub StdRng);

impl FromWorld for AnimationRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world
            .get_resource::<FlightConfig>()
            .and_then(|cfg| cfg.rng_seed);
        match seed {
            Some(seed) => {
                info!(seed, "animation rng seeded");
                Self(StdRng::seed_from_u64(seed))
            }
            None => Self(StdRng::from_entropy()),
        }
    }
}

/// Sent once per run that reaches its end (not for preempted runs).
#[derive(Event, Debug, Clone, Copy)]
pub struct RunFinished(pub RunSummary);

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderSurface>()
            .init_resource::<AnimationDriver>()
            .init_resource::<AnimationRng>()
            .add_event::<RunFinished>()
            .add_systems(Update, drive_animation.in_set(FlightSet::Animate));
    }
}

/// One driver tick per `Update`; the scheduled frame is re-armed by the driver.
pub fn drive_animation(
    time: Res<Time>,
    mut driver: ResMut<AnimationDriver>,
    mut surface: ResMut<RenderSurface>,
    mut rng: ResMut<AnimationRng>,
    mut finished: EventWriter<RunFinished>,
) {
    let Some(frame) = driver.take_scheduled() else {
        return;
    };
    if let TickOutcome::Finished(summary) =
        driver.tick(&frame, time.delta(), &mut surface, &mut rng.0)
    {
        finished.write(RunFinished(summary));
    }
}
