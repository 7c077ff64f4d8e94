use std::time::Duration;

use bevy::prelude::*;

use crate::animation::AnimationDriver;
use crate::core::config::FlightConfig;
use crate::core::system::FlightSet;
use crate::rendering::RenderSurface;

/// Time left before the session ends on its own (`window.autoClose`).
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct SessionDeadline {
    remaining: Option<Duration>,
}

impl SessionDeadline {
    /// Non-positive or non-finite seconds leave the session open-ended.
    pub fn from_secs(secs: f32) -> Self {
        let remaining = (secs.is_finite() && secs > 0.0).then(|| Duration::from_secs_f32(secs));
        Self { remaining }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.remaining
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Counts down by `dt`. Returns true once, on the call that reaches zero;
    /// the deadline is disarmed afterwards.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(left) = self.remaining else {
            return false;
        };
        match left.checked_sub(dt) {
            Some(rest) if !rest.is_zero() => {
                self.remaining = Some(rest);
                false
            }
            _ => {
                self.remaining = None;
                true
            }
        }
    }
}

impl FromWorld for SessionDeadline {
    fn from_world(world: &mut World) -> Self {
        let secs = world
            .get_resource::<FlightConfig>()
            .map_or(0.0, |cfg| cfg.window.auto_close);
        Self::from_secs(secs)
    }
}

/// Ends the session after `window.autoClose` seconds (0 disables). A run
/// still in flight is cancelled first so its actors leave the scene in the
/// same frame the exit is requested.
pub struct SessionDeadlinePlugin;

impl Plugin for SessionDeadlinePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionDeadline>()
            .add_systems(Startup, announce_deadline)
            .add_systems(Update, end_session_at_deadline.in_set(FlightSet::Input));
    }
}

fn announce_deadline(deadline: Res<SessionDeadline>) {
    if let Some(left) = deadline.remaining() {
        info!(seconds = left.as_secs_f32(), "session deadline armed");
    }
}

pub fn end_session_at_deadline(
    time: Res<Time>,
    mut deadline: ResMut<SessionDeadline>,
    driver: Option<ResMut<AnimationDriver>>,
    mut surface: ResMut<RenderSurface>,
    mut exits: EventWriter<AppExit>,
) {
    if !deadline.advance(time.delta()) {
        return;
    }
    let cancelled = driver.and_then(|mut d| d.preempt(&mut surface));
    match cancelled {
        Some(run) => info!(%run, "session deadline reached; run cancelled, exiting"),
        None => info!("session deadline reached, exiting"),
    }
    exits.write(AppExit::Success);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_leave_the_session_open() {
        assert!(!SessionDeadline::from_secs(0.0).is_armed());
        assert!(!SessionDeadline::from_secs(-2.0).is_armed());
        assert!(!SessionDeadline::from_secs(f32::NAN).is_armed());
        assert!(SessionDeadline::from_secs(0.5).is_armed());
    }

    #[test]
    fn fires_once_when_time_runs_out() {
        let mut deadline = SessionDeadline::from_secs(0.05);
        let step = Duration::from_millis(16);
        assert!(!deadline.advance(step));
        assert!(!deadline.advance(step));
        assert!(!deadline.advance(step));
        assert!(deadline.advance(step));
        assert!(!deadline.is_armed());
        assert!(!deadline.advance(step));
    }

    #[test]
    fn exact_landing_counts_as_reached() {
        let mut deadline = SessionDeadline {
            remaining: Some(Duration::from_millis(32)),
        };
        let step = Duration::from_millis(16);
        assert!(!deadline.advance(step));
        assert!(deadline.advance(step));
    }
}
