pub mod session;
pub mod toggle;

pub use toggle::{ToggleActivated, ToggleButton, ToggleState};

use bevy::prelude::*;

use crate::core::system::FlightSet;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        use toggle::*;

        app.init_resource::<ToggleState>()
            .add_event::<ToggleActivated>()
            .add_systems(Startup, (resolve_initial_theme, spawn_toggle_button).chain())
            .add_systems(
                Update,
                (
                    emit_toggle_clicks,
                    settle_finished_runs,
                    apply_toggle,
                    style_toggle_button,
                )
                    .chain()
                    .in_set(FlightSet::Input),
            );
    }
}
