pub mod marker;
pub mod mirror;
pub mod palette;
pub mod surface;

pub use marker::ActiveTheme;
pub use mirror::{ActorNode, ActorPart, SurfaceCamera, SurfaceEntities};
pub use surface::{CameraParams, RenderSurface, SceneNode};

use bevy::prelude::*;

use crate::core::system::FlightSet;

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderSurface>()
            .init_resource::<SurfaceEntities>()
            .init_resource::<mirror::PartMeshes>()
            .init_resource::<ActiveTheme>()
            .init_resource::<ClearColor>()
            .add_event::<bevy::window::WindowResized>()
            .add_event::<AppExit>()
            .add_systems(Startup, mirror::mount_surface)
            .add_systems(
                Update,
                (
                    mirror::track_window_resize.in_set(FlightSet::Input),
                    (mirror::reconcile_scene, marker::sync_theme_marker).in_set(FlightSet::Mirror),
                ),
            )
            .add_systems(Last, mirror::teardown_on_exit);
    }
}
