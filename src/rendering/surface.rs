//! Render surface model: camera parameters, canvas size and the scene graph of
//! actor nodes. Bevy entities are reconciled against this in `mirror`.
//!
//! Every mutating operation is a silent no-op while the surface is unmounted.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::animation::actor::{Actor, ActorId, ActorKind, Pose, Rig};
use crate::core::config::{FlightConfig, SurfaceConfig};
use crate::core::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

/// Presented state of one actor.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: ActorKind,
    pub pose: Pose,
    pub rig: Rig,
}

#[derive(Resource, Debug)]
pub struct RenderSurface {
    mounted: bool,
    camera: CameraParams,
    canvas: Viewport,
    world_extent: f32,
    scene: BTreeMap<ActorId, SceneNode>,
    presented_frames: u64,
}

impl FromWorld for RenderSurface {
    fn from_world(world: &mut World) -> Self {
        let cfg = world
            .get_resource::<FlightConfig>()
            .cloned()
            .unwrap_or_default();
        let viewport = Viewport::new(cfg.window.width, cfg.window.height);
        Self::new(&cfg.surface, viewport)
    }
}

impl RenderSurface {
    /// Unmounted surface sized for `viewport`.
    pub fn new(cfg: &SurfaceConfig, viewport: Viewport) -> Self {
        Self {
            mounted: false,
            camera: CameraParams {
                fov_degrees: cfg.fov_degrees,
                aspect: viewport.aspect(),
                near: cfg.near,
                far: cfg.far,
                distance: cfg.camera_distance,
            },
            canvas: viewport,
            world_extent: cfg.world_extent,
            scene: BTreeMap::new(),
            presented_frames: 0,
        }
    }

    pub fn mount(&mut self, viewport: Viewport) {
        self.mounted = true;
        self.scene.clear();
        self.apply_size(viewport);
        info!(
            width = viewport.width,
            height = viewport.height,
            "render surface mounted"
        );
    }

    /// Releases the scene unconditionally, whether or not a run is in flight.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        let dropped = self.scene.len();
        self.scene.clear();
        self.mounted = false;
        info!(dropped_nodes = dropped, "render surface unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if !self.mounted {
            return;
        }
        self.apply_size(Viewport::new(width, height));
    }

    fn apply_size(&mut self, viewport: Viewport) {
        self.canvas = viewport;
        self.camera.aspect = viewport.aspect();
    }

    pub fn camera(&self) -> &CameraParams {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.canvas
    }

    /// Window pixel (origin top-left, y down) to the actor plane:
    /// pixel -> NDC -> NDC * world extent.
    pub fn screen_to_surface(&self, point: Vec2) -> Vec3 {
        let size = self.canvas.size().max(Vec2::ONE);
        let ndc_x = (point.x / size.x) * 2.0 - 1.0;
        let ndc_y = -(point.y / size.y) * 2.0 + 1.0;
        Vec3::new(ndc_x * self.world_extent, ndc_y * self.world_extent, 0.0)
    }

    pub fn attach(&mut self, actor: &Actor) {
        if !self.mounted {
            return;
        }
        self.scene.insert(
            actor.id,
            SceneNode {
                kind: actor.kind(),
                pose: actor.pose,
                rig: actor.rig.clone(),
            },
        );
    }

    pub fn detach(&mut self, id: ActorId) {
        if !self.mounted {
            return;
        }
        self.scene.remove(&id);
    }

    /// Copy the latest actor state into the scene and count the frame.
    pub fn present(&mut self, actors: &[Actor]) {
        if !self.mounted {
            return;
        }
        for actor in actors {
            if let Some(node) = self.scene.get_mut(&actor.id) {
                node.pose = actor.pose;
                node.rig.clone_from(&actor.rig);
            }
        }
        self.presented_frames += 1;
    }

    pub fn node(&self, id: ActorId) -> Option<&SceneNode> {
        self.scene.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (ActorId, &SceneNode)> {
        self.scene.iter().map(|(id, node)| (*id, node))
    }

    pub fn node_count(&self) -> usize {
        self.scene.len()
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::factory::ParticleFactory;
    use crate::core::config::{BatConfig, ButterflyConfig};

    fn mounted(width: f32, height: f32) -> RenderSurface {
        let mut s = RenderSurface::new(&SurfaceConfig::default(), Viewport::new(width, height));
        s.mount(Viewport::new(width, height));
        s
    }

    fn bat(id: u64) -> Actor {
        ParticleFactory::for_viewport(
            Viewport::new(1280.0, 720.0),
            768.0,
            &BatConfig::default(),
            &ButterflyConfig::default(),
        )
        .create_bat(ActorId(id), 0.0, 0.0)
    }

    #[test]
    fn resize_sets_exact_aspect_and_canvas() {
        let mut s = mounted(1280.0, 720.0);
        s.resize(1000.0, 400.0);
        assert_eq!(s.camera().aspect, 1000.0 / 400.0);
        assert_eq!(s.viewport(), Viewport::new(1000.0, 400.0));
    }

    #[test]
    fn screen_centre_maps_to_origin_and_corners_to_extent() {
        let s = mounted(800.0, 600.0);
        assert_eq!(s.screen_to_surface(Vec2::new(400.0, 300.0)), Vec3::ZERO);
        assert_eq!(
            s.screen_to_surface(Vec2::new(0.0, 0.0)),
            Vec3::new(-2.5, 2.5, 0.0)
        );
        assert_eq!(
            s.screen_to_surface(Vec2::new(800.0, 600.0)),
            Vec3::new(2.5, -2.5, 0.0)
        );
    }

    #[test]
    fn unmounted_surface_ignores_everything() {
        let mut s = RenderSurface::new(&SurfaceConfig::default(), Viewport::new(640.0, 480.0));
        let a = bat(1);
        s.attach(&a);
        s.present(std::slice::from_ref(&a));
        s.resize(10.0, 10.0);
        assert_eq!(s.node_count(), 0);
        assert_eq!(s.presented_frames(), 0);
        assert_eq!(s.viewport(), Viewport::new(640.0, 480.0));
    }

    #[test]
    fn unmount_drops_nodes_and_present_updates_poses() {
        let mut s = mounted(1280.0, 720.0);
        let mut a = bat(7);
        s.attach(&a);
        a.pose.translation = Vec3::new(1.0, 2.0, 0.0);
        s.present(std::slice::from_ref(&a));
        assert_eq!(
            s.node(ActorId(7)).expect("node").pose.translation,
            Vec3::new(1.0, 2.0, 0.0)
        );
        s.unmount();
        assert!(!s.is_mounted());
        assert_eq!(s.node_count(), 0);
    }
}
