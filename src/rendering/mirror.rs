//! Bevy side of the render surface: the camera entity and one entity per
//! scene node, reconciled against `RenderSurface` after every driver tick.
//!
//! Mesh and material assets are optional so the same systems run in headless
//! apps (transforms only).

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use std::collections::HashMap;

use super::palette;
use super::surface::{RenderSurface, SceneNode};
use crate::animation::actor::{ActorId, ActorKind, Part, PartSlot, Shape};
use crate::animation::driver::AnimationDriver;
use crate::core::config::FlightConfig;
use crate::core::viewport::Viewport;

#[derive(Component, Debug)]
pub struct SurfaceCamera;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorNode(pub ActorId);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorPart {
    pub actor: ActorId,
    pub slot: PartSlot,
}

/// Entities currently standing in for the surface.
#[derive(Resource, Debug, Default)]
pub struct SurfaceEntities {
    camera: Option<Entity>,
    nodes: HashMap<ActorId, Entity>,
}

impl SurfaceEntities {
    pub fn camera(&self) -> Option<Entity> {
        self.camera
    }

    pub fn node(&self, id: ActorId) -> Option<Entity> {
        self.nodes.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// One mesh per (kind, slot); shapes never vary within a slot.
#[derive(Resource, Debug, Default)]
pub struct PartMeshes(HashMap<(ActorKind, PartSlot), Handle<Mesh>>);

impl PartMeshes {
    fn get_or_add(
        &mut self,
        kind: ActorKind,
        slot: PartSlot,
        shape: Shape,
        meshes: &mut Assets<Mesh>,
    ) -> Handle<Mesh> {
        self.0
            .entry((kind, slot))
            .or_insert_with(|| meshes.add(shape_mesh(shape)))
            .clone()
    }
}

fn shape_mesh(shape: Shape) -> Mesh {
    match shape {
        Shape::Frustum {
            radius_top,
            radius_bottom,
            height,
        } => Mesh::from(ConicalFrustum {
            radius_top,
            radius_bottom,
            height,
        }),
        Shape::Sphere { radius } => Mesh::from(Sphere::new(radius)),
        Shape::Cone { radius, height } => Mesh::from(Cone { radius, height }),
        Shape::Disc { radius } => Mesh::from(Circle::new(radius)),
    }
}

fn part_material(part: &Part) -> StandardMaterial {
    StandardMaterial {
        base_color: palette::part_color(part.color, part.opacity),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

fn camera_projection(surface: &RenderSurface) -> Projection {
    let cam = surface.camera();
    Projection::Perspective(PerspectiveProjection {
        fov: cam.fov_degrees.to_radians(),
        aspect_ratio: cam.aspect,
        near: cam.near,
        far: cam.far,
        ..default()
    })
}

/// Startup: size the surface from the primary window (config size when
/// headless), mount it and spawn the camera.
pub fn mount_surface(
    mut commands: Commands,
    cfg: Res<FlightConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut surface: ResMut<RenderSurface>,
    mut entities: ResMut<SurfaceEntities>,
) {
    let viewport = match windows.single() {
        Ok(window) => Viewport::new(window.width(), window.height()),
        Err(_) => Viewport::new(cfg.window.width, cfg.window.height),
    };
    surface.mount(viewport);
    let distance = surface.camera().distance;
    let camera = commands
        .spawn((
            Camera3d::default(),
            camera_projection(&surface),
            Transform::from_xyz(0.0, 0.0, distance).looking_at(Vec3::ZERO, Vec3::Y),
            SurfaceCamera,
            Name::new("surface_camera"),
        ))
        .id();
    entities.camera = Some(camera);
}

pub fn track_window_resize(
    mut events: EventReader<WindowResized>,
    mut surface: ResMut<RenderSurface>,
    mut cameras: Query<&mut Projection, With<SurfaceCamera>>,
) {
    let Some(last) = events.read().last() else {
        return;
    };
    surface.resize(last.width, last.height);
    let aspect = surface.camera().aspect;
    for mut projection in &mut cameras {
        if let Projection::Perspective(p) = projection.as_mut() {
            p.aspect_ratio = aspect;
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn reconcile_scene(
    mut commands: Commands,
    surface: Res<RenderSurface>,
    mut entities: ResMut<SurfaceEntities>,
    mut part_meshes: ResMut<PartMeshes>,
    mut q_nodes: Query<&mut Transform, (With<ActorNode>, Without<ActorPart>)>,
    mut q_parts: Query<
        (
            &ActorPart,
            &mut Transform,
            Option<&MeshMaterial3d<StandardMaterial>>,
        ),
        Without<ActorNode>,
    >,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    if !surface.is_mounted() {
        release_entities(&mut commands, &mut entities);
        return;
    }

    entities.nodes.retain(|id, entity| {
        let keep = surface.node(*id).is_some();
        if !keep {
            commands.entity(*entity).despawn();
        }
        keep
    });

    for (id, node) in surface.nodes() {
        let existing = entities.nodes.get(&id).copied();
        match existing {
            Some(entity) => {
                if let Ok(mut tf) = q_nodes.get_mut(entity) {
                    *tf = node.pose.to_transform();
                }
            }
            None => {
                let entity = spawn_node(
                    &mut commands,
                    id,
                    node,
                    &mut part_meshes,
                    meshes.as_deref_mut(),
                    materials.as_deref_mut(),
                );
                entities.nodes.insert(id, entity);
            }
        }
    }

    for (tag, mut tf, material) in &mut q_parts {
        let Some(part) = surface.node(tag.actor).and_then(|n| n.rig.part(tag.slot)) else {
            continue;
        };
        let local = part.local_transform();
        if *tf != local {
            *tf = local;
        }
        if let (Some(handle), Some(materials)) = (material, materials.as_deref_mut()) {
            let alpha = part.opacity.clamp(0.0, 1.0);
            let stale = materials
                .get(&handle.0)
                .is_some_and(|m| m.base_color.alpha() != alpha);
            if stale {
                if let Some(m) = materials.get_mut(&handle.0) {
                    m.base_color.set_alpha(alpha);
                }
            }
        }
    }
}

fn spawn_node(
    commands: &mut Commands,
    id: ActorId,
    node: &SceneNode,
    part_meshes: &mut PartMeshes,
    mut meshes: Option<&mut Assets<Mesh>>,
    mut materials: Option<&mut Assets<StandardMaterial>>,
) -> Entity {
    commands
        .spawn((
            ActorNode(id),
            node.pose.to_transform(),
            Visibility::default(),
            Name::new(format!("{:?} {id}", node.kind)),
        ))
        .with_children(|parent| {
            for (slot, part) in node.rig.parts() {
                let mut child = parent.spawn((
                    ActorPart { actor: id, slot },
                    part.local_transform(),
                    Visibility::default(),
                ));
                if let (Some(meshes), Some(materials)) =
                    (meshes.as_deref_mut(), materials.as_deref_mut())
                {
                    let mesh = part_meshes.get_or_add(node.kind, slot, part.shape, meshes);
                    child.insert((
                        Mesh3d(mesh),
                        MeshMaterial3d(materials.add(part_material(part))),
                    ));
                }
            }
        })
        .id()
}

fn release_entities(commands: &mut Commands, entities: &mut SurfaceEntities) {
    for (_, entity) in entities.nodes.drain() {
        commands.entity(entity).despawn();
    }
    if let Some(camera) = entities.camera.take() {
        commands.entity(camera).despawn();
    }
}

/// Last: on exit, cancel any run and release the surface so nothing outlives it.
pub fn teardown_on_exit(
    mut exits: EventReader<AppExit>,
    driver: Option<ResMut<AnimationDriver>>,
    mut surface: ResMut<RenderSurface>,
) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut driver) = driver {
        driver.preempt(&mut surface);
    }
    surface.unmount();
}
