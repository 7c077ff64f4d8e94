//! Procedural bat and butterfly rigs.
//!
//! Actors come out at rest (zero velocity, zero phase); the driver gives them
//! their launch velocity. Only the butterfly wing colour is random.

use bevy::prelude::*;
use rand::Rng;

use super::actor::{Actor, ActorId, BatRig, ButterflyRig, Part, Pose, Rig, Shape};
use crate::core::config::{BatConfig, ButterflyConfig};
use crate::core::viewport::Viewport;

pub const BAT_BODY_COLOR: u32 = 0x1a0a1f;
pub const BAT_HEAD_COLOR: u32 = 0x2d1b3d;
pub const BAT_WING_COLOR: u32 = 0x0d0514;
pub const BAT_WING_OPACITY: f32 = 0.9;
pub const BUTTERFLY_BODY_COLOR: u32 = 0x4a4a4a;
/// Gold, hot pink, sky blue, orange.
pub const BUTTERFLY_WING_PALETTE: [u32; 4] = [0xffd700, 0xff69b4, 0x87ceeb, 0xffa500];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFactory {
    pub bat_scale: f32,
    pub butterfly_scale: f32,
}

impl ParticleFactory {
    pub fn for_viewport(
        viewport: Viewport,
        narrow_breakpoint: f32,
        bats: &BatConfig,
        butterflies: &ButterflyConfig,
    ) -> Self {
        let narrow = viewport.is_narrow(narrow_breakpoint);
        Self {
            bat_scale: bats.scale.pick(narrow),
            butterfly_scale: butterflies.scale.pick(narrow),
        }
    }

    pub fn create_bat(&self, id: ActorId, x: f32, y: f32) -> Actor {
        let ear = Shape::Cone {
            radius: 0.015,
            height: 0.04,
        };
        let wing = Shape::Disc { radius: 0.12 };
        let rig = BatRig {
            body: Part::new(
                Shape::Frustum {
                    radius_top: 0.03,
                    radius_bottom: 0.02,
                    height: 0.12,
                },
                BAT_BODY_COLOR,
            ),
            head: Part::new(Shape::Sphere { radius: 0.04 }, BAT_HEAD_COLOR).at(0.0, 0.08),
            left_ear: Part::new(ear, BAT_HEAD_COLOR).at(-0.025, 0.105).rotated(-0.3),
            right_ear: Part::new(ear, BAT_HEAD_COLOR).at(0.025, 0.105).rotated(0.3),
            left_wing: Part::new(wing, BAT_WING_COLOR)
                .at(-0.1, 0.02)
                .scaled(1.5, 0.8)
                .with_opacity(BAT_WING_OPACITY),
            right_wing: Part::new(wing, BAT_WING_COLOR)
                .at(0.1, 0.02)
                .scaled(1.5, 0.8)
                .with_opacity(BAT_WING_OPACITY),
        };
        at_rest(id, x, y, self.bat_scale, Rig::Bat(rig))
    }

    pub fn create_butterfly<R: Rng + ?Sized>(
        &self,
        id: ActorId,
        x: f32,
        y: f32,
        rng: &mut R,
    ) -> Actor {
        let wing_color = BUTTERFLY_WING_PALETTE[rng.gen_range(0..BUTTERFLY_WING_PALETTE.len())];
        let wing = Shape::Disc { radius: 0.06 };
        let rig = ButterflyRig {
            body: Part::new(
                Shape::Frustum {
                    radius_top: 0.01,
                    radius_bottom: 0.01,
                    height: 0.1,
                },
                BUTTERFLY_BODY_COLOR,
            ),
            upper_left_wing: Part::new(wing, wing_color).at(-0.05, 0.03).scaled(1.2, 0.8),
            upper_right_wing: Part::new(wing, wing_color).at(0.05, 0.03).scaled(1.2, 0.8),
            lower_left_wing: Part::new(wing, wing_color).at(-0.04, -0.03).scaled(0.8, 0.6),
            lower_right_wing: Part::new(wing, wing_color).at(0.04, -0.03).scaled(0.8, 0.6),
        };
        at_rest(id, x, y, self.butterfly_scale, Rig::Butterfly(rig))
    }
}

fn at_rest(id: ActorId, x: f32, y: f32, scale: f32, rig: Rig) -> Actor {
    Actor {
        id,
        pose: Pose {
            translation: Vec3::new(x, y, 0.0),
            rotation_z: 0.0,
            scale,
        },
        velocity: Vec3::ZERO,
        phase: 0.0,
        age: 0,
        rig,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::actor::{ActorKind, PartSlot};
    use rand::{rngs::StdRng, SeedableRng};

    fn factory(width: f32) -> ParticleFactory {
        ParticleFactory::for_viewport(
            Viewport::new(width, 800.0),
            768.0,
            &BatConfig::default(),
            &ButterflyConfig::default(),
        )
    }

    #[test]
    fn narrow_viewports_get_smaller_actors() {
        let desktop = factory(1280.0);
        let narrow = factory(400.0);
        assert_eq!(desktop.bat_scale, 2.0);
        assert_eq!(narrow.bat_scale, 1.2);
        assert_eq!(desktop.butterfly_scale, 1.2);
        assert_eq!(narrow.butterfly_scale, 0.8);
    }

    #[test]
    fn bat_rig_has_mirrored_named_wings() {
        let bat = factory(1280.0).create_bat(ActorId(1), 0.5, -0.25);
        assert_eq!(bat.kind(), ActorKind::Bat);
        assert_eq!(bat.pose.translation, Vec3::new(0.5, -0.25, 0.0));
        assert_eq!(bat.velocity, Vec3::ZERO);

        let slots: Vec<_> = bat.rig.parts().into_iter().map(|(s, _)| s).collect();
        assert_eq!(
            slots,
            vec![
                PartSlot::Body,
                PartSlot::Head,
                PartSlot::LeftEar,
                PartSlot::RightEar,
                PartSlot::LeftWing,
                PartSlot::RightWing
            ]
        );
        let left = bat.rig.part(PartSlot::LeftWing).expect("left wing");
        let right = bat.rig.part(PartSlot::RightWing).expect("right wing");
        assert_eq!(left.offset.x, -right.offset.x);
        assert_eq!(left.opacity, BAT_WING_OPACITY);
    }

    #[test]
    fn butterfly_wings_share_one_palette_colour() {
        let mut rng = StdRng::seed_from_u64(11);
        let f = factory(1280.0);
        for i in 0..32 {
            let b = f.create_butterfly(ActorId(i), 0.0, 0.0, &mut rng);
            let Rig::Butterfly(rig) = &b.rig else {
                panic!("expected butterfly rig");
            };
            let c = rig.upper_left_wing.color;
            assert!(BUTTERFLY_WING_PALETTE.contains(&c));
            assert_eq!(rig.upper_right_wing.color, c);
            assert_eq!(rig.lower_left_wing.color, c);
            assert_eq!(rig.lower_right_wing.color, c);
            assert_eq!(rig.body.color, BUTTERFLY_BODY_COLOR);
        }
    }

    #[test]
    fn butterfly_colour_is_reproducible_with_seed() {
        let f = factory(1280.0);
        let a = f.create_butterfly(ActorId(0), 0.0, 0.0, &mut StdRng::seed_from_u64(5));
        let b = f.create_butterfly(ActorId(0), 0.0, 0.0, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
