use bevy::prelude::*;

/// Unique per driver; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorKind {
    Bat,
    Butterfly,
}

/// Primitive mesh a part is built from. Dimensions are in local units before
/// the actor scale is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Frustum {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Sphere {
        radius: f32,
    },
    Cone {
        radius: f32,
        height: f32,
    },
    /// Flat disc in the XY plane.
    Disc {
        radius: f32,
    },
}

/// Named slot of a part inside its rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartSlot {
    Body,
    Head,
    LeftEar,
    RightEar,
    LeftWing,
    RightWing,
    UpperLeftWing,
    UpperRightWing,
    LowerLeftWing,
    LowerRightWing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub shape: Shape,
    pub offset: Vec3,
    pub rotation_z: f32,
    pub scale: Vec3,
    /// 0xRRGGBB, sRGB.
    pub color: u32,
    pub opacity: f32,
}

impl Part {
    pub fn new(shape: Shape, color: u32) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            rotation_z: 0.0,
            scale: Vec3::ONE,
            color,
            opacity: 1.0,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec3::new(x, y, 0.0);
        self
    }

    pub fn rotated(mut self, rotation_z: f32) -> Self {
        self.rotation_z = rotation_z;
        self
    }

    pub fn scaled(mut self, x: f32, y: f32) -> Self {
        self.scale = Vec3::new(x, y, 1.0);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn local_transform(&self) -> Transform {
        Transform {
            translation: self.offset,
            rotation: Quat::from_rotation_z(self.rotation_z),
            scale: self.scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatRig {
    pub body: Part,
    pub head: Part,
    pub left_ear: Part,
    pub right_ear: Part,
    pub left_wing: Part,
    pub right_wing: Part,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButterflyRig {
    pub body: Part,
    pub upper_left_wing: Part,
    pub upper_right_wing: Part,
    pub lower_left_wing: Part,
    pub lower_right_wing: Part,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rig {
    Bat(BatRig),
    Butterfly(ButterflyRig),
}

impl Rig {
    pub fn kind(&self) -> ActorKind {
        match self {
            Rig::Bat(_) => ActorKind::Bat,
            Rig::Butterfly(_) => ActorKind::Butterfly,
        }
    }

    /// Parts in build order: body first, then head and ears, then wings.
    pub fn parts(&self) -> Vec<(PartSlot, &Part)> {
        match self {
            Rig::Bat(b) => vec![
                (PartSlot::Body, &b.body),
                (PartSlot::Head, &b.head),
                (PartSlot::LeftEar, &b.left_ear),
                (PartSlot::RightEar, &b.right_ear),
                (PartSlot::LeftWing, &b.left_wing),
                (PartSlot::RightWing, &b.right_wing),
            ],
            Rig::Butterfly(b) => vec![
                (PartSlot::Body, &b.body),
                (PartSlot::UpperLeftWing, &b.upper_left_wing),
                (PartSlot::UpperRightWing, &b.upper_right_wing),
                (PartSlot::LowerLeftWing, &b.lower_left_wing),
                (PartSlot::LowerRightWing, &b.lower_right_wing),
            ],
        }
    }

    pub fn parts_mut(&mut self) -> Vec<(PartSlot, &mut Part)> {
        match self {
            Rig::Bat(b) => vec![
                (PartSlot::Body, &mut b.body),
                (PartSlot::Head, &mut b.head),
                (PartSlot::LeftEar, &mut b.left_ear),
                (PartSlot::RightEar, &mut b.right_ear),
                (PartSlot::LeftWing, &mut b.left_wing),
                (PartSlot::RightWing, &mut b.right_wing),
            ],
            Rig::Butterfly(b) => vec![
                (PartSlot::Body, &mut b.body),
                (PartSlot::UpperLeftWing, &mut b.upper_left_wing),
                (PartSlot::UpperRightWing, &mut b.upper_right_wing),
                (PartSlot::LowerLeftWing, &mut b.lower_left_wing),
                (PartSlot::LowerRightWing, &mut b.lower_right_wing),
            ],
        }
    }

    pub fn part(&self, slot: PartSlot) -> Option<&Part> {
        self.parts()
            .into_iter()
            .find_map(|(s, p)| (s == slot).then_some(p))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation_z: f32,
    pub scale: f32,
}

impl Pose {
    pub fn to_transform(self) -> Transform {
        Transform {
            translation: self.translation,
            rotation: Quat::from_rotation_z(self.rotation_z),
            scale: Vec3::splat(self.scale),
        }
    }
}

/// An ephemeral bat or butterfly. `age` counts frames since spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub pose: Pose,
    pub velocity: Vec3,
    pub phase: f32,
    pub age: u32,
    pub rig: Rig,
}

impl Actor {
    pub fn kind(&self) -> ActorKind {
        self.rig.kind()
    }

    /// Distance from the surface origin (world origin), the retirement metric.
    pub fn distance_from_origin(&self) -> f32 {
        self.pose.translation.length()
    }

    pub fn is_finite(&self) -> bool {
        self.pose.translation.is_finite()
            && self.velocity.is_finite()
            && self.phase.is_finite()
            && self.pose.rotation_z.is_finite()
    }

    /// Highest part opacity; zero means nothing of the actor is visible.
    pub fn visible_opacity(&self) -> f32 {
        self.rig
            .parts()
            .into_iter()
            .map(|(_, p)| p.opacity)
            .fold(0.0, f32::max)
    }
}
