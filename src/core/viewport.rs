use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Logical window size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width / height, guarded against a zero-height (minimised) window.
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    pub fn is_narrow(&self, breakpoint: f32) -> bool {
        self.width < breakpoint
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// A value that differs between desktop and narrow (mobile) viewports.
/// Both halves are required when parsed on its own; layered loading fills a
/// missing half from the built-in defaults.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PerViewport<T> {
    pub desktop: T,
    pub narrow: T,
}

impl<T: Copy> PerViewport<T> {
    pub const fn new(desktop: T, narrow: T) -> Self {
        Self { desktop, narrow }
    }

    pub fn pick(&self, narrow: bool) -> T {
        if narrow {
            self.narrow
        } else {
            self.desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive() {
        assert!(Viewport::new(767.0, 900.0).is_narrow(768.0));
        assert!(!Viewport::new(768.0, 900.0).is_narrow(768.0));
    }

    #[test]
    fn pick_follows_viewport_class() {
        let counts = PerViewport::new(12usize, 8usize);
        assert_eq!(counts.pick(false), 12);
        assert_eq!(counts.pick(true), 8);
    }

    #[test]
    fn half_a_pair_does_not_parse_alone() {
        let parsed: Result<PerViewport<usize>, _> = ron::from_str("(desktop: 20)");
        assert!(parsed.is_err());
    }
}
