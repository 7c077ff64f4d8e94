use bevy::prelude::*;

use crate::core::theme::Theme;

// Page backgrounds
pub const LIGHT_BACKGROUND: Color = Color::srgb(0.96, 0.95, 0.92); // parchment
pub const DARK_BACKGROUND: Color = Color::srgb(0.07, 0.05, 0.08); // soot

/// Toggle button colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonColors {
    pub fill: Color,
    pub border: Color,
    pub label: Color,
}

const DARK_BUTTON: ButtonColors = ButtonColors {
    fill: Color::srgb(0.471, 0.208, 0.059), // umber
    border: Color::srgb(0.706, 0.325, 0.035), // amber
    label: Color::srgb(0.992, 0.902, 0.541),
};

const LIGHT_BUTTON: ButtonColors = ButtonColors {
    fill: Color::srgb(0.898, 0.906, 0.922),
    border: Color::srgb(0.420, 0.447, 0.502),
    label: Color::srgb(0.290, 0.290, 0.290),
};

#[inline]
pub fn background(theme: Theme) -> Color {
    match theme {
        Theme::Light => LIGHT_BACKGROUND,
        Theme::Dark => DARK_BACKGROUND,
    }
}

#[inline]
pub fn button_colors(theme: Theme) -> ButtonColors {
    match theme {
        Theme::Light => LIGHT_BUTTON,
        Theme::Dark => DARK_BUTTON,
    }
}

/// `0xRRGGBB` (sRGB) to a Bevy colour.
#[inline]
pub fn hex_rgb(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

#[inline]
pub fn part_color(rgb: u32, opacity: f32) -> Color {
    hex_rgb(rgb).with_alpha(opacity.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_channels_unpack_in_order() {
        let c = hex_rgb(0xff69b4).to_srgba();
        assert_eq!(c, Srgba::rgb_u8(0xff, 0x69, 0xb4));
    }

    #[test]
    fn part_alpha_is_clamped() {
        assert_eq!(part_color(0x000000, -0.5).alpha(), 0.0);
        assert_eq!(part_color(0x000000, 0.9).alpha(), 0.9);
    }

    #[test]
    fn themes_get_distinct_buttons() {
        assert_ne!(button_colors(Theme::Light), button_colors(Theme::Dark));
    }
}
