//! Top-level theme marker: the clear colour natively, plus the `<html>` class
//! and `data-theme` attribute on the web.

use bevy::prelude::*;

use super::palette;
use crate::core::theme::Theme;

/// Theme currently shown by the page. Written by the toggle the moment the
/// theme flips, before any animation starts.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveTheme(pub Theme);

pub fn sync_theme_marker(theme: Res<ActiveTheme>, mut clear: ResMut<ClearColor>) {
    if !theme.is_changed() {
        return;
    }
    clear.0 = palette::background(theme.0);
    #[cfg(target_arch = "wasm32")]
    crate::preference::web::mark_document(theme.0.class_name(), theme.0.as_str());
    debug!(theme = %theme.0, "theme marker updated");
}
