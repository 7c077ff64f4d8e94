//! Theme toggle button: flips the theme, persists it, and launches the
//! matching animation from the button's centre.

use bevy::prelude::*;

use crate::animation::driver::{AnimationDriver, AnimationMode, LaunchRequest};
use crate::animation::frame::RunId;
use crate::animation::RunFinished;
use crate::core::config::{FlightConfig, ToggleConfig};
use crate::core::theme::Theme;
use crate::preference::Preferences;
use crate::rendering::marker::ActiveTheme;
use crate::rendering::palette;
use crate::rendering::surface::RenderSurface;

pub const BUTTON_SIZE: f32 = 72.0;
const BUTTON_MARGIN: f32 = 16.0;
const IN_FLIGHT_GROWTH: f32 = 1.1;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToggleState {
    pub theme: Theme,
    pub in_flight: bool,
    /// Run started by the last accepted activation.
    pub run: Option<RunId>,
}

impl ToggleState {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            ..default()
        }
    }

    /// Flip and persist the theme, then describe the launch. `rect` is the
    /// button's bounding box in window pixels. Returns `None` when the
    /// activation is ignored because a run is still in flight.
    pub fn activate(
        &mut self,
        rect: Rect,
        surface: &RenderSurface,
        prefs: &mut Preferences,
        cfg: &ToggleConfig,
    ) -> Option<LaunchRequest> {
        if self.in_flight && cfg.block_while_animating {
            debug!(theme = %self.theme, "toggle ignored: animation in flight");
            return None;
        }
        self.theme = self.theme.flip();
        prefs.write(self.theme);
        self.in_flight = true;
        Some(LaunchRequest {
            mode: AnimationMode::entering(self.theme),
            origin: surface.screen_to_surface(rect.center()),
            viewport: surface.viewport(),
        })
    }

    /// Clear the in-flight flag if `run` is the one this control started.
    pub fn settle(&mut self, run: RunId) {
        if self.run == Some(run) {
            self.in_flight = false;
            self.run = None;
        }
    }
}

/// Icon label for the theme the button would switch to.
pub fn button_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "butterfly",
        Theme::Light => "bat",
    }
}

/// A press on the toggle, with the button's rect in logical window pixels.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ToggleActivated {
    pub rect: Rect,
}

#[derive(Component, Debug)]
pub struct ToggleButton;

#[derive(Component, Debug)]
pub struct ToggleLabel;

pub fn resolve_initial_theme(
    prefs: Res<Preferences>,
    mut state: ResMut<ToggleState>,
    mut marker: ResMut<ActiveTheme>,
) {
    let theme = prefs.read();
    state.theme = theme;
    marker.0 = theme;
    info!(%theme, store = %prefs.describe(), "initial theme resolved");
}

pub fn spawn_toggle_button(mut commands: Commands, state: Res<ToggleState>) {
    let colors = palette::button_colors(state.theme);
    commands
        .spawn((
            ToggleButton,
            Button,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(BUTTON_MARGIN),
                right: Val::Px(BUTTON_MARGIN),
                width: Val::Px(BUTTON_SIZE),
                height: Val::Px(BUTTON_SIZE),
                border: UiRect::all(Val::Px(4.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BorderRadius::MAX,
            BackgroundColor(colors.fill),
            BorderColor(colors.border),
            Name::new("theme_toggle"),
        ))
        .with_children(|p| {
            p.spawn((
                ToggleLabel,
                Text::new(button_label(state.theme)),
                TextFont {
                    font_size: 13.0,
                    ..default()
                },
                TextColor(colors.label),
            ));
        });
}

pub fn emit_toggle_clicks(
    q_button: Query<
        (&Interaction, &ComputedNode, &GlobalTransform),
        (Changed<Interaction>, With<ToggleButton>),
    >,
    mut writer: EventWriter<ToggleActivated>,
) {
    for (interaction, node, transform) in &q_button {
        if *interaction != Interaction::Pressed {
            continue;
        }
        // Layout is in physical pixels; the surface maps logical ones.
        let scale = node.inverse_scale_factor();
        let center = transform.translation().truncate() * scale;
        let size = node.size() * scale;
        writer.write(ToggleActivated {
            rect: Rect::from_center_size(center, size),
        });
    }
}

pub fn settle_finished_runs(
    mut finished: EventReader<RunFinished>,
    mut state: ResMut<ToggleState>,
) {
    for RunFinished(summary) in finished.read() {
        state.settle(summary.run);
    }
}

pub fn apply_toggle(
    mut events: EventReader<ToggleActivated>,
    cfg: Res<FlightConfig>,
    mut state: ResMut<ToggleState>,
    mut prefs: ResMut<Preferences>,
    mut marker: ResMut<ActiveTheme>,
    mut surface: ResMut<RenderSurface>,
    mut driver: ResMut<AnimationDriver>,
) {
    for ev in events.read() {
        let Some(request) = state.activate(ev.rect, &surface, &mut prefs, &cfg.toggle) else {
            continue;
        };
        marker.0 = state.theme;
        let run = driver.request(request, &mut surface);
        info!(theme = %state.theme, mode = ?request.mode, run = ?run, "theme toggled");
        state.run = run;
        if run.is_none() {
            // Nothing will report back; do not leave the button locked.
            state.in_flight = false;
        }
    }
}

pub fn style_toggle_button(
    state: Res<ToggleState>,
    mut q_button: Query<
        (&mut Node, &mut BackgroundColor, &mut BorderColor),
        With<ToggleButton>,
    >,
    mut q_label: Query<(&mut Text, &mut TextColor), With<ToggleLabel>>,
) {
    if !state.is_changed() {
        return;
    }
    let colors = palette::button_colors(state.theme);
    let size = if state.in_flight {
        BUTTON_SIZE * IN_FLIGHT_GROWTH
    } else {
        BUTTON_SIZE
    };
    for (mut node, mut fill, mut border) in &mut q_button {
        node.width = Val::Px(size);
        node.height = Val::Px(size);
        fill.0 = colors.fill;
        border.0 = colors.border;
    }
    for (mut text, mut color) in &mut q_label {
        let label = button_label(state.theme);
        if text.as_str() != label {
            *text = Text::new(label);
        }
        color.0 = colors.label;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SurfaceConfig;
    use crate::core::viewport::Viewport;
    use crate::preference::{MemoryStore, SchemeSignal, THEME_KEY};

    fn surface() -> RenderSurface {
        let viewport = Viewport::new(1280.0, 720.0);
        let mut s = RenderSurface::new(&SurfaceConfig::default(), viewport);
        s.mount(viewport);
        s
    }

    fn button_at(x: f32, y: f32) -> Rect {
        Rect::from_center_size(Vec2::new(x, y), Vec2::splat(BUTTON_SIZE))
    }

    #[test]
    fn activation_flips_persists_and_targets_new_theme() {
        let store = MemoryStore::new();
        let mut prefs = Preferences::new(store.clone(), SchemeSignal::unavailable());
        let mut state = ToggleState::new(Theme::Light);
        let s = surface();

        let req = state
            .activate(button_at(100.0, 100.0), &s, &mut prefs, &ToggleConfig::default())
            .expect("accepted");
        assert_eq!(state.theme, Theme::Dark);
        assert!(state.in_flight);
        assert_eq!(req.mode, AnimationMode::Bats);
        assert_eq!(req.origin, s.screen_to_surface(Vec2::new(100.0, 100.0)));
        assert_eq!(req.viewport, s.viewport());
        assert_eq!(store.snapshot().get(THEME_KEY).map(String::as_str), Some("dark"));
    }

    #[test]
    fn blocked_while_in_flight_by_default() {
        let mut prefs = Preferences::in_memory();
        let mut state = ToggleState::new(Theme::Dark);
        let s = surface();
        let cfg = ToggleConfig::default();
        assert!(state.activate(button_at(10.0, 10.0), &s, &mut prefs, &cfg).is_some());
        assert!(state.activate(button_at(10.0, 10.0), &s, &mut prefs, &cfg).is_none());
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn unblocked_toggles_alternate() {
        let mut prefs = Preferences::in_memory();
        let mut state = ToggleState::new(Theme::Light);
        let s = surface();
        let cfg = ToggleConfig {
            block_while_animating: false,
            ..default()
        };
        let modes: Vec<_> = (0..4)
            .filter_map(|_| state.activate(button_at(10.0, 10.0), &s, &mut prefs, &cfg))
            .map(|r| r.mode)
            .collect();
        assert_eq!(
            modes,
            vec![
                AnimationMode::Bats,
                AnimationMode::Butterflies,
                AnimationMode::Bats,
                AnimationMode::Butterflies
            ]
        );
        assert_eq!(prefs.read(), Theme::Light);
    }

    #[test]
    fn settle_ignores_other_runs() {
        let mut state = ToggleState {
            theme: Theme::Dark,
            in_flight: true,
            run: Some(RunId(2)),
        };
        state.settle(RunId(1));
        assert!(state.in_flight);
        state.settle(RunId(2));
        assert!(!state.in_flight);
        assert_eq!(state.run, None);
    }

    #[test]
    fn label_names_next_animation() {
        assert_eq!(button_label(Theme::Light), "bat");
        assert_eq!(button_label(Theme::Dark), "butterfly");
    }
}
