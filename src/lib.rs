pub mod animation;
pub mod app;
pub mod core;
pub mod debug;
pub mod interaction;
pub mod preference;
pub mod rendering;

// Curated re-exports
pub use animation::{AnimationDriver, AnimationMode, LaunchRequest, RunFinished};
pub use app::ThemeFlightPlugin;
pub use core::config::FlightConfig;
pub use core::theme::Theme;
pub use interaction::{ToggleActivated, ToggleState};
pub use preference::Preferences;
pub use rendering::RenderSurface;
