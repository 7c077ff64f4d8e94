pub mod config;

pub use config::{
    BatConfig, ButterflyConfig, FlightConfig, PreferencesConfig, SurfaceConfig, ToggleConfig,
    WindowConfig,
};
