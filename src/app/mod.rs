pub mod plugin;

pub use plugin::{log_config_diagnostics, ConfigDiagnostics, ThemeFlightPlugin};
