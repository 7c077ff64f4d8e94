//! Session lifetime helpers: timed exit and config hot reload.

pub mod config_hot_reload;
pub mod deadline;

pub use config_hot_reload::{ConfigHotReloadPlugin, ConfigReloadSettings};
pub use deadline::{SessionDeadline, SessionDeadlinePlugin};
