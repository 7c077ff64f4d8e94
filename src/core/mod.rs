pub mod config;
pub mod system;
pub mod theme;
pub mod viewport;
