//! Application configuration module.
//!
//! Manages the TOML config file holding catalog and feed settings.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, TmdbSettings};
pub use paths::resolve_config_path;
