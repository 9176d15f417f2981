pub mod hudkit_config;
pub mod paths;
pub mod plugin_settings;

pub use hudkit_config::{ConfigError, HostConfig, HudkitConfig, LoggingConfig};
pub use paths::ProjectPaths;
pub use plugin_settings::{PluginSettings, SettingsStore};
