use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_enable() -> bool {
    true
}

/// Settings for one plugin, the `[plugins.<id>]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Master switch checked at the top of every plugin handler
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Plugin-specific keys
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            enable: true,
            extra: toml::Table::new(),
        }
    }
}

impl PluginSettings {
    pub fn disabled() -> Self {
        Self {
            enable: false,
            ..Self::default()
        }
    }

    /// Read a non-negative integer setting
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.extra
            .get(key)
            .and_then(toml::Value::as_integer)
            .and_then(|value| u64::try_from(value).ok())
    }

    pub fn set_u64(&mut self, key: &str, value: u64) {
        let value = i64::try_from(value).unwrap_or(i64::MAX);
        self.extra.insert(key.to_string(), toml::Value::Integer(value));
    }
}

/// Host-owned settings for every plugin, keyed by plugin id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsStore {
    plugins: BTreeMap<String, PluginSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(plugins: &BTreeMap<String, PluginSettings>) -> Self {
        Self {
            plugins: plugins.clone(),
        }
    }

    pub fn get(&self, plugin_id: &str) -> Option<&PluginSettings> {
        self.plugins.get(plugin_id)
    }

    /// Settings for `plugin_id`, defaulting to enabled when none are stored
    pub fn entry(&mut self, plugin_id: &str) -> &mut PluginSettings {
        self.plugins.entry(plugin_id.to_string()).or_default()
    }

    pub fn is_enabled(&self, plugin_id: &str) -> bool {
        self.get(plugin_id).is_none_or(|settings| settings.enable)
    }

    pub fn to_map(&self) -> BTreeMap<String, PluginSettings> {
        self.plugins.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_plugin_defaults_to_enabled() {
        let mut store = SettingsStore::new();
        assert!(store.is_enabled("current_status"));
        assert!(store.entry("current_status").enable);
    }

    #[test]
    fn test_extra_keys_survive_parse() {
        let settings: PluginSettings =
            toml::from_str("enable = false\nidle_timeout_secs = 45\n").unwrap();
        assert!(!settings.enable);
        assert_eq!(settings.get_u64("idle_timeout_secs"), Some(45));
        assert_eq!(settings.get_u64("missing"), None);
    }

    #[test]
    fn test_negative_integer_is_not_u64() {
        let settings: PluginSettings = toml::from_str("idle_timeout_secs = -3\n").unwrap();
        assert!(settings.enable);
        assert_eq!(settings.get_u64("idle_timeout_secs"), None);
    }
}
