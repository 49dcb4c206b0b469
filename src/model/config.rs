use serde::{Deserialize, Serialize};

/// Configuration from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where list and category data live (default: $XDG_DATA_HOME/basket)
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// How many suggestions `bk suggest` shows by default
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// JSON file of `{name, category}` records merged into suggestions.
    /// Relative paths resolve against the storage directory.
    #[serde(default = "default_defaults_file")]
    pub defaults_file: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        SuggestionConfig {
            limit: default_limit(),
            defaults_file: default_defaults_file(),
        }
    }
}

fn default_limit() -> usize {
    15
}

fn default_defaults_file() -> String {
    "defaultItems.json".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Color category headers with the category's color
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig { color: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.suggestions.limit, 15);
        assert_eq!(config.suggestions.defaults_file, "defaultItems.json");
        assert!(config.ui.color);
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
[storage]
dir = "/tmp/basket"

[suggestions]
limit = 5
"#,
        )
        .unwrap();
        assert_eq!(config.storage.dir.as_deref(), Some("/tmp/basket"));
        assert_eq!(config.suggestions.limit, 5);
        assert_eq!(config.suggestions.defaults_file, "defaultItems.json");
    }
}
