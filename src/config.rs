use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for Sterne
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub airtable: AirtableConfig,
    pub ratings: RatingsConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
    pub client: ClientConfig,
}

/// Connection settings for the Airtable REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirtableConfig {
    /// Airtable API root
    pub api_url: String,
    /// Base identifier (e.g. "appXXXXXXXXXXXXXX")
    pub base_id: String,
    /// Table identifier (e.g. "tblXXXXXXXXXXXXXX")
    pub table_id: String,
    /// Bearer token — literal value or "env:VAR_NAME" to read from environment
    pub api_key: Option<String>,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.airtable.com/v0".into(),
            base_id: String::new(),
            table_id: String::new(),
            api_key: Some("env:AIRTABLE_TOKEN".into()),
        }
    }
}

impl AirtableConfig {
    /// Resolve the API key, supporting "env:VAR_NAME" syntax
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.as_ref().and_then(|key| {
            if let Some(var_name) = key.strip_prefix("env:") {
                std::env::var(var_name).ok()
            } else if key.is_empty() {
                None
            } else {
                Some(key.clone())
            }
        })
    }
}

/// Rating semantics. These collapse the historical handler variants into
/// one facade: star bound, change-log tracking, and name validation are
/// configuration rather than separate code paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingsConfig {
    /// Upper bound for a rating (5 in the star-widget variant, 20 in the
    /// point-scale variant). Values are clamped to 0..=max_stars.
    pub max_stars: u32,
    /// Keep a newest-first change log in the LOG field
    pub track_log: bool,
    /// Reject creates with a missing first or last name (400) instead of
    /// coercing to an empty string
    pub strict_names: bool,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            max_stars: 5,
            track_log: true,
            strict_names: true,
        }
    }
}

/// Search behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Page size cap for suggestion results
    pub page_size: usize,
    /// Keystroke debounce interval for interactive clients, in milliseconds
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            debounce_ms: 300,
        }
    }
}

/// HTTP facade settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5050 }
    }
}

/// Client-side save policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Revert the locally edited rating when a save fails. When false the
    /// local value is kept so the user can retry, at the cost of possible
    /// divergence from the datastore.
    pub revert_on_failure: bool,
    /// How long transient status messages stay visible, in milliseconds
    pub status_clear_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            revert_on_failure: false,
            status_clear_ms: 2500,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Get the path to the sterne data directory
    pub fn data_dir(root: &Path) -> PathBuf {
        root.join(".sterne")
    }

    /// Get the config file path
    pub fn config_path(root: &Path) -> PathBuf {
        Self::data_dir(root).join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.airtable.api_url, "https://api.airtable.com/v0");
        assert_eq!(config.ratings.max_stars, 5);
        assert!(config.ratings.track_log);
        assert!(config.ratings.strict_names);
        assert_eq!(config.search.page_size, 10);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.server.port, 5050);
        assert!(!config.client.revert_on_failure);
    }

    #[test]
    fn test_parse_minimal_config() {
        // Config with only the airtable section should fill in defaults
        let toml_str = r#"
[airtable]
base_id = "appItENfteYmYF2Uk"
table_id = "tbl3kFfmqMlXJi8eh"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.airtable.base_id, "appItENfteYmYF2Uk");
        assert_eq!(config.airtable.api_key, Some("env:AIRTABLE_TOKEN".to_string()));
        assert_eq!(config.ratings.max_stars, 5);
    }

    #[test]
    fn test_parse_point_scale_variant() {
        let toml_str = r#"
[ratings]
max_stars = 20
track_log = false
strict_names = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ratings.max_stars, 20);
        assert!(!config.ratings.track_log);
        assert!(!config.ratings.strict_names);
    }

    #[test]
    fn test_api_key_resolve_literal() {
        let airtable = AirtableConfig {
            api_key: Some("pat-literal-key".to_string()),
            ..Default::default()
        };
        assert_eq!(airtable.resolve_api_key(), Some("pat-literal-key".to_string()));
    }

    #[test]
    fn test_api_key_resolve_env() {
        std::env::set_var("TEST_STERNE_TOKEN", "env-value");
        let airtable = AirtableConfig {
            api_key: Some("env:TEST_STERNE_TOKEN".to_string()),
            ..Default::default()
        };
        assert_eq!(airtable.resolve_api_key(), Some("env-value".to_string()));
        std::env::remove_var("TEST_STERNE_TOKEN");
    }

    #[test]
    fn test_api_key_resolve_missing_env() {
        let airtable = AirtableConfig {
            api_key: Some("env:TEST_STERNE_TOKEN_UNSET".to_string()),
            ..Default::default()
        };
        assert!(airtable.resolve_api_key().is_none());
    }

    #[test]
    fn test_api_key_resolve_empty() {
        let airtable = AirtableConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(airtable.resolve_api_key().is_none());
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.airtable.base_id = "appXYZ".into();
        config.ratings.max_stars = 20;
        config.client.revert_on_failure = true;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.airtable.base_id, "appXYZ");
        assert_eq!(deserialized.ratings.max_stars, 20);
        assert!(deserialized.client.revert_on_failure);
    }

    #[test]
    fn test_config_paths() {
        let root = Path::new("/tmp/demo");
        assert_eq!(Config::data_dir(root), PathBuf::from("/tmp/demo/.sterne"));
        assert_eq!(
            Config::config_path(root),
            PathBuf::from("/tmp/demo/.sterne/config.toml")
        );
    }
}
