//! Configuration file support

use gridtalk_chat::ImageRetention;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for gridtalk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model for text-only requests
    pub model: Option<String>,
    /// Model for requests carrying an image
    pub vision_model: Option<String>,
    /// API base URL
    pub base_url: Option<String>,
    /// Number of history turns sent to the backend
    pub history_limit: Option<usize>,
    /// Pending-image policy: "retain" or "consume-once"
    pub image_retention: Option<String>,
    /// UI theme: "dark" or "light"
    pub theme: Option<String>,
    /// API key (alternative to the GROQ_API_KEY environment variable)
    pub api_key: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridtalk")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("GRIDTALK_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some(gridtalk_ai::models::DEFAULT_TEXT_MODEL.to_string()),
            vision_model: Some(gridtalk_ai::models::DEFAULT_VISION_MODEL.to_string()),
            base_url: None,
            history_limit: Some(6),
            image_retention: Some("retain".to_string()),
            theme: Some("dark".to_string()),
            api_key: None,
        };

        default_config.save()?;
        Ok(path)
    }

    /// Get the API key, checking config then environment
    pub fn get_api_key(&self) -> Option<String> {
        if self.api_key.is_some() {
            return self.api_key.clone();
        }
        std::env::var("GROQ_API_KEY").ok()
    }

    /// The configured pending-image policy
    pub fn image_retention(&self) -> ImageRetention {
        parse_retention(self.image_retention.as_deref())
    }
}

/// Parse a retention policy name; unknown values fall back to the default
pub fn parse_retention(s: Option<&str>) -> ImageRetention {
    match s {
        Some("consume-once") => ImageRetention::ConsumeOnce,
        _ => ImageRetention::default(),
    }
}

/// Example config contents shown after --init-config
pub fn example_config() -> &'static str {
    r#"model = "llama-3.3-70b-versatile"
vision_model = "meta-llama/llama-4-scout-17b-16e-instruct"
history_limit = 6
image_retention = "retain"   # or "consume-once"
theme = "dark"
# api_key = "gsk_..."        # or set GROQ_API_KEY
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retention() {
        assert_eq!(
            parse_retention(Some("consume-once")),
            ImageRetention::ConsumeOnce
        );
        assert_eq!(parse_retention(Some("retain")), ImageRetention::Retain);
        assert_eq!(parse_retention(Some("bogus")), ImageRetention::Retain);
        assert_eq!(parse_retention(None), ImageRetention::Retain);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.history_limit, Some(6));
        assert_eq!(config.image_retention(), gridtalk_chat::ImageRetention::Retain);
    }
}
