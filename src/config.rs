use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::ThumbnailQuality;
use crate::summarize::Provider;

pub const DEFAULT_LANGUAGES: &[&str] = &["en", "hi", "mr"];

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Transcript languages in priority order
    pub languages: Option<Vec<String>>,
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub max_retries: Option<u32>,
    /// Instruction placed before the transcript
    pub prompt: Option<String>,
    pub thumbnail: Option<ThumbnailQuality>,
    pub save: Option<bool>,
    pub save_dir: Option<PathBuf>,
    pub retention_cap: Option<usize>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
languages = ["mr", "hi", "en"]
provider = "openai"
model = "gpt-4o"
temperature = 0.8
max_tokens = 4096
save = true
save_dir = "notes"
retention_cap = 20
thumbnail = "maxres"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.languages(), vec!["mr", "hi", "en"]);
        assert_eq!(config.provider, Some(Provider::Openai));
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.temperature, Some(0.8));
        assert_eq!(config.max_tokens, Some(4096));
        assert_eq!(config.save, Some(true));
        assert_eq!(config.save_dir, Some(PathBuf::from("notes")));
        assert_eq!(config.retention_cap, Some(20));
        assert_eq!(config.thumbnail, Some(ThumbnailQuality::Maxres));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.provider.is_none());
        assert!(config.prompt.is_none());
        assert_eq!(config.languages(), vec!["en", "hi", "mr"]);
    }

    #[test]
    fn test_empty_language_list_falls_back() {
        let config: Config = toml::from_str("languages = []").unwrap();
        assert_eq!(config.languages(), vec!["en", "hi", "mr"]);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(toml::from_str::<Config>(r#"provider = "cohere""#).is_err());
    }
}
