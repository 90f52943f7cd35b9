use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::persona;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the Gemini API; `GEMINI_API_KEY` takes effect when unset
    pub gemini_api_key: Option<String>,

    /// Model identifier sent with every generation request
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Cap on generated tokens per reply
    pub max_output_tokens: u32,

    /// Assistant persona and widget behavior
    pub assistant: AssistantConfig,
}

/// Persona texts and quick-reply behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub system_instruction: String,
    pub greeting: String,
    pub cleared_greeting: String,
    pub fallback_reply: String,
    pub suggested_prompts: Vec<String>,
    pub suggestion_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini_api_key: None,
            model: persona::DEFAULT_MODEL.to_string(),
            temperature: persona::DEFAULT_TEMPERATURE,
            max_output_tokens: persona::DEFAULT_MAX_OUTPUT_TOKENS,
            assistant: AssistantConfig::default(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            system_instruction: persona::SYSTEM_INSTRUCTION.trim().to_string(),
            greeting: persona::GREETING.to_string(),
            cleared_greeting: persona::CLEARED_GREETING.to_string(),
            fallback_reply: persona::FALLBACK_REPLY.to_string(),
            suggested_prompts: persona::SUGGESTED_PROMPTS.clone(),
            suggestion_threshold: persona::DEFAULT_SUGGESTION_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from `~/.foliobot/config.toml`, falling back to defaults
    pub fn load() -> Result<Self> {
        let home = Self::foliobot_home()?;
        fs::create_dir_all(&home).context("Failed to create .foliobot directory")?;

        let config_path = home.join("config.toml");
        if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to `~/.foliobot/config.toml`
    pub fn save(&self) -> Result<()> {
        let home = Self::foliobot_home()?;
        fs::create_dir_all(&home).context("Failed to create .foliobot directory")?;

        let config_path = home.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn foliobot_home() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".foliobot"))
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.is_some() || std::env::var("GEMINI_API_KEY").is_ok()
    }

    /// Get the API key from config or environment
    pub fn api_key(&self) -> Option<String> {
        self.gemini_api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }
}
