use crate::caption::WindowSize;
use crate::error::{CaptionError, Result};
use crate::media::QualitySettings;
use crate::subtitle::HighlightMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assemblyai_api_key: Option<String>,
    /// Language code passed to the provider; auto-detected when unset.
    pub language: Option<String>,
    /// Font used when a style file leaves `fontFamily` unset.
    pub font_family: Option<String>,
    pub window_size: WindowSize,
    pub highlight_mode: HighlightMode,
    pub quality: QualitySettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assemblyai_api_key: None,
            language: None,
            font_family: None,
            window_size: WindowSize::default(),
            highlight_mode: HighlightMode::default(),
            quality: QualitySettings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents)?;
            }
        }

        // Override with environment variables
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// Apply `ASSEMBLYAI_API_KEY` and `WORDCAP_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ASSEMBLYAI_API_KEY") {
            self.assemblyai_api_key = Some(key);
        }
        if let Some(language) = lookup("WORDCAP_LANGUAGE") {
            self.language = Some(language);
        }
        if let Some(font) = lookup("WORDCAP_FONT_FAMILY") {
            self.font_family = Some(font);
        }
        if let Some(size) = lookup("WORDCAP_WINDOW_SIZE") {
            self.window_size = size.parse().map_err(|e: String| {
                CaptionError::Config(format!("WORDCAP_WINDOW_SIZE: {}", e))
            })?;
        }
        if let Some(mode) = lookup("WORDCAP_HIGHLIGHT_MODE") {
            self.highlight_mode = mode.parse().map_err(|e: String| {
                CaptionError::Config(format!("WORDCAP_HIGHLIGHT_MODE: {}", e))
            })?;
        }
        Ok(())
    }

    /// Check the settings needed by a command. Transcription needs an API key.
    pub fn validate(&self, transcribing: bool) -> Result<()> {
        if transcribing && self.assemblyai_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(CaptionError::Config(
                "ASSEMBLYAI_API_KEY not set. Export it with: export ASSEMBLYAI_API_KEY=..."
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("wordcap").join("config.toml"))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path().ok_or_else(|| {
            CaptionError::Config("Could not determine config directory".to_string())
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CaptionError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
