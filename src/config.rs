//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::i18n::Language;
use crate::player::EngineConfig;

const APP_DIR: &str = "prince_tv";

/// Trial gate and controls behaviour of the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_trial_secs")]
    pub trial_duration_secs: u32,
    #[serde(default = "default_hide_ms")]
    pub controls_hide_ms: u64,
    /// Hand HLS manifests straight to the media element when it can play them
    #[serde(default = "default_true")]
    pub prefer_native_hls: bool,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_trial_secs() -> u32 { 120 }
fn default_hide_ms() -> u64 { 3000 }
fn default_true() -> bool { true }
fn default_match_minutes() -> i64 { 90 }
fn default_log_level() -> String { "info".to_string() }
fn default_football_url() -> String { "https://api.football-data.org/v4".to_string() }

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            trial_duration_secs: default_trial_secs(),
            controls_hide_ms: default_hide_ms(),
            prefer_native_hls: true,
            engine: EngineConfig::default(),
        }
    }
}

impl PlayerConfig {
    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Backend
    #[serde(default)]
    pub backend_url: String,
    #[serde(default)]
    pub backend_anon_key: String,
    // Football schedule
    #[serde(default = "default_football_url")]
    pub football_api_url: String,
    #[serde(default)]
    pub football_api_key: String,
    #[serde(default = "default_match_minutes")]
    pub match_duration_minutes: i64,
    // UI
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default)]
    pub remember_email: bool,
    #[serde(default)]
    pub saved_email: String,
    // Logging
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Extra `target=level` directives appended to the filter
    #[serde(default)]
    pub log_filters: Vec<String>,
    #[serde(default)]
    pub player: PlayerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            backend_anon_key: String::new(),
            football_api_url: default_football_url(),
            football_api_key: String::new(),
            match_duration_minutes: default_match_minutes(),
            language: Language::default(),
            dark_mode: true,
            remember_email: false,
            saved_email: String::new(),
            log_level: default_log_level(),
            log_filters: Vec::new(),
            player: PlayerConfig::default(),
        }
    }
}

impl AppConfig {
    fn config_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Load from disk, falling back to defaults, then apply env overrides
    pub fn load() -> Self {
        let path = Self::config_path();
        let mut config = Self::from_file(&path).unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn from_file(path: &PathBuf) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Deployment settings can come from the environment instead of the file
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut String); 4] = [
            ("PRINCE_TV_BACKEND_URL", &mut self.backend_url),
            ("PRINCE_TV_BACKEND_KEY", &mut self.backend_anon_key),
            ("PRINCE_TV_FOOTBALL_API_URL", &mut self.football_api_url),
            ("PRINCE_TV_FOOTBALL_API_KEY", &mut self.football_api_key),
        ];
        for (key, field) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *field = value.trim().to_string();
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        fs::create_dir_all(Self::config_dir())?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::config_path(), content)?;
        Ok(())
    }

    pub fn backend_configured(&self) -> bool {
        !self.backend_url.is_empty() && !self.backend_anon_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.player.trial_duration_secs, 120);
        assert_eq!(config.player.controls_hide_ms, 3000);
        assert!(config.player.prefer_native_hls);
        assert!(config.player.engine.low_latency);
        assert!(!config.player.engine.with_credentials);
        assert_eq!(config.match_duration_minutes, 90);
        assert_eq!(config.language, Language::Sw);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_player_section() {
        let json = r#"{"player": {"trial_duration_secs": 30}, "language": "en"}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.player.trial_duration_secs, 30);
        assert_eq!(config.player.controls_hide_delay(), Duration::from_secs(3));
        assert_eq!(config.language, Language::En);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PRINCE_TV_BACKEND_URL", " https://abc.supabase.co "),
            ("PRINCE_TV_BACKEND_KEY", "anon"),
            ("PRINCE_TV_FOOTBALL_API_KEY", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.football_api_key = "from-file".to_string();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend_url, "https://abc.supabase.co");
        assert_eq!(config.backend_anon_key, "anon");
        // Blank values do not clobber the file
        assert_eq!(config.football_api_key, "from-file");
        assert!(config.backend_configured());
    }
}
