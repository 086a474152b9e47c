use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, WayfindError};

/// Top-level configuration for the Wayfind application.
///
/// Loaded from `~/.wayfind/config.toml` by default. Each section corresponds
/// to one outbound collaborator or one inbound surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WayfindConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub poi: PoiConfig,
    #[serde(default)]
    pub guide: GuideConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
}

impl WayfindConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: WayfindConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| WayfindError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.guide.default_radius_m == 0 {
            return Err(WayfindError::Config(
                "guide.default_radius_m must be positive".to_string(),
            ));
        }
        if self.guide.default_radius_m > self.guide.max_radius_m {
            return Err(WayfindError::Config(format!(
                "guide.default_radius_m ({}) exceeds guide.max_radius_m ({})",
                self.guide.default_radius_m, self.guide.max_radius_m
            )));
        }
        if self.guide.max_poi_in_prompt == 0 {
            return Err(WayfindError::Config(
                "guide.max_poi_in_prompt must be positive".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 || self.poi.timeout_secs == 0 {
            return Err(WayfindError::Config(
                "outbound timeouts must be positive".to_string(),
            ));
        }
        if self.voice.debounce_ms == 0 {
            return Err(WayfindError::Config(
                "voice.debounce_ms must be positive".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(WayfindError::Config("llm.model must be set".to_string()));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Inbound HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum inbound requests per second across all clients.
    pub rate_limit_per_sec: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            rate_limit_per_sec: 20,
        }
    }
}

/// Language-model completion provider (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL up to and including the API version, e.g. `https://host/v1`.
    pub base_url: String,
    /// Model identifier sent with every completion request.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.together.xyz/v1".to_string(),
            model: "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string(),
            api_key_env: "TOGETHER_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Map-data services (Overpass search, Nominatim reverse geocoding).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiConfig {
    /// Overpass interpreter endpoint.
    pub overpass_url: String,
    /// Nominatim base URL.
    pub nominatim_url: String,
    /// User-Agent header; both services require an identifying agent.
    pub user_agent: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl PoiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("wayfind/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

/// Guide behaviour: persona and search bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Persona name used in the routing prompt.
    pub assistant_name: String,
    /// Radius used when the caller omits one.
    pub default_radius_m: u32,
    /// Upper bound for caller- and model-supplied radii.
    pub max_radius_m: u32,
    /// Maximum number of POIs shown to the answer composer.
    pub max_poi_in_prompt: usize,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            assistant_name: "Travel Guide".to_string(),
            default_radius_m: 1000,
            max_radius_m: 5000,
            max_poi_in_prompt: 20,
        }
    }
}

/// Voice front-end settings (speech capture and playback).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Silence window after the last recognition result before dispatch.
    pub debounce_ms: u64,
    /// Language tag for speech recognition.
    pub recognition_lang: String,
    /// Preferred synthesizer voice language.
    pub voice_lang: String,
    /// Speech rate (1.0 = normal).
    pub rate: f32,
    /// Speech pitch (1.0 = normal).
    pub pitch: f32,
    /// Speech volume (0.0 to 1.0).
    pub volume: f32,
}

impl VoiceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 900,
            recognition_lang: "en-US".to_string(),
            voice_lang: "en-GB".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = WayfindConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.poi.timeout_secs, 10);
        assert_eq!(config.guide.default_radius_m, 1000);
        assert_eq!(config.voice.debounce_ms, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
log_level = "debug"

[server]
host = "0.0.0.0"
port = 8080
rate_limit_per_sec = 5

[llm]
base_url = "http://localhost:11434/v1"
model = "llama3.2"
api_key_env = "OLLAMA_KEY"
timeout_secs = 45

[poi]
overpass_url = "https://overpass.example/api/interpreter"
timeout_secs = 5

[guide]
assistant_name = "City Buddy"
default_radius_m = 500
max_radius_m = 2000
max_poi_in_prompt = 8

[voice]
debounce_ms = 1200
voice_lang = "en-US"
"#;
        let file = create_temp_config(content);
        let config = WayfindConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "llama3.2");
        assert_eq!(config.llm.timeout(), Duration::from_secs(45));
        assert_eq!(config.poi.timeout(), Duration::from_secs(5));
        assert_eq!(config.guide.assistant_name, "City Buddy");
        assert_eq!(config.guide.max_poi_in_prompt, 8);
        assert_eq!(config.voice.debounce(), Duration::from_millis(1200));
        // Unset fields within a section keep their defaults.
        assert_eq!(config.voice.recognition_lang, "en-US");
        assert_eq!(config.poi.nominatim_url, "https://nominatim.openstreetmap.org");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[general]\nlog_level = \"warn\"\n");
        let config = WayfindConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.guide.max_radius_m, 5000);
    }

    #[test]
    fn test_config_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = WayfindConfig::load(file.path()).unwrap();
        assert_eq!(config.llm.api_key_env, "TOGETHER_API_KEY");
        assert_eq!(config.voice.voice_lang, "en-GB");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = WayfindConfig::load_or_default(Path::new("/nonexistent/wayfind.toml"));
        assert_eq!(config.server.port, 3030);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let file = create_temp_config("[server\nport = ");
        let result = WayfindConfig::load(file.path());
        assert!(matches!(result, Err(WayfindError::Config(_))));
    }

    #[test]
    fn test_load_rejects_default_radius_above_max() {
        let file = create_temp_config("[guide]\ndefault_radius_m = 9000\nmax_radius_m = 1000\n");
        let err = WayfindConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = WayfindConfig::default();
        config.guide.default_radius_m = 0;
        assert!(config.validate().is_err());

        let mut config = WayfindConfig::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = WayfindConfig::default();
        config.voice.debounce_ms = 0;
        assert!(config.validate().is_err());

        let mut config = WayfindConfig::default();
        config.guide.max_poi_in_prompt = 0;
        assert!(config.validate().is_err());

        let mut config = WayfindConfig::default();
        config.llm.model = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = WayfindConfig::default();
        config.server.port = 4040;
        config.save(&path).unwrap();

        let reloaded = WayfindConfig::load(&path).unwrap();
        assert_eq!(reloaded.server.port, 4040);
        assert_eq!(reloaded.llm.model, config.llm.model);
    }

    #[test]
    fn test_api_key_reads_named_env_var() {
        let mut config = LlmConfig::default();
        config.api_key_env = "WAYFIND_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(config.api_key().is_none());

        config.api_key_env = "WAYFIND_TEST_KEY_SET_BY_TEST".to_string();
        std::env::set_var("WAYFIND_TEST_KEY_SET_BY_TEST", "sk-test");
        assert_eq!(config.api_key().as_deref(), Some("sk-test"));
    }
}
