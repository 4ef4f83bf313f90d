use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

use crate::defaults;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub asr: AsrConfig,
    pub honeypot: HoneypotConfig,
}

/// Audio ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
    pub chunk_duration_ms: u32,
}

/// Speech recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AsrConfig {
    /// "vosk" for the offline engine, "mock" for the placeholder engine.
    pub backend: String,
    /// Language code: en, hi, or mix.
    pub language: String,
    /// Directory holding offline model directories.
    pub model_dir: String,
}

/// Honeypot agent configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoneypotConfig {
    /// Persona the counter-agent plays once the call escalates.
    pub persona: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            chunk_duration_ms: defaults::CHUNK_DURATION_MS,
        }
    }
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            backend: "vosk".to_string(),
            language: "en".to_string(),
            model_dir: defaults::MODEL_DIR.to_string(),
        }
    }
}

impl Default for HoneypotConfig {
    fn default() -> Self {
        Self {
            persona: defaults::HONEYPOT_PERSONA.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Errors for invalid TOML propagate.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CALLWARDEN_LANGUAGE → asr.language
    /// - CALLWARDEN_MODEL_DIR → asr.model_dir
    /// - CALLWARDEN_AUDIO_DEVICE → audio.device
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("CALLWARDEN_LANGUAGE")
            && !language.is_empty()
        {
            self.asr.language = language;
        }

        if let Ok(model_dir) = std::env::var("CALLWARDEN_MODEL_DIR")
            && !model_dir.is_empty()
        {
            self.asr.model_dir = model_dir;
        }

        if let Ok(device) = std::env::var("CALLWARDEN_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/callwarden/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("callwarden").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_callwarden_env() {
        remove_env("CALLWARDEN_LANGUAGE");
        remove_env("CALLWARDEN_MODEL_DIR");
        remove_env("CALLWARDEN_AUDIO_DEVICE");
    }

    #[test]
    fn default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.chunk_duration_ms, 1000);

        assert_eq!(config.asr.backend, "vosk");
        assert_eq!(config.asr.language, "en");
        assert_eq!(config.asr.model_dir, "models");

        assert_eq!(config.honeypot.persona, defaults::HONEYPOT_PERSONA);
    }

    #[test]
    fn load_from_toml_file() {
        let toml_content = r#"
            [audio]
            device = "pipewire"
            chunk_duration_ms = 500

            [asr]
            backend = "mock"
            language = "mix"

            [honeypot]
            persona = "Distracted Accountant"
        "#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.audio.device, Some("pipewire".to_string()));
        assert_eq!(config.audio.chunk_duration_ms, 500);
        // Unspecified fields keep defaults.
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.asr.backend, "mock");
        assert_eq!(config.asr.language, "mix");
        assert_eq!(config.honeypot.persona, "Distracted Accountant");
    }

    #[test]
    fn load_invalid_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not [valid toml").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn load_or_default_missing_file_returns_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_or_default_invalid_toml_propagates_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[[[broken").unwrap();
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_callwarden_env();

        set_env("CALLWARDEN_LANGUAGE", "hi");
        set_env("CALLWARDEN_MODEL_DIR", "/opt/models");
        set_env("CALLWARDEN_AUDIO_DEVICE", "usb-mic");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.asr.language, "hi");
        assert_eq!(config.asr.model_dir, "/opt/models");
        assert_eq!(config.audio.device, Some("usb-mic".to_string()));

        clear_callwarden_env();
    }

    #[test]
    fn empty_env_vars_do_not_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_callwarden_env();

        set_env("CALLWARDEN_LANGUAGE", "");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.asr.language, "en");

        clear_callwarden_env();
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
