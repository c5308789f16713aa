//! Trainer configuration.
//!
//! Sources, strongest first: `CLAIMSIM_*` environment variables, a TOML file
//! (explicit `--config`, else the first hit in the search path), then the
//! built-in defaults. Paths may use `~` and `$VAR`; they are expanded after
//! the overrides are applied.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub session: SessionSettings,
    pub transport: TransportSettings,
    pub logging: LoggingSettings,
    pub storage: StorageSettings,
}

/// Session behavior: guardrail identity, greeting, and turn detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Company the trainee represents; the moderation guardrail is phrased
    /// relative to it.
    pub company_name: String,

    /// Synthetic trainee utterance sent after connect so the persona speaks
    /// first.
    pub greeting_trigger: String,

    /// Voice-activity detection threshold (0.0-1.0).
    pub vad_threshold: f64,

    /// Audio kept from before detected speech, milliseconds.
    pub vad_prefix_padding_ms: u32,

    /// Silence that ends a trainee turn, milliseconds.
    pub vad_silence_duration_ms: u32,

    /// Whether persona audio playback starts enabled.
    pub playback_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Realtime agent runtime WebSocket URL.
    pub realtime_url: String,

    /// HTTP endpoint that mints short-lived session credentials.
    pub credential_url: String,

    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// trace, debug, info, warn, or error.
    pub level: String,

    /// Log file path; omit to log to the console only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Rotated log files to keep.
    pub max_files: u32,

    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Holds progress.json, preferences.json, and exported transcripts.
    pub data_dir: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            company_name: "Meridian Mutual".to_string(),
            greeting_trigger: "hi".to_string(),
            vad_threshold: 0.9,
            vad_prefix_padding_ms: 300,
            vad_silence_duration_ms: 500,
            playback_enabled: true,
        }
    }
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            realtime_url: "wss://realtime.claimsim.dev/v1".to_string(),
            credential_url: "http://localhost:3000/api/session".to_string(),
            connect_timeout_ms: 30_000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.claimsim".to_string(),
        }
    }
}

impl TrainerConfig {
    /// Resolve the effective configuration: file (if any), env overrides,
    /// path expansion, validation.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = match locate_config_file(config_path)? {
            Some(path) => {
                let content = fs::read_to_string(&path)
                    .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
                let parsed = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                    message: path.display().to_string(),
                    source: Some(e),
                })?;
                info!(path = %path.display(), "Configuration loaded from file");
                parsed
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        env_override("CLAIMSIM_COMPANY_NAME", &mut self.session.company_name);
        env_override("CLAIMSIM_GREETING_TRIGGER", &mut self.session.greeting_trigger);
        env_override_bool("CLAIMSIM_PLAYBACK_ENABLED", &mut self.session.playback_enabled);

        env_override("CLAIMSIM_REALTIME_URL", &mut self.transport.realtime_url);
        env_override("CLAIMSIM_CREDENTIAL_URL", &mut self.transport.credential_url);
        if let Some(ms) = env_value("CLAIMSIM_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.transport.connect_timeout_ms = ms;
        }

        env_override("CLAIMSIM_LOG_LEVEL", &mut self.logging.level);
        if let Some(file) = env_value("CLAIMSIM_LOG_FILE") {
            self.logging.file = Some(file);
        }
        env_override_bool("CLAIMSIM_LOG_JSON", &mut self.logging.json_format);

        env_override("CLAIMSIM_DATA_DIR", &mut self.storage.data_dir);
    }

    fn expand_paths(&mut self) {
        self.storage.data_dir = expand_path(&self.storage.data_dir);
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let realtime = &self.transport.realtime_url;
        if !realtime.starts_with("ws://") && !realtime.starts_with("wss://") {
            return Err(Error::Config(
                "Realtime URL must start with ws:// or wss://".to_string(),
            ));
        }

        let credential = &self.transport.credential_url;
        if !credential.starts_with("http://") && !credential.starts_with("https://") {
            return Err(Error::Config(
                "Credential URL must start with http:// or https://".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.session.vad_threshold) {
            return Err(Error::Config(
                "vad_threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir)
    }

    /// Where the progress blob lives.
    pub fn progress_path(&self) -> PathBuf {
        self.data_dir().join("progress.json")
    }

    /// Where the playback preference lives.
    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir().join("preferences.json")
    }
}

/// An explicit path must exist; otherwise the first search-path hit wins and
/// no hit at all is fine.
fn locate_config_file(explicit: Option<&str>) -> Result<Option<PathBuf>> {
    if let Some(raw) = explicit {
        let path = PathBuf::from(shellexpand::tilde(raw).as_ref());
        return if path.exists() {
            Ok(Some(path))
        } else {
            Err(Error::ConfigNotFound { path })
        };
    }

    let candidates = [
        Some(PathBuf::from("claimsim.toml")),
        dirs::config_dir().map(|p| p.join("claimsim").join("config.toml")),
        dirs::home_dir().map(|p| p.join(".claimsim").join("config.toml")),
    ];
    for candidate in candidates.into_iter().flatten() {
        if candidate.exists() {
            debug!(path = %candidate.display(), "Found configuration file");
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_override(key: &str, target: &mut String) {
    if let Some(value) = env_value(key) {
        *target = value;
    }
}

fn env_override_bool(key: &str, target: &mut bool) {
    if let Some(value) = env_value(key) {
        *target = value == "1" || value.eq_ignore_ascii_case("true");
    }
}

fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Write a commented default config, for `config init`.
pub fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let config_path = match path {
        Some(p) => PathBuf::from(expand_path(p)),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".claimsim")
            .join("config.toml"),
    };

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    }
    fs::write(&config_path, DEFAULT_CONFIG_TOML)
        .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

    println!("Configuration file created: {}", config_path.display());
    Ok(())
}

const DEFAULT_CONFIG_TOML: &str = r#"# ClaimSim Configuration
# https://github.com/claimsim/claimsim

[session]
# Name of the company the trainee represents (used by the moderation guardrail)
company_name = "Meridian Mutual"

# Synthetic trainee utterance sent after connect so the persona greets first
greeting_trigger = "hi"

# Voice-activity detection: sensitivity and turn boundaries
vad_threshold = 0.9
vad_prefix_padding_ms = 300
vad_silence_duration_ms = 500

# Whether persona audio playback starts enabled
playback_enabled = true

[transport]
# Realtime agent runtime WebSocket URL
realtime_url = "wss://realtime.claimsim.dev/v1"

# HTTP endpoint that mints short-lived session credentials
credential_url = "http://localhost:3000/api/session"

# Connection timeout in milliseconds
connect_timeout_ms = 30000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.claimsim/logs/claimsim.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false

[storage]
# Base data directory (progress, preferences, exported transcripts)
data_dir = "~/.claimsim"
"#;
