//! Persisted trainee preferences.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Preferences that survive restarts. Currently just the playback toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPrefs {
    /// Whether synthesized persona audio is audible.
    pub playback_enabled: bool,
}

impl Default for AudioPrefs {
    fn default() -> Self {
        Self {
            playback_enabled: true,
        }
    }
}

impl AudioPrefs {
    /// Load preferences, falling back to `default` on a missing or corrupt
    /// file. Never fails the caller.
    pub fn load(path: &Path, default: AudioPrefs) -> AudioPrefs {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Corrupt preferences, using defaults");
                    default
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No persisted preferences");
                default
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read preferences, using defaults");
                default
            }
        }
    }

    /// Persist preferences. Best effort; failures are logged and swallowed.
    pub fn save(&self, path: &Path) {
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            fs::write(path, json)
        })();

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Failed to persist preferences");
        }
    }
}
