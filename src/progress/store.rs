//! File-backed progress store.
//!
//! One JSON blob keyed by persona slug holds every persona's attempt history.
//! The store is single-writer: the evaluation completion path is the only
//! code that records. Loading degrades to the initial zero state on a missing
//! or corrupt blob and merges partial blobs over defaults, so personas added
//! in later releases start at zero instead of being absent.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::persona::PersonaKind;

/// Score at or above which an attempt passes.
const PASS_SCORE: u8 = 80;

// ─────────────────────────────────────────────────────────────────
// Agent Progress
// ─────────────────────────────────────────────────────────────────

/// Attempt history for one persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProgress {
    /// Once true, never reverts to false.
    pub passed: bool,

    /// Highest score across all attempts. Monotonically non-decreasing.
    pub best_score: u8,

    /// Completed evaluations against this persona.
    pub attempts: u32,

    /// When the most recent attempt was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
}

impl Default for AgentProgress {
    fn default() -> Self {
        Self {
            passed: false,
            best_score: 0,
            attempts: 0,
            last_attempt: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Progress Store
// ─────────────────────────────────────────────────────────────────

/// Persisted per-persona progress map.
pub struct ProgressStore {
    path: PathBuf,
    state: BTreeMap<PersonaKind, AgentProgress>,
}

impl ProgressStore {
    /// Open the store backed by the given file, loading any persisted state.
    ///
    /// Never fails: a missing or unparseable blob falls back to the initial
    /// zero state, and a partial blob is merged over it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load_state(&path);
        Self { path, state }
    }

    /// Record one completed evaluation and persist the full map.
    pub fn record(&mut self, kind: PersonaKind, score: u8) -> AgentProgress {
        let entry = self.state.entry(kind).or_default();

        entry.passed = score >= PASS_SCORE || entry.passed;
        entry.best_score = entry.best_score.max(score);
        entry.attempts += 1;
        entry.last_attempt = Some(Utc::now());

        let updated = entry.clone();
        debug!(
            persona = kind.slug(),
            score,
            best = updated.best_score,
            attempts = updated.attempts,
            "Recorded attempt"
        );
        self.save();
        updated
    }

    /// Restore every persona to the initial zero state and persist it.
    pub fn reset(&mut self) {
        self.state = initial_state();
        self.save();
    }

    /// True iff every known persona has passed.
    pub fn all_passed(&self) -> bool {
        self.state.values().all(|p| p.passed)
    }

    /// Progress for one persona.
    pub fn progress(&self, kind: PersonaKind) -> &AgentProgress {
        // initial_state covers every kind, so the entry always exists.
        &self.state[&kind]
    }

    /// The full progress map, in catalog key order.
    pub fn snapshot(&self) -> &BTreeMap<PersonaKind, AgentProgress> {
        &self.state
    }

    /// Persist the current state. Persistence failures are logged and
    /// swallowed; they never fail the recording caller.
    fn save(&self) {
        if let Err(e) = self.try_save() {
            warn!(path = %self.path.display(), error = %e, "Failed to persist progress");
        }
    }

    fn try_save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.state)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}

/// The zero/false map covering every catalog persona.
fn initial_state() -> BTreeMap<PersonaKind, AgentProgress> {
    PersonaKind::all()
        .iter()
        .map(|k| (*k, AgentProgress::default()))
        .collect()
}

/// Load persisted state, merged over the initial map.
fn load_state(path: &Path) -> BTreeMap<PersonaKind, AgentProgress> {
    let mut state = initial_state();

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No persisted progress, starting fresh");
            return state;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read progress, starting fresh");
            return state;
        }
    };

    // Parse slugs loosely so unknown personas from other versions are
    // ignored rather than poisoning the whole blob.
    match serde_json::from_str::<BTreeMap<String, AgentProgress>>(&content) {
        Ok(parsed) => {
            for (slug, progress) in parsed {
                if let Ok(kind) = slug.parse::<PersonaKind>() {
                    state.insert(kind, progress);
                } else {
                    debug!(slug, "Ignoring progress entry for unknown persona");
                }
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt progress blob, starting fresh");
        }
    }

    state
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
