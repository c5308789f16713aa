//! Fixture paths shared by the integration tests.

#![allow(dead_code)] // each test binary uses a different subset

use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Trainee shows empathy and takes ownership; scores 90.
pub fn passing_transcript_fixture() -> PathBuf {
    fixture("passing_transcript.json")
}

/// Trainee uses a disallowed phrase; scores 50.
pub fn rude_transcript_fixture() -> PathBuf {
    fixture("rude_transcript.json")
}

/// Customer messages only; scores the neutral floor.
pub fn empty_trainee_transcript_fixture() -> PathBuf {
    fixture("empty_trainee_transcript.json")
}

pub fn valid_config_fixture() -> PathBuf {
    fixture("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture("invalid_config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_exist() {
        for path in [
            passing_transcript_fixture(),
            rude_transcript_fixture(),
            empty_trainee_transcript_fixture(),
            valid_config_fixture(),
            invalid_config_fixture(),
        ] {
            assert!(path.exists(), "missing fixture: {}", path.display());
        }
    }
}
