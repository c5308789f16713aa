//! Core types for the persona system.
//!
//! Personas are scripted simulated customers. Their behavioral prompts are
//! opaque text shipped as bundled TOML configs; the core never parses them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Persona Kind
// ─────────────────────────────────────────────────────────────────

/// The six customer personas in the shipped training catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaKind {
    /// Frustrated customer whose auto claim was denied.
    AutoClaim,
    /// Confused elderly customer who needs patient guidance.
    ConfusedElderly,
    /// General customer-service complaint caller.
    CustomerService,
    /// Homeowner dealing with water damage.
    HomeWater,
    /// Homeowner whose house burned down.
    HouseFire,
    /// Driver with a cracked windshield.
    Windshield,
}

impl PersonaKind {
    /// Slug used in file paths, storage keys, and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaKind::AutoClaim => "auto-claim",
            PersonaKind::ConfusedElderly => "confused-elderly",
            PersonaKind::CustomerService => "customer-service",
            PersonaKind::HomeWater => "home-water",
            PersonaKind::HouseFire => "house-fire",
            PersonaKind::Windshield => "windshield",
        }
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PersonaKind::AutoClaim => "Auto Claim",
            PersonaKind::ConfusedElderly => "Confused Elderly",
            PersonaKind::CustomerService => "Customer Service",
            PersonaKind::HomeWater => "Home Water Damage",
            PersonaKind::HouseFire => "House Fire",
            PersonaKind::Windshield => "Windshield Damage",
        }
    }

    /// All personas in catalog order.
    pub fn all() -> &'static [PersonaKind] {
        &[
            PersonaKind::AutoClaim,
            PersonaKind::ConfusedElderly,
            PersonaKind::CustomerService,
            PersonaKind::HomeWater,
            PersonaKind::HouseFire,
            PersonaKind::Windshield,
        ]
    }

    /// The persona after this one in catalog order, wrapping at the end.
    pub fn next(&self) -> PersonaKind {
        let all = Self::all();
        let idx = all.iter().position(|k| k == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

impl fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PersonaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto-claim" | "autoclaim" | "auto_claim" => Ok(PersonaKind::AutoClaim),
            "confused-elderly" | "confusedelderly" | "confused_elderly" => {
                Ok(PersonaKind::ConfusedElderly)
            }
            "customer-service" | "customerservice" | "customer_service" => {
                Ok(PersonaKind::CustomerService)
            }
            "home-water" | "homewater" | "home_water" => Ok(PersonaKind::HomeWater),
            "house-fire" | "housefire" | "house_fire" => Ok(PersonaKind::HouseFire),
            "windshield" => Ok(PersonaKind::Windshield),
            _ => Err(format!(
                "Unknown persona '{}'. Valid: {}",
                s,
                PersonaKind::all()
                    .iter()
                    .map(|k| k.slug())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Config (loaded from bundled TOML)
// ─────────────────────────────────────────────────────────────────

/// Persona definition as shipped in the bundled TOML files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Which persona this config defines.
    pub kind: PersonaKind,

    /// Voice tag for the synthesized persona audio.
    pub voice: String,

    /// One-line description shown when the conversation may hand off here.
    pub handoff_description: String,

    /// Behavioral prompt driving the persona's script. Opaque to the core.
    pub instructions: String,
}

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// An immutable catalog entry: config plus the resolved handoff target set.
#[derive(Debug, Clone)]
pub struct Persona {
    /// Unique key.
    pub kind: PersonaKind,

    /// Voice tag for the synthesized persona audio.
    pub voice: String,

    /// One-line handoff description.
    pub handoff_description: String,

    /// Behavioral prompt. Opaque text, never parsed.
    pub instructions: String,

    /// Personas this one may hand the conversation off to.
    pub handoffs: BTreeSet<PersonaKind>,
}

impl Persona {
    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        self.kind.display_name()
    }

    /// Storage/CLI slug.
    pub fn slug(&self) -> &'static str {
        self.kind.slug()
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
