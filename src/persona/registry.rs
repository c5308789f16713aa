//! Persona registry: bundled TOML configs plus the handoff graph.
//!
//! The registry is built once at startup. Handoff adjacency is computed here
//! as an explicit construction step producing immutable sets; in the shipped
//! catalog every persona may hand off to every other (a complete graph),
//! though nothing below assumes that shape.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

use super::types::{Persona, PersonaConfig, PersonaKind};

/// Registry of customer personas with their handoff targets.
pub struct Registry {
    /// Catalog in `PersonaKind::all()` order.
    personas: Vec<Persona>,

    /// Handoff adjacency, one entry per persona.
    handoffs: BTreeMap<PersonaKind, BTreeSet<PersonaKind>>,
}

impl Registry {
    /// Build the registry from the bundled persona configs.
    pub fn new() -> Result<Self> {
        let handoffs = full_mesh(PersonaKind::all());

        let mut personas = Vec::with_capacity(PersonaKind::all().len());
        for kind in PersonaKind::all() {
            let raw = bundled_config(*kind);
            let cfg: PersonaConfig = toml::from_str(raw).map_err(|e| Error::PersonaInvalid {
                name: kind.slug().to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

            if cfg.kind != *kind {
                return Err(Error::PersonaInvalid {
                    name: kind.slug().to_string(),
                    reason: format!(
                        "Config kind '{}' does not match expected '{}'",
                        cfg.kind.slug(),
                        kind.slug()
                    ),
                });
            }

            personas.push(Persona {
                kind: cfg.kind,
                voice: cfg.voice,
                handoff_description: cfg.handoff_description,
                instructions: cfg.instructions,
                handoffs: handoffs[kind].clone(),
            });
        }

        Ok(Self { personas, handoffs })
    }

    /// All personas in catalog order.
    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    /// Look up a persona by kind.
    pub fn get(&self, kind: PersonaKind) -> &Persona {
        // The catalog is total over PersonaKind, in all() order.
        &self.personas[PersonaKind::all()
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0)]
    }

    /// Resolve a CLI/storage slug to a persona kind.
    pub fn resolve(&self, slug: &str) -> Result<PersonaKind> {
        slug.parse().map_err(|_| Error::PersonaUnknown {
            name: slug.to_string(),
            valid: PersonaKind::all()
                .iter()
                .map(|k| k.slug())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// The personas `kind` may hand the conversation off to.
    pub fn handoff_targets(&self, kind: PersonaKind) -> &BTreeSet<PersonaKind> {
        &self.handoffs[&kind]
    }

    /// The first persona in catalog order, used as the default selection.
    pub fn default_persona(&self) -> PersonaKind {
        self.personas[0].kind
    }
}

/// Build a complete handoff graph over the given personas: each one's target
/// set is every other persona.
fn full_mesh(kinds: &[PersonaKind]) -> BTreeMap<PersonaKind, BTreeSet<PersonaKind>> {
    kinds
        .iter()
        .map(|kind| {
            let targets = kinds.iter().copied().filter(|k| k != kind).collect();
            (*kind, targets)
        })
        .collect()
}

/// Get the bundled TOML config string for a persona.
fn bundled_config(kind: PersonaKind) -> &'static str {
    match kind {
        PersonaKind::AutoClaim => include_str!("../../config/personas/auto-claim.toml"),
        PersonaKind::ConfusedElderly => {
            include_str!("../../config/personas/confused-elderly.toml")
        }
        PersonaKind::CustomerService => {
            include_str!("../../config/personas/customer-service.toml")
        }
        PersonaKind::HomeWater => include_str!("../../config/personas/home-water.toml"),
        PersonaKind::HouseFire => include_str!("../../config/personas/house-fire.toml"),
        PersonaKind::Windshield => include_str!("../../config/personas/windshield.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_bundled_configs_parse() {
        let registry = Registry::new().unwrap();
        assert_eq!(registry.personas().len(), 6);
        for persona in registry.personas() {
            assert!(!persona.voice.is_empty());
            assert!(!persona.instructions.is_empty());
            assert!(!persona.handoff_description.is_empty());
        }
    }

    #[test]
    fn test_catalog_order() {
        let registry = Registry::new().unwrap();
        let kinds: Vec<_> = registry.personas().iter().map(|p| p.kind).collect();
        assert_eq!(kinds, PersonaKind::all());
    }

    #[test]
    fn test_full_mesh_invariant() {
        let registry = Registry::new().unwrap();
        for kind in PersonaKind::all() {
            let targets = registry.handoff_targets(*kind);
            // Excludes itself, includes everyone else
            assert!(!targets.contains(kind));
            assert_eq!(targets.len(), PersonaKind::all().len() - 1);
            for other in PersonaKind::all().iter().filter(|k| *k != kind) {
                assert!(targets.contains(other));
            }
        }
    }

    #[test]
    fn test_persona_handoffs_match_graph() {
        let registry = Registry::new().unwrap();
        for persona in registry.personas() {
            assert_eq!(&persona.handoffs, registry.handoff_targets(persona.kind));
        }
    }

    #[test]
    fn test_get_and_resolve() {
        let registry = Registry::new().unwrap();
        let persona = registry.get(PersonaKind::HouseFire);
        assert_eq!(persona.kind, PersonaKind::HouseFire);

        assert_eq!(
            registry.resolve("house-fire").unwrap(),
            PersonaKind::HouseFire
        );
        assert!(registry.resolve("nope").is_err());
    }

    #[test]
    fn test_default_persona() {
        let registry = Registry::new().unwrap();
        assert_eq!(registry.default_persona(), PersonaKind::AutoClaim);
    }

    #[test]
    fn test_full_mesh_on_subset() {
        // The construction supports arbitrary subsets, not just the full catalog.
        let subset = [PersonaKind::AutoClaim, PersonaKind::Windshield];
        let mesh = full_mesh(&subset);
        assert_eq!(mesh.len(), 2);
        assert_eq!(
            mesh[&PersonaKind::AutoClaim],
            [PersonaKind::Windshield].into_iter().collect()
        );
    }
}
