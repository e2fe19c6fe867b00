//! # Entity Registry
//!
//! Per-kind cache of referenced entities seen during a run.
//!
//! The registry answers one question for the builder: "is this the first
//! time this entity shows up?" Only on the first sighting are the entity's
//! descriptive triples emitted. Two different natural keys that mint the same
//! IRI (e.g. `"Bogotá"` and `"bogotá"`) are one node, so "declared" is
//! tracked per IRI as well as per key.
//!
//! The registry is owned by a single builder and lives for one run.

use crate::minter::Minter;
use crate::{EntityKind, Iri, TabgraphError};
use std::collections::{BTreeMap, BTreeSet};

/// Cached state for one natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// The minted IRI.
    pub iri: Iri,
    /// Whether the entity's descriptive triples have been emitted.
    pub declared: bool,
}

/// Result of resolving a natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The entity's IRI.
    pub iri: Iri,
    /// True if the caller must emit the descriptive triples now.
    pub first_sighting: bool,
}

/// Natural key → IRI cache, one map per entity kind.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entries: BTreeMap<EntityKind, BTreeMap<String, RegistryEntry>>,
    declared: BTreeMap<EntityKind, BTreeSet<Iri>>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key` for `kind`, minting on first contact.
    ///
    /// `first_sighting` is true until [`EntityRegistry::mark_declared`] has
    /// been called for the key or for any key minting the same IRI.
    pub fn resolve(
        &mut self,
        kind: EntityKind,
        key: &str,
        minter: &Minter,
    ) -> Result<Resolved, TabgraphError> {
        let key = key.trim();
        let by_key = self.entries.entry(kind).or_default();

        let entry = match by_key.get(key) {
            Some(entry) => entry.clone(),
            None => {
                let iri = minter.mint(kind, Some(key))?;
                let declared = self
                    .declared
                    .get(&kind)
                    .is_some_and(|iris| iris.contains(&iri));
                if declared {
                    tracing::debug!(%kind, key, %iri, "natural key collapses onto an existing node");
                }
                let entry = RegistryEntry { iri, declared };
                by_key.insert(key.to_string(), entry.clone());
                entry
            }
        };

        Ok(Resolved {
            iri: entry.iri,
            first_sighting: !entry.declared,
        })
    }

    /// Record that the descriptive triples for `key` have been emitted.
    pub fn mark_declared(&mut self, kind: EntityKind, key: &str) {
        let Some(entry) = self
            .entries
            .get_mut(&kind)
            .and_then(|by_key| by_key.get_mut(key.trim()))
        else {
            return;
        };
        entry.declared = true;
        self.declared
            .entry(kind)
            .or_default()
            .insert(entry.iri.clone());
    }

    /// Look up a key without minting.
    #[must_use]
    pub fn get(&self, kind: EntityKind, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(&kind)?.get(key.trim())
    }

    /// Number of distinct declared nodes of `kind`.
    #[must_use]
    pub fn declared_count(&self, kind: EntityKind) -> usize {
        self.declared.get(&kind).map_or(0, BTreeSet::len)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingKeyPolicy;
    use crate::vocab::{Namespaces, Vocabulary};

    fn minter() -> Minter {
        Minter::new(
            Vocabulary::new(&Namespaces::default()),
            MissingKeyPolicy::Placeholder,
            8,
        )
    }

    #[test]
    fn first_sighting_only_once() {
        let m = minter();
        let mut registry = EntityRegistry::new();

        let first = registry
            .resolve(EntityKind::University, "U001", &m)
            .expect("resolve");
        assert!(first.first_sighting);
        registry.mark_declared(EntityKind::University, "U001");

        let second = registry
            .resolve(EntityKind::University, "U001", &m)
            .expect("resolve");
        assert!(!second.first_sighting);
        assert_eq!(first.iri, second.iri);
        assert_eq!(registry.declared_count(EntityKind::University), 1);
    }

    #[test]
    fn undeclared_key_stays_first_sighting() {
        let m = minter();
        let mut registry = EntityRegistry::new();

        registry
            .resolve(EntityKind::City, "Cali", &m)
            .expect("resolve");
        let again = registry
            .resolve(EntityKind::City, "Cali", &m)
            .expect("resolve");
        assert!(again.first_sighting);
        assert_eq!(registry.declared_count(EntityKind::City), 0);
    }

    #[test]
    fn kinds_are_independent() {
        let m = minter();
        let mut registry = EntityRegistry::new();

        registry
            .resolve(EntityKind::City, "Antioquia", &m)
            .expect("resolve");
        registry.mark_declared(EntityKind::City, "Antioquia");

        let dept = registry
            .resolve(EntityKind::Department, "Antioquia", &m)
            .expect("resolve");
        assert!(dept.first_sighting);
        assert_ne!(
            dept.iri,
            registry
                .get(EntityKind::City, "Antioquia")
                .map(|e| e.iri.clone())
                .expect("city entry")
        );
    }

    #[test]
    fn colliding_keys_share_one_declaration() {
        let m = minter();
        let mut registry = EntityRegistry::new();

        registry
            .resolve(EntityKind::City, "Bogotá", &m)
            .expect("resolve");
        registry.mark_declared(EntityKind::City, "Bogotá");

        let variant = registry
            .resolve(EntityKind::City, "bogotá", &m)
            .expect("resolve");
        assert!(!variant.first_sighting);
        assert!(registry.get(EntityKind::City, "bogotá").is_some());
        assert_eq!(registry.declared_count(EntityKind::City), 1);
    }
}
