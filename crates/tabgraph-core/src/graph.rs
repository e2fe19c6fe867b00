//! # Graph Store
//!
//! The in-memory triple store for a transformation run.
//!
//! This module defines the `GraphStore` trait and its `Graph` implementation.
//! All data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.
//! Set semantics: inserting an existing triple is a no-op.

use crate::{Iri, Object, TabgraphError, Triple};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait defines the triple operations used by the builder,
/// the validator and the serializers.
///
/// Writes go through `insert` only; everything else is a read.
pub trait GraphStore {
    /// Insert a triple. Returns `true` if it was not already present.
    fn insert(&mut self, triple: Triple) -> Result<bool, TabgraphError>;

    /// Check whether a triple is present.
    fn contains(&self, triple: &Triple) -> bool;

    /// Total number of triples.
    fn triple_count(&self) -> usize;

    /// All triples in deterministic (sorted) order.
    fn triples(&self) -> impl Iterator<Item = &Triple>;

    /// Objects of `(subject, predicate)`.
    fn objects(&self, subject: &Iri, predicate: &Iri) -> Vec<&Object>;

    /// All `(predicate, object)` pairs of a subject.
    fn outbound(&self, subject: &Iri) -> Vec<(&Iri, &Object)>;

    /// Subjects linking to `object` through `predicate`.
    fn inbound(&self, object: &Iri, predicate: &Iri) -> Vec<&Iri>;

    /// All `(subject, object)` pairs using `predicate`.
    fn with_predicate(&self, predicate: &Iri) -> Vec<(&Iri, &Object)>;

    /// Subjects declared with `rdf:type` = `class`.
    fn subjects_of_type(&self, rdf_type: &Iri, class: &Iri) -> Vec<&Iri> {
        let target = Object::Iri(class.clone());
        self.with_predicate(rdf_type)
            .into_iter()
            .filter(|(_, object)| **object == target)
            .map(|(subject, _)| subject)
            .collect()
    }
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The main Graph structure.
///
/// Besides the triple set it keeps four indices: by subject, by predicate,
/// by (subject, predicate) and by IRI object (inbound edges).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    /// Canonical triple set.
    triples: BTreeSet<Triple>,

    /// subject -> predicate -> objects
    by_subject: BTreeMap<Iri, BTreeMap<Iri, BTreeSet<Object>>>,

    /// predicate -> subject -> objects
    by_predicate: BTreeMap<Iri, BTreeMap<Iri, BTreeSet<Object>>>,

    /// object IRI -> predicate -> subjects
    inbound: BTreeMap<Iri, BTreeMap<Iri, BTreeSet<Iri>>>,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an iterator of triples.
    pub fn from_triples(iter: impl IntoIterator<Item = Triple>) -> Self {
        let mut graph = Self::new();
        for triple in iter {
            graph.insert_internal(triple);
        }
        graph
    }

    /// Infallible insert used by `GraphStore::insert` and `from_triples`.
    fn insert_internal(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }

        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .entry(triple.predicate.clone())
            .or_default()
            .insert(triple.object.clone());

        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .entry(triple.subject.clone())
            .or_default()
            .insert(triple.object.clone());

        if let Object::Iri(target) = &triple.object {
            self.inbound
                .entry(target.clone())
                .or_default()
                .entry(triple.predicate.clone())
                .or_default()
                .insert(triple.subject.clone());
        }

        self.triples.insert(triple)
    }
}

impl GraphStore for Graph {
    fn insert(&mut self, triple: Triple) -> Result<bool, TabgraphError> {
        Ok(self.insert_internal(triple))
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    fn triple_count(&self) -> usize {
        self.triples.len()
    }

    fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    fn objects(&self, subject: &Iri, predicate: &Iri) -> Vec<&Object> {
        self.by_subject
            .get(subject)
            .and_then(|predicates| predicates.get(predicate))
            .map(|objects| objects.iter().collect())
            .unwrap_or_default()
    }

    fn outbound(&self, subject: &Iri) -> Vec<(&Iri, &Object)> {
        self.by_subject
            .get(subject)
            .map(|predicates| {
                predicates
                    .iter()
                    .flat_map(|(p, objects)| objects.iter().map(move |o| (p, o)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn inbound(&self, object: &Iri, predicate: &Iri) -> Vec<&Iri> {
        self.inbound
            .get(object)
            .and_then(|predicates| predicates.get(predicate))
            .map(|subjects| subjects.iter().collect())
            .unwrap_or_default()
    }

    fn with_predicate(&self, predicate: &Iri) -> Vec<(&Iri, &Object)> {
        self.by_predicate
            .get(predicate)
            .map(|subjects| {
                subjects
                    .iter()
                    .flat_map(|(s, objects)| objects.iter().map(move |o| (s, o)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Literal;

    fn iri(s: &str) -> Iri {
        Iri::new(format!("urn:test:{s}"))
    }

    #[test]
    fn insert_has_set_semantics() {
        let mut graph = Graph::new();
        let t = Triple::new(iri("a"), iri("p"), iri("b"));

        assert!(graph.insert(t.clone()).expect("insert"));
        assert!(!graph.insert(t.clone()).expect("insert"));
        assert_eq!(graph.triple_count(), 1);
        assert!(graph.contains(&t));
    }

    #[test]
    fn indices_agree() {
        let mut graph = Graph::new();
        graph
            .insert(Triple::new(iri("a"), iri("p"), iri("b")))
            .expect("insert");
        graph
            .insert(Triple::new(iri("a"), iri("q"), Literal::integer(5)))
            .expect("insert");
        graph
            .insert(Triple::new(iri("c"), iri("p"), iri("b")))
            .expect("insert");

        assert_eq!(graph.objects(&iri("a"), &iri("p")).len(), 1);
        assert_eq!(graph.outbound(&iri("a")).len(), 2);
        assert_eq!(graph.inbound(&iri("b"), &iri("p")), vec![&iri("a"), &iri("c")]);
        assert_eq!(graph.with_predicate(&iri("p")).len(), 2);
        assert!(graph.inbound(&iri("b"), &iri("q")).is_empty());
    }

    #[test]
    fn subjects_of_type_filters_class() {
        let rdf_type = iri("type");
        let graph = Graph::from_triples([
            Triple::new(iri("s1"), rdf_type.clone(), iri("Student")),
            Triple::new(iri("s2"), rdf_type.clone(), iri("Student")),
            Triple::new(iri("u1"), rdf_type.clone(), iri("University")),
        ]);

        assert_eq!(graph.subjects_of_type(&rdf_type, &iri("Student")).len(), 2);
        assert_eq!(graph.subjects_of_type(&rdf_type, &iri("City")).len(), 0);
    }

    #[test]
    fn iteration_is_deterministic() {
        let a = Graph::from_triples([
            Triple::new(iri("b"), iri("p"), iri("x")),
            Triple::new(iri("a"), iri("p"), iri("y")),
        ]);
        let b = Graph::from_triples([
            Triple::new(iri("a"), iri("p"), iri("y")),
            Triple::new(iri("b"), iri("p"), iri("x")),
        ]);

        let left: Vec<_> = a.triples().collect();
        let right: Vec<_> = b.triples().collect();
        assert_eq!(left, right);
        assert_eq!(a, b);
    }
}
