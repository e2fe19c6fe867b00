//! # Vocabulary
//!
//! Namespaces, classes and predicates emitted by the builder, resolved once
//! per run into [`Iri`] values.

use crate::{EntityKind, Iri};
use serde::{Deserialize, Serialize};

/// Well-known W3C and community namespaces.
pub mod ns {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub const SCHEMA: &str = "http://schema.org/";
}

// =============================================================================
// NAMESPACES (configurable)
// =============================================================================

/// Dataset-specific namespaces. Each must end in `/` or `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespaces {
    /// Students, universities and university properties.
    pub university: String,
    /// Knowledge areas and academic attributes.
    pub education: String,
    /// Cities, departments and location predicates.
    pub geography: String,
    /// Decisions and behavior predicates.
    pub behavior: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            university: "http://example.org/university/".to_string(),
            education: "http://example.org/education/".to_string(),
            geography: "http://example.org/geography/".to_string(),
            behavior: "http://example.org/behavior/".to_string(),
        }
    }
}

impl Namespaces {
    /// Iterate `(prefix, namespace)` pairs for the dataset namespaces.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("univ", self.university.as_str()),
            ("edu", self.education.as_str()),
            ("geo", self.geography.as_str()),
            ("behavior", self.behavior.as_str()),
        ]
    }
}

// =============================================================================
// PREFIX MAP
// =============================================================================

/// Ordered prefix → namespace bindings used by the serializers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixMap {
    bindings: Vec<(String, String)>,
}

impl PrefixMap {
    /// Create an empty prefix map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a prefix. A later binding for the same prefix replaces the earlier.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        if let Some(entry) = self.bindings.iter_mut().find(|(p, _)| *p == prefix) {
            entry.1 = namespace;
        } else {
            self.bindings.push((prefix, namespace));
        }
    }

    /// All bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// Split an IRI into `(prefix, local)` using the longest matching namespace.
    #[must_use]
    pub fn split<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.bindings
            .iter()
            .filter(|(_, namespace)| iri.starts_with(namespace.as_str()))
            .max_by_key(|(_, namespace)| namespace.len())
            .map(|(prefix, namespace)| (prefix.as_str(), &iri[namespace.len()..]))
    }

    /// Namespace bound to a prefix.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, n)| n.as_str())
    }
}

// =============================================================================
// VOCABULARY
// =============================================================================

/// Resolved classes and predicates for one run.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    namespaces: Namespaces,

    // generic
    pub rdf_type: Iri,
    pub rdfs_label: Iri,
    pub dc_identifier: Iri,
    pub dc_title: Iri,
    pub dc_description: Iri,
    pub dc_creator: Iri,
    pub dc_language: Iri,
    pub dc_subject: Iri,
    pub dcterms_created: Iri,
    pub dcterms_spatial: Iri,
    pub schema_number_of_items: Iri,

    // student attributes and relationships
    pub age: Iri,
    pub gender: Iri,
    pub socioeconomic_stratum: Iri,
    pub saber11_score: Iri,
    pub origin_from: Iri,
    pub prefers_area: Iri,
    pub applies_to: Iri,

    // university attributes
    pub located_in: Iri,
    pub has_type: Iri,
    pub is_accredited: Iri,
    pub national_ranking: Iri,
    pub has_scholarship: Iri,
    pub has_international_agreement: Iri,

    // decisions
    pub makes: Iri,
    pub final_decision: Iri,
    pub program_modality: Iri,
}

impl Vocabulary {
    /// Resolve the vocabulary against the configured namespaces.
    #[must_use]
    pub fn new(namespaces: &Namespaces) -> Self {
        let term = |base: &str, local: &str| Iri::new(format!("{base}{local}"));
        let univ = namespaces.university.as_str();
        let edu = namespaces.education.as_str();
        let geo = namespaces.geography.as_str();
        let behavior = namespaces.behavior.as_str();

        Self {
            namespaces: namespaces.clone(),

            rdf_type: term(ns::RDF, "type"),
            rdfs_label: term(ns::RDFS, "label"),
            dc_identifier: term(ns::DC, "identifier"),
            dc_title: term(ns::DC, "title"),
            dc_description: term(ns::DC, "description"),
            dc_creator: term(ns::DC, "creator"),
            dc_language: term(ns::DC, "language"),
            dc_subject: term(ns::DC, "subject"),
            dcterms_created: term(ns::DCTERMS, "created"),
            dcterms_spatial: term(ns::DCTERMS, "spatial"),
            schema_number_of_items: term(ns::SCHEMA, "numberOfItems"),

            age: term(univ, "age"),
            gender: term(univ, "gender"),
            socioeconomic_stratum: term(univ, "socioeconomicStratum"),
            saber11_score: term(edu, "saber11Score"),
            origin_from: term(geo, "originFrom"),
            prefers_area: term(edu, "prefersArea"),
            applies_to: term(univ, "appliesTo"),

            located_in: term(geo, "locatedIn"),
            has_type: term(univ, "hasType"),
            is_accredited: term(univ, "isAccredited"),
            national_ranking: term(univ, "nationalRanking"),
            has_scholarship: term(univ, "hasScholarship"),
            has_international_agreement: term(univ, "hasInternationalAgreement"),

            makes: term(behavior, "makes"),
            final_decision: term(behavior, "finalDecision"),
            program_modality: term(edu, "programModality"),
        }
    }

    /// Namespace in which instances of `kind` are minted.
    #[must_use]
    pub fn namespace_for(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Student | EntityKind::University | EntityKind::Dataset => {
                &self.namespaces.university
            }
            EntityKind::KnowledgeArea => &self.namespaces.education,
            EntityKind::City | EntityKind::Department => &self.namespaces.geography,
            EntityKind::AcademicDecision => &self.namespaces.behavior,
        }
    }

    /// Class IRI declared with `rdf:type` for `kind`.
    #[must_use]
    pub fn class_iri(&self, kind: EntityKind) -> Iri {
        let (base, local) = match kind {
            EntityKind::Student => (self.namespaces.university.as_str(), "Student"),
            EntityKind::University => (self.namespaces.university.as_str(), "University"),
            EntityKind::KnowledgeArea => (self.namespaces.education.as_str(), "KnowledgeArea"),
            EntityKind::City => (self.namespaces.geography.as_str(), "City"),
            EntityKind::Department => (self.namespaces.geography.as_str(), "Department"),
            EntityKind::AcademicDecision => {
                (self.namespaces.behavior.as_str(), "AcademicDecision")
            }
            EntityKind::Dataset => (ns::SCHEMA, "Dataset"),
        };
        Iri::new(format!("{base}{local}"))
    }

    /// Prefix bindings for the serializers: dataset namespaces first, then the
    /// well-known ones.
    #[must_use]
    pub fn prefixes(&self) -> PrefixMap {
        let mut map = PrefixMap::new();
        for (prefix, namespace) in self.namespaces.entries() {
            map.bind(prefix, namespace);
        }
        map.bind("schema", ns::SCHEMA);
        map.bind("dc", ns::DC);
        map.bind("dcterms", ns::DCTERMS);
        map.bind("rdf", ns::RDF);
        map.bind("rdfs", ns::RDFS);
        map.bind("xsd", ns::XSD);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_iris_follow_namespaces() {
        let vocab = Vocabulary::new(&Namespaces::default());
        assert_eq!(
            vocab.class_iri(EntityKind::University).as_str(),
            "http://example.org/university/University"
        );
        assert_eq!(
            vocab.class_iri(EntityKind::Dataset).as_str(),
            "http://schema.org/Dataset"
        );
        assert_eq!(
            vocab.namespace_for(EntityKind::City),
            "http://example.org/geography/"
        );
    }

    #[test]
    fn prefix_split_prefers_longest_namespace() {
        let mut map = PrefixMap::new();
        map.bind("ex", "http://example.org/");
        map.bind("univ", "http://example.org/university/");

        assert_eq!(
            map.split("http://example.org/university/Student"),
            Some(("univ", "Student"))
        );
        assert_eq!(map.split("http://example.org/other"), Some(("ex", "other")));
        assert_eq!(map.split("urn:x"), None);
    }

    #[test]
    fn rebinding_replaces_namespace() {
        let mut map = PrefixMap::new();
        map.bind("ex", "http://a/");
        map.bind("ex", "http://b/");
        assert_eq!(map.namespace("ex"), Some("http://b/"));
        assert_eq!(map.iter().count(), 1);
    }
}
