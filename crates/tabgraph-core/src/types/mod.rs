//! # Core Type Definitions
//!
//! This module contains the core types of the tabgraph engine:
//! - Graph terms (`Iri`, `Literal`, `Datatype`, `Object`, `Triple`)
//! - The closed set of entity kinds (`EntityKind`)
//! - Error types (`TabgraphError`, `AttributeError`)
//!
//! ## Determinism Guarantees
//!
//! All term types implement `Ord`, so a `BTreeSet<Triple>` iterates in the
//! same order on every run for the same input.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// TERMS
// =============================================================================

/// An absolute IRI naming a node or a predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Iri(pub String);

impl Iri {
    /// Create a new IRI from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the IRI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The datatype of a literal.
///
/// `String` literals may carry a language tag; every other datatype is
/// rendered with its XSD datatype IRI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Datatype {
    /// `xsd:string`, or `rdf:langString` when a language tag is present.
    String,
    /// `xsd:integer`
    Integer,
    /// `xsd:decimal`
    Decimal,
    /// `xsd:boolean`
    Boolean,
    /// `xsd:dateTime`
    DateTime,
}

impl Datatype {
    /// Local name of the datatype in the XSD namespace.
    #[must_use]
    pub fn xsd_local_name(&self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Decimal => "decimal",
            Datatype::Boolean => "boolean",
            Datatype::DateTime => "dateTime",
        }
    }
}

/// A typed literal value.
///
/// The lexical form is stored already normalized; constructors for numeric
/// datatypes live in [`crate::coerce`], which validates the text first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// Normalized lexical form.
    pub lexical: String,
    /// Datatype of the value.
    pub datatype: Datatype,
    /// Language tag, only ever set for `Datatype::String`.
    pub language: Option<String>,
}

impl Literal {
    /// A plain `xsd:string` literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            datatype: Datatype::String,
            language: None,
        }
    }

    /// A language-tagged string literal.
    #[must_use]
    pub fn lang_string(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            datatype: Datatype::String,
            language: Some(language.into()),
        }
    }

    /// An `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Integer,
            language: None,
        }
    }

    /// An `xsd:boolean` literal.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Boolean,
            language: None,
        }
    }

    /// An `xsd:dateTime` literal in RFC 3339 form.
    #[must_use]
    pub fn date_time(value: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            lexical: value.to_rfc3339(),
            datatype: Datatype::DateTime,
            language: None,
        }
    }

    /// Build a literal from an already validated lexical form.
    #[must_use]
    pub(crate) fn typed(lexical: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }
}

/// The object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Object {
    /// A reference to another node.
    Iri(Iri),
    /// A literal attribute value.
    Literal(Literal),
}

impl Object {
    /// The IRI if this object is a node reference.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Object::Iri(iri) => Some(iri),
            Object::Literal(_) => None,
        }
    }

    /// The literal if this object is a value.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Object::Iri(_) => None,
            Object::Literal(lit) => Some(lit),
        }
    }
}

impl From<Iri> for Object {
    fn from(iri: Iri) -> Self {
        Object::Iri(iri)
    }
}

impl From<Literal> for Object {
    fn from(lit: Literal) -> Self {
        Object::Literal(lit)
    }
}

// =============================================================================
// TRIPLE
// =============================================================================

/// A subject–predicate–object statement, the atomic graph unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// The node the statement is about.
    pub subject: Iri,
    /// The relationship or attribute name.
    pub predicate: Iri,
    /// The related node or the attribute value.
    pub object: Object,
}

impl Triple {
    /// Create a new triple.
    #[must_use]
    pub fn new(subject: Iri, predicate: Iri, object: impl Into<Object>) -> Self {
        Self {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

// =============================================================================
// ENTITY KINDS
// =============================================================================

/// The closed set of entity kinds produced by a transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The row's own primary entity.
    Student,
    /// Institution the student applied to.
    University,
    /// Preferred subject area.
    KnowledgeArea,
    /// Place of origin.
    City,
    /// Administrative region, for universities and cities.
    Department,
    /// Relationship instance: a student's decision about a university.
    AcademicDecision,
    /// Run-level dataset description.
    Dataset,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Student,
        EntityKind::University,
        EntityKind::KnowledgeArea,
        EntityKind::City,
        EntityKind::Department,
        EntityKind::AcademicDecision,
        EntityKind::Dataset,
    ];

    /// Prefix used in front of the slug when minting IRIs.
    #[must_use]
    pub fn slug_prefix(&self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::University => "university",
            EntityKind::KnowledgeArea => "area",
            EntityKind::City => "city",
            EntityKind::Department => "dept",
            EntityKind::AcademicDecision => "decision",
            EntityKind::Dataset => "dataset",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Student => "student",
            EntityKind::University => "university",
            EntityKind::KnowledgeArea => "knowledge_area",
            EntityKind::City => "city",
            EntityKind::Department => "department",
            EntityKind::AcademicDecision => "academic_decision",
            EntityKind::Dataset => "dataset",
        };
        f.write_str(name)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in a tabgraph run.
///
/// - Configuration errors abort before any row is processed
/// - `MissingKey` is absorbed by the builder and reported as an issue
/// - Serialization errors leave the in-memory graph intact
#[derive(Debug, Error)]
pub enum TabgraphError {
    /// A required input column is absent from the table header.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// The expected header name.
        column: String,
    },

    /// The transformation configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A natural key was missing and the policy rejects placeholders.
    #[error("Missing natural key for {kind}")]
    MissingKey {
        /// Kind of the entity that could not be identified.
        kind: EntityKind,
    },

    /// An encoder could not render the graph.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The input table could not be read.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl TabgraphError {
    /// True for errors that must abort a run before row processing.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TabgraphError::MissingColumn { .. } | TabgraphError::InvalidConfig(_)
        )
    }
}

/// A single field that failed coercion.
///
/// Only the offending attribute is dropped; the row and the run continue.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("row {row}: attribute `{attribute}` dropped ({reason}): {value:?}")]
pub struct AttributeError {
    /// Zero-based row index in the source table.
    pub row: usize,
    /// Attribute (column) name.
    pub attribute: String,
    /// The raw cell text.
    pub value: String,
    /// Why the value was rejected.
    pub reason: String,
}

// =============================================================================
// TESTS
// =============================================================================
