//! # tabgraph-core
//!
//! The deterministic tabular-to-graph engine for tabgraph.
//!
//! This crate turns a flat table of survey records into an RDF knowledge
//! graph: every row becomes a primary entity linked to deduplicated
//! referenced entities and to a synthesized relationship-instance node.
//!
//! ## Pipeline
//!
//! ```text
//! Table -> RowSchema -> Minter + EntityRegistry -> GraphBuilder -> Graph
//!       -> IntegrityValidator -> GraphSerializer (rdf, ttl, nt, jsonld)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no network, no file I/O
//! - Deterministic: `BTreeMap`/`BTreeSet` everywhere, no floats
//! - Single pass: one builder owns the graph and the registry for one run
//! - Read-only after build: validation and export never mutate the graph

// =============================================================================
// MODULES
// =============================================================================

pub mod builder;
pub mod coerce;
pub mod config;
pub mod export;
pub mod graph;
pub mod minter;
pub mod primitives;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validator;
pub mod vocab;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AttributeError, Datatype, EntityKind, Iri, Literal, Object, TabgraphError, Triple};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use builder::{GraphBuilder, TransformSummary, Transformation};
pub use config::{BooleanPolicy, DatasetMetadata, LabelTemplates, MissingKeyPolicy, TransformConfig};
pub use graph::{Graph, GraphStore};
pub use minter::{Minter, slugify};
pub use registry::{EntityRegistry, RegistryEntry, Resolved};
pub use schema::{ColumnMap, RowSchema, SourceRecord, Table};
pub use validator::{
    CheckKind, Finding, IntegrityReport, IntegrityValidator, Ratio, ValidationTargets,
};
pub use vocab::{Namespaces, PrefixMap, Vocabulary};

// =============================================================================
// RE-EXPORTS: Export (from export module)
// =============================================================================

pub use export::{
    GraphSerializer, RdfFormat, RdfioSerializer, canonical_checksum, export_all, export_canonical,
    serializer_for, to_rdf_triple,
};
