//! # Canonical Export
//!
//! A format-independent, bit-exact encoding of the triple set, used to
//! compare runs. The sorted triple stream is written with `postcard` and
//! hashed with BLAKE3.
//!
//! Predicates can be excluded so that wall-clock values such as
//! `dcterms:created` do not make two otherwise identical runs differ.

use crate::graph::{Graph, GraphStore};
use crate::{Iri, TabgraphError, Triple};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Magic bytes for the canonical stream.
pub const CANONICAL_MAGIC: [u8; 4] = *b"TGRX";

/// Current canonical format version.
pub const CANONICAL_VERSION: u8 = 1;

/// Header of the canonical stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalHeader {
    /// Magic bytes to identify the format.
    pub magic: [u8; 4],

    /// Format version.
    pub version: u8,

    /// Number of triples written after the header.
    pub triple_count: u64,

    /// Number of predicates that were excluded.
    pub excluded_predicates: u64,
}

/// Encode the graph, minus `excluded` predicates, as
/// `[header_len: u32 LE] [header] [triples]`.
pub fn export_canonical(graph: &Graph, excluded: &[Iri]) -> Result<Vec<u8>, TabgraphError> {
    let excluded: BTreeSet<&Iri> = excluded.iter().collect();
    let triples: Vec<&Triple> = graph
        .triples()
        .filter(|triple| !excluded.contains(&triple.predicate))
        .collect();

    let header = CanonicalHeader {
        magic: CANONICAL_MAGIC,
        version: CANONICAL_VERSION,
        triple_count: triples.len() as u64,
        excluded_predicates: excluded.len() as u64,
    };

    let header_bytes = postcard::to_allocvec(&header)
        .map_err(|e| TabgraphError::SerializationError(format!("Header: {}", e)))?;
    let data_bytes = postcard::to_allocvec(&triples)
        .map_err(|e| TabgraphError::SerializationError(format!("Data: {}", e)))?;

    let mut result = Vec::with_capacity(4 + header_bytes.len() + data_bytes.len());
    result.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
    result.extend_from_slice(&header_bytes);
    result.extend_from_slice(&data_bytes);
    Ok(result)
}

/// BLAKE3 hex digest of [`export_canonical`].
pub fn canonical_checksum(graph: &Graph, excluded: &[Iri]) -> Result<String, TabgraphError> {
    let bytes = export_canonical(graph, excluded)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
