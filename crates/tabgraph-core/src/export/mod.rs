//! # Serializer Adapter
//!
//! Renders a finished [`Graph`] into the standard RDF syntaxes.
//!
//! | Format    | Extension | Media type              |
//! |-----------|-----------|-------------------------|
//! | RDF/XML   | `.rdf`    | `application/rdf+xml`   |
//! | Turtle    | `.ttl`    | `text/turtle`           |
//! | N-Triples | `.nt`     | `application/n-triples` |
//! | JSON-LD   | `.jsonld` | `application/ld+json`   |
//!
//! Every syntax is written by [`rdfio::RdfioSerializer`], which streams the
//! graph's sorted triples into the `oxrdfio` writers. The same graph always
//! produces the same bytes.
//!
//! [`canonical`] adds a format-independent checksum used to compare runs.

pub mod canonical;
pub mod rdfio;

use crate::graph::Graph;
use crate::TabgraphError;
use crate::vocab::PrefixMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use canonical::{canonical_checksum, export_canonical};
pub use rdfio::{RdfioSerializer, to_rdf_triple};

// =============================================================================
// FORMATS
// =============================================================================

/// Output syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdfFormat {
    /// RDF/XML
    RdfXml,
    /// Turtle
    Turtle,
    /// N-Triples
    NTriples,
    /// JSON-LD
    JsonLd,
}

impl RdfFormat {
    /// Every supported format.
    pub const ALL: [RdfFormat; 4] = [
        RdfFormat::RdfXml,
        RdfFormat::Turtle,
        RdfFormat::NTriples,
        RdfFormat::JsonLd,
    ];

    /// File extension, without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            RdfFormat::RdfXml => "rdf",
            RdfFormat::Turtle => "ttl",
            RdfFormat::NTriples => "nt",
            RdfFormat::JsonLd => "jsonld",
        }
    }

    /// IANA media type.
    #[must_use]
    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::Turtle => "text/turtle",
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::JsonLd => "application/ld+json",
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RdfFormat::RdfXml => "rdfxml",
            RdfFormat::Turtle => "turtle",
            RdfFormat::NTriples => "ntriples",
            RdfFormat::JsonLd => "jsonld",
        };
        f.write_str(name)
    }
}

impl FromStr for RdfFormat {
    type Err = TabgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rdfxml" | "rdf" | "xml" => Ok(RdfFormat::RdfXml),
            "turtle" | "ttl" => Ok(RdfFormat::Turtle),
            "ntriples" | "nt" => Ok(RdfFormat::NTriples),
            "jsonld" | "json-ld" => Ok(RdfFormat::JsonLd),
            other => Err(TabgraphError::InvalidConfig(format!(
                "unknown output format: {other}"
            ))),
        }
    }
}

// =============================================================================
// SERIALIZER TRAIT
// =============================================================================

/// An RDF encoder. Implementations never mutate the graph.
pub trait GraphSerializer {
    /// The syntax this encoder produces.
    fn format(&self) -> RdfFormat;

    /// Render the whole graph.
    fn serialize(&self, graph: &Graph, prefixes: &PrefixMap) -> Result<Vec<u8>, TabgraphError>;
}

/// The encoder for `format`.
#[must_use]
pub fn serializer_for(format: RdfFormat) -> Box<dyn GraphSerializer> {
    Box::new(RdfioSerializer::new(format))
}

/// Render the graph once per requested format, in request order.
///
/// The first encoder failure aborts; the graph is left untouched.
pub fn export_all(
    graph: &Graph,
    prefixes: &PrefixMap,
    formats: &[RdfFormat],
) -> Result<Vec<(RdfFormat, Vec<u8>)>, TabgraphError> {
    formats
        .iter()
        .map(|format| {
            let bytes = serializer_for(*format).serialize(graph, prefixes)?;
            tracing::debug!(%format, bytes = bytes.len(), "graph serialized");
            Ok((*format, bytes))
        })
        .collect()
}
