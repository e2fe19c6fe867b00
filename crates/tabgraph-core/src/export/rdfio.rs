//! Serializer backed by the `oxrdfio` writers.
//!
//! Graph terms are converted to `oxrdf` terms one triple at a time and
//! streamed into the writer for the requested syntax, so escaping, prefixed
//! names and document structure all come from the RDF library.

use super::{GraphSerializer, RdfFormat};
use crate::graph::{Graph, GraphStore};
use crate::vocab::{PrefixMap, ns};
use crate::{Datatype, Iri, Literal, Object, TabgraphError, Triple};

/// Writes one RDF syntax through `oxrdfio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RdfioSerializer {
    format: RdfFormat,
}

impl RdfioSerializer {
    /// Serializer for `format`.
    #[must_use]
    pub fn new(format: RdfFormat) -> Self {
        Self { format }
    }
}

impl GraphSerializer for RdfioSerializer {
    fn format(&self) -> RdfFormat {
        self.format
    }

    fn serialize(&self, graph: &Graph, prefixes: &PrefixMap) -> Result<Vec<u8>, TabgraphError> {
        if self.format == RdfFormat::RdfXml {
            ensure_xml_chars(graph)?;
        }

        let mut serializer = oxrdfio::RdfSerializer::from_format(library_format(self.format)?);
        for (prefix, namespace) in prefixes.iter() {
            // rdf: is always declared by the RDF/XML writer
            if self.format == RdfFormat::RdfXml && namespace == ns::RDF {
                continue;
            }
            serializer = serializer.with_prefix(prefix, namespace).map_err(|e| {
                TabgraphError::SerializationError(format!("prefix {prefix}: {e}"))
            })?;
        }

        let mut writer = serializer.for_writer(Vec::new());
        for triple in graph.triples() {
            writer
                .serialize_triple(&to_rdf_triple(triple)?)
                .map_err(|e| write_error(self.format, e))?;
        }
        writer.finish().map_err(|e| write_error(self.format, e))
    }
}

fn write_error(format: RdfFormat, error: std::io::Error) -> TabgraphError {
    TabgraphError::SerializationError(format!("{format}: {error}"))
}

/// The `oxrdfio` syntax matching `format`, looked up by file extension.
fn library_format(format: RdfFormat) -> Result<oxrdfio::RdfFormat, TabgraphError> {
    oxrdfio::RdfFormat::from_extension(format.extension()).ok_or_else(|| {
        TabgraphError::SerializationError(format!("no writer available for {format}"))
    })
}

// =============================================================================
// TERM CONVERSION
// =============================================================================

/// Convert a graph triple into an `oxrdf` triple.
///
/// Fails if an IRI or a language tag is not well formed.
pub fn to_rdf_triple(triple: &Triple) -> Result<oxrdf::Triple, TabgraphError> {
    let subject = named_node(&triple.subject)?;
    let predicate = named_node(&triple.predicate)?;
    let object: oxrdf::Term = match &triple.object {
        Object::Iri(iri) => named_node(iri)?.into(),
        Object::Literal(literal) => rdf_literal(literal)?.into(),
    };
    Ok(oxrdf::Triple::new(subject, predicate, object))
}

fn named_node(iri: &Iri) -> Result<oxrdf::NamedNode, TabgraphError> {
    oxrdf::NamedNode::new(iri.as_str())
        .map_err(|e| TabgraphError::SerializationError(format!("invalid IRI <{iri}>: {e}")))
}

fn rdf_literal(literal: &Literal) -> Result<oxrdf::Literal, TabgraphError> {
    if let Some(language) = &literal.language {
        return oxrdf::Literal::new_language_tagged_literal(literal.lexical.as_str(), language)
            .map_err(|e| {
                TabgraphError::SerializationError(format!("invalid language tag {language}: {e}"))
            });
    }
    if literal.datatype == Datatype::String {
        return Ok(oxrdf::Literal::new_simple_literal(literal.lexical.as_str()));
    }
    let datatype = named_node(&Iri::new(format!(
        "{}{}",
        ns::XSD,
        literal.datatype.xsd_local_name()
    )))?;
    Ok(oxrdf::Literal::new_typed_literal(
        literal.lexical.as_str(),
        datatype,
    ))
}

// =============================================================================
// XML CHARACTER CHECK
// =============================================================================

/// RDF/XML cannot carry characters outside the XML 1.0 `Char` production.
fn ensure_xml_chars(graph: &Graph) -> Result<(), TabgraphError> {
    for triple in graph.triples() {
        let Object::Literal(literal) = &triple.object else {
            continue;
        };
        if let Some(c) = literal.lexical.chars().find(|c| !is_xml_char(*c)) {
            return Err(TabgraphError::SerializationError(format!(
                "rdfxml: literal of <{}> <{}> contains U+{:04X}, not allowed in XML",
                triple.subject,
                triple.predicate,
                u32::from(c)
            )));
        }
    }
    Ok(())
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
