//! # Property-Based Tests
//!
//! Determinism and deduplication invariants checked with proptest.

use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::BTreeSet;
use tabgraph_core::{
    EntityKind, GraphBuilder, GraphStore, Minter, MissingKeyPolicy, Namespaces, Table,
    TransformConfig, Vocabulary, coerce, slugify,
};

const HEADER: [&str; 17] = [
    "id_estudiante",
    "edad",
    "genero",
    "estrato",
    "puntaje_saber11",
    "ciudad_origen",
    "preferencia_area",
    "universidad_codigo",
    "universidad_nombre",
    "universidad_departamento",
    "universidad_tipo",
    "universidad_acreditada",
    "ranking_nacional",
    "eligio_universidad",
    "modalidad_programa",
    "convenio_internacional",
    "beca_disponible",
];

/// (student index, university index, outcome token)
fn rows_strategy() -> impl Strategy<Value = Vec<(u16, u8, bool)>> {
    vec((0u16..500, 0u8..6, any::<bool>()), 1..40)
}

fn build_table(rows: &[(u16, u8, bool)]) -> Table {
    let owned: Vec<Vec<String>> = rows
        .iter()
        .map(|(student, university, chose)| {
            vec![
                format!("E{student}"),
                "18".to_string(),
                "F".to_string(),
                "3".to_string(),
                "300.5".to_string(),
                "Cali".to_string(),
                "Arte".to_string(),
                format!("U{university:03}"),
                format!("Universidad {university}"),
                "Valle".to_string(),
                "Privada".to_string(),
                "Sí".to_string(),
                university.to_string(),
                if *chose { "Sí" } else { "No" }.to_string(),
                "Virtual".to_string(),
                "No".to_string(),
                "No".to_string(),
            ]
        })
        .collect();
    let borrowed: Vec<Vec<&str>> = owned
        .iter()
        .map(|row| row.iter().map(String::as_str).collect())
        .collect();
    Table::from_strs(&HEADER, &borrowed)
}

fn config() -> TransformConfig {
    TransformConfig {
        timestamps: false,
        ..TransformConfig::default()
    }
}

fn minter(digest_chars: usize) -> Minter {
    Minter::new(
        Vocabulary::new(&Namespaces::default()),
        MissingKeyPolicy::Placeholder,
        digest_chars,
    )
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The same table always produces the same graph.
    #[test]
    fn identical_input_produces_identical_graph(rows in rows_strategy()) {
        let table = build_table(&rows);
        let a = GraphBuilder::new(config()).expect("config").transform(&table).expect("transform");
        let b = GraphBuilder::new(config()).expect("config").transform(&table).expect("transform");
        prop_assert_eq!(a.graph, b.graph);
        prop_assert_eq!(a.summary, b.summary);
    }

    /// Exactly one university node per distinct code, and one appliesTo edge
    /// per distinct (student, university) pair.
    #[test]
    fn universities_deduplicate(rows in rows_strategy()) {
        let t = GraphBuilder::new(config())
            .expect("config")
            .transform(&build_table(&rows))
            .expect("transform");

        let codes: BTreeSet<u8> = rows.iter().map(|(_, u, _)| *u).collect();
        let pairs: BTreeSet<(u16, u8)> = rows.iter().map(|(s, u, _)| (*s, *u)).collect();

        prop_assert_eq!(t.summary.entity_count(EntityKind::University), codes.len());
        prop_assert_eq!(t.graph.with_predicate(&t.vocab.applies_to).len(), pairs.len());
        prop_assert_eq!(t.summary.entity_count(EntityKind::AcademicDecision), pairs.len());
    }

    /// Composite identifiers always have the configured digest length.
    #[test]
    fn composite_digest_is_fixed_length(
        left in "[A-Za-z0-9 ]{1,40}",
        right in "[A-Za-z0-9 ]{1,40}",
        digest_chars in 8usize..=64,
    ) {
        prop_assume!(!left.trim().is_empty() && !right.trim().is_empty());
        let iri = minter(digest_chars)
            .mint_composite(EntityKind::AcademicDecision, Some(left.as_str()), Some(right.as_str()))
            .expect("mint");
        let suffix = iri.as_str().rsplit('_').next().unwrap_or_default();
        prop_assert_eq!(suffix.len(), digest_chars);
        prop_assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    /// Slugs never contain characters outside the IRI-safe set.
    #[test]
    fn slugs_are_iri_safe(text in "\\PC{0,40}") {
        let slug = slugify(&text);
        let forbidden = "<>\"{}|^`\\/#?.";
        prop_assert!(!slug.chars().any(|c| c.is_whitespace() || forbidden.contains(c)));
        prop_assert!(!slug.starts_with('_') && !slug.ends_with('_'));
        prop_assert!(!slug.contains("__"));
    }

    /// Integers survive coercion unchanged.
    #[test]
    fn integer_coercion_roundtrips_lexical(n in any::<i64>()) {
        prop_assert_eq!(coerce::integer(&n.to_string()).expect("integer").lexical, n.to_string());
    }
}
