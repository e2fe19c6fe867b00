//! # Integrity Validator
//!
//! Read-only post-pass over a finished graph. Computes referential-integrity
//! and completeness metrics and reports every check that falls short.
//!
//! All ratios are integer counts; [`Ratio::per_thousand`] gives a
//! fixed-point view without floating point.

use crate::graph::GraphStore;
use crate::vocab::Vocabulary;
use crate::{EntityKind, Iri, Object};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Maximum number of offending IRIs carried by one finding.
const FINDING_SAMPLE: usize = 10;

// =============================================================================
// TARGETS
// =============================================================================

/// The classes and predicates the validator checks against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTargets {
    /// `rdf:type`.
    pub rdf_type: Iri,
    /// Class of the primary entities.
    pub primary_type: Iri,
    /// Class of the relationship instances.
    pub instance_type: Iri,
    /// Predicate linking a primary entity to the instances it initiated.
    pub initiated_by: Iri,
    /// Outcome attribute every instance should carry exactly once.
    pub outcome: Iri,
}

impl ValidationTargets {
    /// Targets for graphs produced with `vocab`.
    #[must_use]
    pub fn from_vocabulary(vocab: &Vocabulary) -> Self {
        Self {
            rdf_type: vocab.rdf_type.clone(),
            primary_type: vocab.class_iri(EntityKind::Student),
            instance_type: vocab.class_iri(EntityKind::AcademicDecision),
            initiated_by: vocab.makes.clone(),
            outcome: vocab.final_decision.clone(),
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// `count` out of `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    /// Matching items.
    pub count: usize,
    /// Items considered.
    pub total: usize,
}

impl Ratio {
    /// Create a ratio.
    #[must_use]
    pub fn new(count: usize, total: usize) -> Self {
        Self { count, total }
    }

    /// `count / total` in thousandths, rounded down. Zero when `total` is zero.
    #[must_use]
    pub fn per_thousand(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        (self.count as u64)
            .saturating_mul(1000)
            .checked_div(self.total as u64)
            .unwrap_or(0)
    }

    /// True when every item matched.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count == self.total
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let permille = self.per_thousand();
        write!(
            f,
            "{}/{} ({}.{}%)",
            self.count,
            self.total,
            permille / 10,
            permille % 10
        )
    }
}

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Primary entities without any relationship edge.
    Coverage,
    /// Relationship instances without exactly one outcome.
    Completeness,
    /// Relationship instances without an initiating entity.
    Orphans,
    /// Edge targets without a type declaration.
    UntypedObjects,
    /// Subjects with more than one type declaration.
    MultiplyTyped,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::Coverage => "coverage",
            CheckKind::Completeness => "completeness",
            CheckKind::Orphans => "orphans",
            CheckKind::UntypedObjects => "untyped_objects",
            CheckKind::MultiplyTyped => "multiply_typed",
        };
        f.write_str(name)
    }
}

/// A check that fell short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The failing check.
    pub check: CheckKind,
    /// Human-readable description.
    pub message: String,
    /// Up to ten offending IRIs, in sorted order.
    pub sample: Vec<Iri>,
}

/// Result of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Primary entities with at least one outbound relationship edge.
    pub coverage: Ratio,
    /// Instances with exactly one outcome attribute.
    pub completeness: Ratio,
    /// Instances with no inbound initiating edge.
    pub orphans: Ratio,
    /// IRIs used as edge objects but never typed.
    pub untyped_objects: Vec<Iri>,
    /// Subjects carrying more than one `rdf:type`.
    pub multiply_typed: Vec<Iri>,
    /// One entry per failing check.
    pub findings: Vec<Finding>,
}

impl IntegrityReport {
    /// True when no check produced a finding.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// The finding for `check`, if any.
    #[must_use]
    pub fn finding(&self, check: CheckKind) -> Option<&Finding> {
        self.findings.iter().find(|f| f.check == check)
    }
}

// =============================================================================
// VALIDATOR
// =============================================================================

/// Computes an [`IntegrityReport`] for any [`GraphStore`].
#[derive(Debug, Clone)]
pub struct IntegrityValidator {
    targets: ValidationTargets,
}

impl IntegrityValidator {
    /// Create a validator for the given targets.
    #[must_use]
    pub fn new(targets: ValidationTargets) -> Self {
        Self { targets }
    }

    /// Run every check. Never mutates the graph.
    pub fn validate<G: GraphStore>(&self, graph: &G) -> IntegrityReport {
        let t = &self.targets;
        let mut report = IntegrityReport::default();

        // Coverage
        let primaries = graph.subjects_of_type(&t.rdf_type, &t.primary_type);
        let uncovered: Vec<Iri> = primaries
            .iter()
            .filter(|subject| {
                !graph
                    .outbound(subject)
                    .iter()
                    .any(|(p, o)| **p != t.rdf_type && o.as_iri().is_some())
            })
            .map(|subject| (*subject).clone())
            .collect();
        report.coverage = Ratio::new(
            primaries.len().saturating_sub(uncovered.len()),
            primaries.len(),
        );
        if !uncovered.is_empty() {
            report.findings.push(finding(
                CheckKind::Coverage,
                format!(
                    "{} primary entities have no relationship edge (coverage {})",
                    uncovered.len(),
                    report.coverage
                ),
                uncovered,
            ));
        }

        // Completeness and orphans
        let instances = graph.subjects_of_type(&t.rdf_type, &t.instance_type);
        let mut incomplete = Vec::new();
        let mut orphaned = Vec::new();
        for instance in &instances {
            if graph.objects(instance, &t.outcome).len() != 1 {
                incomplete.push((*instance).clone());
            }
            if graph.inbound(instance, &t.initiated_by).is_empty() {
                orphaned.push((*instance).clone());
            }
        }
        report.completeness = Ratio::new(
            instances.len().saturating_sub(incomplete.len()),
            instances.len(),
        );
        report.orphans = Ratio::new(orphaned.len(), instances.len());
        if !incomplete.is_empty() {
            report.findings.push(finding(
                CheckKind::Completeness,
                format!(
                    "{} relationship instances lack exactly one outcome (completeness {})",
                    incomplete.len(),
                    report.completeness
                ),
                incomplete,
            ));
        }
        if !orphaned.is_empty() {
            report.findings.push(finding(
                CheckKind::Orphans,
                format!(
                    "{} relationship instances have no initiating entity",
                    orphaned.len()
                ),
                orphaned,
            ));
        }

        // Untyped edge targets
        let untyped: BTreeSet<Iri> = graph
            .triples()
            .filter(|triple| triple.predicate != t.rdf_type)
            .filter_map(|triple| match &triple.object {
                Object::Iri(target) => Some(target),
                Object::Literal(_) => None,
            })
            .filter(|target| graph.objects(target, &t.rdf_type).is_empty())
            .cloned()
            .collect();
        report.untyped_objects = untyped.into_iter().collect();
        if !report.untyped_objects.is_empty() {
            report.findings.push(finding(
                CheckKind::UntypedObjects,
                format!(
                    "{} edge targets have no type declaration",
                    report.untyped_objects.len()
                ),
                report.untyped_objects.clone(),
            ));
        }

        // Multiply typed subjects
        let typed: BTreeSet<&Iri> = graph
            .with_predicate(&t.rdf_type)
            .into_iter()
            .map(|(subject, _)| subject)
            .collect();
        report.multiply_typed = typed
            .into_iter()
            .filter(|subject| graph.objects(subject, &t.rdf_type).len() > 1)
            .cloned()
            .collect();
        if !report.multiply_typed.is_empty() {
            report.findings.push(finding(
                CheckKind::MultiplyTyped,
                format!(
                    "{} subjects carry more than one type",
                    report.multiply_typed.len()
                ),
                report.multiply_typed.clone(),
            ));
        }

        for f in &report.findings {
            tracing::warn!(check = %f.check, "{}", f.message);
        }
        tracing::info!(
            coverage = %report.coverage,
            completeness = %report.completeness,
            orphans = report.orphans.count,
            findings = report.findings.len(),
            "integrity validation complete"
        );

        report
    }
}

fn finding(check: CheckKind, message: String, mut offenders: Vec<Iri>) -> Finding {
    offenders.sort();
    offenders.truncate(FINDING_SAMPLE);
    Finding {
        check,
        message,
        sample: offenders,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::vocab::Namespaces;
    use crate::{Literal, Triple};

    fn vocab() -> Vocabulary {
        Vocabulary::new(&Namespaces::default())
    }

    fn student(i: usize) -> Iri {
        Iri::new(format!("http://example.org/university/student_{i}"))
    }

    #[test]
    fn coverage_counts_primaries_with_edges() {
        let v = vocab();
        let university = Iri::new("http://example.org/university/university_u1");
        let mut graph = Graph::new();
        graph
            .insert(Triple::new(
                university.clone(),
                v.rdf_type.clone(),
                v.class_iri(EntityKind::University),
            ))
            .expect("insert");

        for i in 0..100 {
            graph
                .insert(Triple::new(
                    student(i),
                    v.rdf_type.clone(),
                    v.class_iri(EntityKind::Student),
                ))
                .expect("insert");
            if i < 97 {
                graph
                    .insert(Triple::new(student(i), v.applies_to.clone(), university.clone()))
                    .expect("insert");
            }
        }

        let report = IntegrityValidator::new(ValidationTargets::from_vocabulary(&v)).validate(&graph);
        assert_eq!(report.coverage, Ratio::new(97, 100));
        assert_eq!(report.coverage.per_thousand(), 970);
        let f = report.finding(CheckKind::Coverage).expect("coverage finding");
        assert_eq!(f.sample.len(), 3);
        assert!(report.untyped_objects.is_empty());
    }

    #[test]
    fn literal_edges_do_not_count_as_coverage() {
        let v = vocab();
        let graph = Graph::from_triples([
            Triple::new(student(1), v.rdf_type.clone(), v.class_iri(EntityKind::Student)),
            Triple::new(student(1), v.age.clone(), Literal::integer(18)),
        ]);
        let report = IntegrityValidator::new(ValidationTargets::from_vocabulary(&v)).validate(&graph);
        assert_eq!(report.coverage, Ratio::new(0, 1));
    }

    #[test]
    fn orphan_and_incomplete_instances_reported() {
        let v = vocab();
        let decision = Iri::new("http://example.org/behavior/decision_deadbeef");
        let graph = Graph::from_triples([Triple::new(
            decision.clone(),
            v.rdf_type.clone(),
            v.class_iri(EntityKind::AcademicDecision),
        )]);

        let report = IntegrityValidator::new(ValidationTargets::from_vocabulary(&v)).validate(&graph);
        assert_eq!(report.completeness, Ratio::new(0, 1));
        assert_eq!(report.orphans, Ratio::new(1, 1));
        assert_eq!(
            report.finding(CheckKind::Orphans).map(|f| f.sample.clone()),
            Some(vec![decision])
        );
    }

    #[test]
    fn untyped_and_multiply_typed_detected() {
        let v = vocab();
        let city = Iri::new("http://example.org/geography/city_cali");
        let graph = Graph::from_triples([
            Triple::new(student(1), v.rdf_type.clone(), v.class_iri(EntityKind::Student)),
            Triple::new(student(1), v.rdf_type.clone(), v.class_iri(EntityKind::City)),
            Triple::new(student(1), v.origin_from.clone(), city.clone()),
        ]);

        let report = IntegrityValidator::new(ValidationTargets::from_vocabulary(&v)).validate(&graph);
        assert_eq!(report.untyped_objects, vec![city]);
        assert_eq!(report.multiply_typed, vec![student(1)]);
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_graph_is_clean() {
        let report = IntegrityValidator::new(ValidationTargets::from_vocabulary(&vocab()))
            .validate(&Graph::new());
        assert!(report.is_clean());
        assert_eq!(report.coverage.per_thousand(), 0);
    }

    #[test]
    fn ratio_display_uses_tenths_of_percent() {
        assert_eq!(Ratio::new(97, 100).to_string(), "97/100 (97.0%)");
        assert_eq!(Ratio::new(1, 3).to_string(), "1/3 (33.3%)");
    }
}
