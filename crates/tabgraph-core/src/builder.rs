//! # Graph Builder
//!
//! Drives the row-by-row transformation of a [`Table`] into a [`Graph`].
//!
//! For each row the builder:
//! 1. Mints the student IRI
//! 2. Resolves referenced entities (city, area, university, departments)
//!    through the [`EntityRegistry`], declaring them on first sighting
//! 3. Emits the student's type and scalar attributes, skipping missing cells
//! 4. Emits student → referenced-entity relationship triples
//! 5. Synthesizes the decision node linking the student to the university
//!
//! Coercion failures drop one attribute and are collected as
//! [`AttributeError`]s. Only configuration errors and store failures abort.

use crate::coerce;
use crate::config::TransformConfig;
use crate::graph::{Graph, GraphStore};
use crate::minter::Minter;
use crate::primitives::{MAX_CELL_LENGTH, PLACEHOLDER_KEY};
use crate::registry::{EntityRegistry, Resolved};
use crate::schema::{RowSchema, SourceRecord, Table};
use crate::validator::{IntegrityReport, IntegrityValidator, ValidationTargets};
use crate::vocab::{PrefixMap, Vocabulary};
use crate::{AttributeError, EntityKind, Iri, Literal, Object, TabgraphError, Triple};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// OUTPUT
// =============================================================================

/// Counts describing a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSummary {
    /// Rows read from the table.
    pub rows_processed: usize,
    /// Rows dropped because their primary key was rejected.
    pub rows_skipped: usize,
    /// Distinct triples in the graph.
    pub triple_count: usize,
    /// Typed nodes per entity kind.
    pub entities: BTreeMap<EntityKind, usize>,
    /// IRI-valued edges per predicate IRI (`rdf:type` excluded).
    pub relationships: BTreeMap<String, usize>,
    /// Attributes dropped during coercion or key resolution.
    pub attribute_issues: usize,
}

impl TransformSummary {
    /// Number of typed nodes of `kind`.
    #[must_use]
    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.entities.get(&kind).copied().unwrap_or(0)
    }

    /// Number of edges using `predicate`.
    #[must_use]
    pub fn relationship_count(&self, predicate: &Iri) -> usize {
        self.relationships
            .get(predicate.as_str())
            .copied()
            .unwrap_or(0)
    }
}

/// The result of one run. The graph is complete and no longer mutated.
#[derive(Debug, Clone)]
pub struct Transformation {
    /// The finished graph.
    pub graph: Graph,
    /// Registry state at the end of the run.
    pub registry: EntityRegistry,
    /// Run summary.
    pub summary: TransformSummary,
    /// Every dropped attribute, in row order.
    pub issues: Vec<AttributeError>,
    /// Vocabulary the graph was built with.
    pub vocab: Vocabulary,
}

impl Transformation {
    /// Run the integrity validator over the finished graph.
    #[must_use]
    pub fn validate(&self) -> IntegrityReport {
        IntegrityValidator::new(ValidationTargets::from_vocabulary(&self.vocab))
            .validate(&self.graph)
    }

    /// Prefix bindings for the serializers.
    #[must_use]
    pub fn prefixes(&self) -> PrefixMap {
        self.vocab.prefixes()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Row-by-row graph builder. Owns the graph and the entity registry.
#[derive(Debug)]
pub struct GraphBuilder {
    config: TransformConfig,
    minter: Minter,
    registry: EntityRegistry,
    graph: Graph,
    issues: Vec<AttributeError>,
    rows_processed: usize,
    rows_skipped: usize,
    started_at: DateTime<Utc>,
}

impl GraphBuilder {
    /// Create a builder. Fails if the configuration is invalid.
    pub fn new(config: TransformConfig) -> Result<Self, TabgraphError> {
        config.validate()?;
        let vocab = Vocabulary::new(&config.namespaces);
        let minter = Minter::new(vocab, config.missing_key, config.digest_chars);

        Ok(Self {
            config,
            minter,
            registry: EntityRegistry::new(),
            graph: Graph::new(),
            issues: Vec::new(),
            rows_processed: 0,
            rows_skipped: 0,
            started_at: Utc::now(),
        })
    }

    /// Override the creation timestamp stamped on decisions and the dataset.
    #[must_use]
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = at;
        self
    }

    /// The vocabulary in use.
    #[must_use]
    pub fn vocab(&self) -> &Vocabulary {
        self.minter.vocab()
    }

    /// Transform a whole table.
    ///
    /// The header is checked before any row is processed; a missing column
    /// returns `TabgraphError::MissingColumn` and nothing is built.
    pub fn transform(mut self, table: &Table) -> Result<Transformation, TabgraphError> {
        let schema = RowSchema::bind(&self.config.columns, table.columns())?;
        tracing::info!(
            rows = table.len(),
            columns = table.columns().len(),
            "starting transformation"
        );

        for (index, row) in table.rows().iter().enumerate() {
            let record = schema.record(row);
            self.process_record(index, &record)?;
        }

        self.finish()
    }

    /// Transform one record. `row` is its index, used in issue reports.
    pub fn process_record(
        &mut self,
        row: usize,
        record: &SourceRecord,
    ) -> Result<(), TabgraphError> {
        self.rows_processed = self.rows_processed.saturating_add(1);
        let columns = self.config.columns.clone();
        let record = &self.screen(row, record);
        let student_key = record.student_id.as_deref();

        // 1. primary entity
        let student = match self.minter.mint(EntityKind::Student, student_key) {
            Ok(iri) => iri,
            Err(TabgraphError::MissingKey { .. }) => {
                self.rows_skipped = self.rows_skipped.saturating_add(1);
                self.drop_attribute(
                    row,
                    &columns.student_id,
                    "",
                    "row skipped: missing primary key",
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let student_id = student_key.unwrap_or(PLACEHOLDER_KEY);
        tracing::debug!(row, %student, "processing row");

        // 2. referenced entities
        let city = self.resolve_simple(
            row,
            EntityKind::City,
            &columns.origin_city,
            record.origin_city.as_deref(),
        )?;
        if let (Some(city), Some(key)) = (&city, record.origin_city.as_deref())
            && city.first_sighting
        {
            self.declare_city(row, &city.iri, key, record)?;
        }

        let area = self.resolve_simple(
            row,
            EntityKind::KnowledgeArea,
            &columns.preferred_area,
            record.preferred_area.as_deref(),
        )?;
        if let (Some(area), Some(key)) = (&area, record.preferred_area.as_deref())
            && area.first_sighting
        {
            self.declare_simple(EntityKind::KnowledgeArea, &area.iri, key)?;
            self.registry.mark_declared(EntityKind::KnowledgeArea, key);
        }

        let university = self.resolve_simple(
            row,
            EntityKind::University,
            &columns.university_code,
            record.university_code.as_deref(),
        )?;
        if let (Some(university), Some(key)) = (&university, record.university_code.as_deref())
            && university.first_sighting
        {
            self.declare_university(row, &university.iri, key, record)?;
        }

        // 3. primary entity attributes
        let vocab = self.minter.vocab().clone();
        self.emit(&student, &vocab.rdf_type, vocab.class_iri(EntityKind::Student))?;
        self.emit(&student, &vocab.dc_identifier, Literal::string(student_id))?;
        let label = self.config.labels.student_label(student_id);
        self.emit(&student, &vocab.rdfs_label, self.tagged(label))?;
        self.emit_integer(row, &columns.age, &student, &vocab.age, record.age.as_deref())?;
        self.emit_text(&student, &vocab.gender, record.gender.as_deref())?;
        self.emit_integer(
            row,
            &columns.stratum,
            &student,
            &vocab.socioeconomic_stratum,
            record.stratum.as_deref(),
        )?;
        self.emit_decimal(
            row,
            &columns.score,
            &student,
            &vocab.saber11_score,
            record.score.as_deref(),
        )?;

        // 4. relationships
        if let Some(city) = &city {
            self.emit(&student, &vocab.origin_from, city.iri.clone())?;
        }
        if let Some(area) = &area {
            self.emit(&student, &vocab.prefers_area, area.iri.clone())?;
        }

        // 5. relationship instance
        if let (Some(university), Some(code)) = (&university, record.university_code.as_deref()) {
            self.emit(&student, &vocab.applies_to, university.iri.clone())?;
            self.emit_decision(row, &student, student_id, &university.iri, code, record)?;
        }

        Ok(())
    }

    /// Close the run: emit dataset metadata and compute the summary.
    pub fn finish(mut self) -> Result<Transformation, TabgraphError> {
        if let Some(dataset) = self.config.dataset.clone() {
            let vocab = self.minter.vocab().clone();
            let iri = self.minter.mint(EntityKind::Dataset, Some(&dataset.slug))?;
            self.emit(&iri, &vocab.rdf_type, vocab.class_iri(EntityKind::Dataset))?;
            self.emit(&iri, &vocab.dc_title, self.tagged(dataset.title))?;
            self.emit(&iri, &vocab.dc_description, self.tagged(dataset.description))?;
            self.emit(&iri, &vocab.dc_creator, self.tagged(dataset.creator))?;
            self.emit(
                &iri,
                &vocab.dc_language,
                Literal::string(self.config.language.clone()),
            )?;
            self.emit(&iri, &vocab.dcterms_spatial, self.tagged(dataset.spatial))?;
            if self.config.timestamps {
                self.emit(&iri, &vocab.dcterms_created, Literal::date_time(self.started_at))?;
            }
            self.emit(
                &iri,
                &vocab.schema_number_of_items,
                Literal::integer(self.rows_processed as i64),
            )?;
        }

        let vocab = self.minter.vocab().clone();
        let summary = summarize(
            &self.graph,
            &vocab,
            self.rows_processed,
            self.rows_skipped,
            self.issues.len(),
        );

        tracing::info!(
            rows = summary.rows_processed,
            skipped = summary.rows_skipped,
            triples = summary.triple_count,
            issues = summary.attribute_issues,
            "transformation complete"
        );

        Ok(Transformation {
            graph: self.graph,
            registry: self.registry,
            summary,
            issues: self.issues,
            vocab,
        })
    }

    // -------------------------------------------------------------------------
    // referenced entities
    // -------------------------------------------------------------------------

    /// Resolve a referenced entity. Missing cells resolve to `None`; a
    /// rejected key is recorded as an issue and also resolves to `None`.
    fn resolve_simple(
        &mut self,
        row: usize,
        kind: EntityKind,
        column: &str,
        key: Option<&str>,
    ) -> Result<Option<Resolved>, TabgraphError> {
        let Some(key) = key else {
            return Ok(None);
        };
        match self.registry.resolve(kind, key, &self.minter) {
            Ok(resolved) => Ok(Some(resolved)),
            Err(TabgraphError::MissingKey { .. }) => {
                self.drop_attribute(row, column, key, "natural key has no usable characters");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Type, label and identifier for an entity identified by its key text.
    fn declare_simple(
        &mut self,
        kind: EntityKind,
        iri: &Iri,
        key: &str,
    ) -> Result<(), TabgraphError> {
        let vocab = self.minter.vocab().clone();
        self.emit(iri, &vocab.rdf_type, vocab.class_iri(kind))?;
        self.emit(iri, &vocab.rdfs_label, self.tagged(key.to_string()))?;
        self.emit(iri, &vocab.dc_identifier, Literal::string(key))?;
        Ok(())
    }

    fn declare_city(
        &mut self,
        row: usize,
        iri: &Iri,
        key: &str,
        record: &SourceRecord,
    ) -> Result<(), TabgraphError> {
        self.declare_simple(EntityKind::City, iri, key)?;
        let column = self.config.columns.origin_department.clone();
        if let Some(department) =
            self.resolve_department(row, &column, record.origin_department.as_deref())?
        {
            let located_in = self.minter.vocab().located_in.clone();
            self.emit(iri, &located_in, department)?;
        }
        self.registry.mark_declared(EntityKind::City, key);
        Ok(())
    }

    fn declare_university(
        &mut self,
        row: usize,
        iri: &Iri,
        key: &str,
        record: &SourceRecord,
    ) -> Result<(), TabgraphError> {
        let vocab = self.minter.vocab().clone();
        let columns = self.config.columns.clone();

        self.emit(iri, &vocab.rdf_type, vocab.class_iri(EntityKind::University))?;
        self.emit(iri, &vocab.dc_identifier, Literal::string(key))?;
        // The name is the label; a university without a name is labelled by its code.
        let name = record.university_name.as_deref().unwrap_or(key);
        self.emit_text(iri, &vocab.rdfs_label, Some(name))?;
        self.emit_text(iri, &vocab.dc_title, record.university_name.as_deref())?;
        self.emit_text(iri, &vocab.has_type, record.university_type.as_deref())?;
        self.emit_boolean(
            row,
            &columns.university_accredited,
            iri,
            &vocab.is_accredited,
            record.university_accredited.as_deref(),
        )?;
        self.emit_integer(
            row,
            &columns.national_ranking,
            iri,
            &vocab.national_ranking,
            record.national_ranking.as_deref(),
        )?;
        // offer flags describe the institution, first sighting wins
        self.emit_boolean(
            row,
            &columns.international_agreement,
            iri,
            &vocab.has_international_agreement,
            record.international_agreement.as_deref(),
        )?;
        self.emit_boolean(
            row,
            &columns.scholarship_available,
            iri,
            &vocab.has_scholarship,
            record.scholarship_available.as_deref(),
        )?;

        if let Some(department) = self.resolve_department(
            row,
            &columns.university_department,
            record.university_department.as_deref(),
        )? {
            self.emit(iri, &vocab.located_in, department)?;
        }

        self.registry.mark_declared(EntityKind::University, key);
        Ok(())
    }

    fn resolve_department(
        &mut self,
        row: usize,
        column: &str,
        key: Option<&str>,
    ) -> Result<Option<Iri>, TabgraphError> {
        let Some(resolved) = self.resolve_simple(row, EntityKind::Department, column, key)? else {
            return Ok(None);
        };
        if let Some(key) = key
            && resolved.first_sighting
        {
            self.declare_simple(EntityKind::Department, &resolved.iri, key)?;
            self.registry.mark_declared(EntityKind::Department, key);
        }
        Ok(Some(resolved.iri))
    }

    // -------------------------------------------------------------------------
    // relationship instance
    // -------------------------------------------------------------------------

    fn emit_decision(
        &mut self,
        row: usize,
        student: &Iri,
        student_id: &str,
        university: &Iri,
        code: &str,
        record: &SourceRecord,
    ) -> Result<(), TabgraphError> {
        let vocab = self.minter.vocab().clone();
        let columns = self.config.columns.clone();

        let decision = match self.minter.mint_composite(
            EntityKind::AcademicDecision,
            Some(student_id),
            Some(code),
        ) {
            Ok(iri) => iri,
            Err(TabgraphError::MissingKey { .. }) => {
                self.drop_attribute(row, &columns.university_code, code, "decision key rejected");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        self.emit(&decision, &vocab.rdf_type, vocab.class_iri(EntityKind::AcademicDecision))?;
        self.emit(student, &vocab.makes, decision.clone())?;
        let label = self.config.labels.decision_label(student_id, code);
        self.emit(&decision, &vocab.rdfs_label, self.tagged(label))?;

        self.emit_outcome(
            row,
            &columns.chose_university,
            &decision,
            &vocab.final_decision,
            record.chose_university.as_deref(),
        )?;
        self.emit_text(
            &decision,
            &vocab.program_modality,
            record.program_modality.as_deref(),
        )?;

        self.emit(&decision, &vocab.dc_subject, university.clone())?;
        if self.config.timestamps {
            self.emit(&decision, &vocab.dcterms_created, Literal::date_time(self.started_at))?;
        }
        Ok(())
    }

    /// The outcome of a decision. A repeated (student, university) pair
    /// resolves to the same decision node; its first outcome is kept and a
    /// different later one is reported.
    fn emit_outcome(
        &mut self,
        row: usize,
        column: &str,
        decision: &Iri,
        predicate: &Iri,
        value: Option<&str>,
    ) -> Result<(), TabgraphError> {
        let Some(value) = value else {
            return Ok(());
        };
        let outcome = match coerce::boolean(value, self.config.boolean) {
            Ok(literal) => Object::Literal(literal),
            Err(reason) => {
                self.drop_attribute(row, column, value, &reason);
                return Ok(());
            }
        };

        let existing = self.graph.objects(decision, predicate);
        if !existing.is_empty() && !existing.contains(&&outcome) {
            self.drop_attribute(row, column, value, "conflicting outcome for existing decision");
            return Ok(());
        }
        self.emit(decision, predicate, outcome)
    }

    // -------------------------------------------------------------------------
    // emission helpers
    // -------------------------------------------------------------------------

    /// Copy of `record` with unusable cells removed.
    ///
    /// Cells longer than [`MAX_CELL_LENGTH`] or containing control characters
    /// (other than tab, LF and CR) are dropped and reported.
    fn screen(&mut self, row: usize, record: &SourceRecord) -> SourceRecord {
        let columns = self.config.columns.clone();
        let mut clean = record.clone();
        for (column, cell) in clean.cells_mut(&columns) {
            let reason = match cell.as_deref() {
                Some(text) if text.len() > MAX_CELL_LENGTH => "cell exceeds maximum length",
                Some(text) if text.chars().any(is_forbidden_char) => {
                    "cell contains control characters"
                }
                _ => continue,
            };
            let value = cell.take().unwrap_or_default();
            self.drop_attribute(row, column, &value, reason);
        }
        clean
    }

    fn emit(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        object: impl Into<Object>,
    ) -> Result<(), TabgraphError> {
        self.graph
            .insert(Triple::new(subject.clone(), predicate.clone(), object))?;
        Ok(())
    }

    fn tagged(&self, text: String) -> Literal {
        Literal::lang_string(text, self.config.language.clone())
    }

    fn emit_text(
        &mut self,
        subject: &Iri,
        predicate: &Iri,
        value: Option<&str>,
    ) -> Result<(), TabgraphError> {
        let Some(value) = value else {
            return Ok(());
        };
        let literal = self.tagged(value.to_string());
        self.emit(subject, predicate, literal)
    }

    fn emit_integer(
        &mut self,
        row: usize,
        column: &str,
        subject: &Iri,
        predicate: &Iri,
        value: Option<&str>,
    ) -> Result<(), TabgraphError> {
        self.emit_coerced(row, column, subject, predicate, value, coerce::integer)
    }

    fn emit_decimal(
        &mut self,
        row: usize,
        column: &str,
        subject: &Iri,
        predicate: &Iri,
        value: Option<&str>,
    ) -> Result<(), TabgraphError> {
        self.emit_coerced(row, column, subject, predicate, value, coerce::decimal)
    }

    fn emit_boolean(
        &mut self,
        row: usize,
        column: &str,
        subject: &Iri,
        predicate: &Iri,
        value: Option<&str>,
    ) -> Result<(), TabgraphError> {
        let policy = self.config.boolean;
        self.emit_coerced(row, column, subject, predicate, value, |text| {
            coerce::boolean(text, policy)
        })
    }

    fn emit_coerced(
        &mut self,
        row: usize,
        column: &str,
        subject: &Iri,
        predicate: &Iri,
        value: Option<&str>,
        coerce: impl Fn(&str) -> Result<Literal, String>,
    ) -> Result<(), TabgraphError> {
        let Some(value) = value else {
            return Ok(());
        };
        match coerce(value) {
            Ok(literal) => self.emit(subject, predicate, literal),
            Err(reason) => {
                self.drop_attribute(row, column, value, &reason);
                Ok(())
            }
        }
    }

    fn drop_attribute(&mut self, row: usize, column: &str, value: &str, reason: &str) {
        let issue = AttributeError {
            row,
            attribute: column.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        tracing::warn!("{}", issue);
        self.issues.push(issue);
    }
}

/// Characters no cell may carry into the graph: control characters other
/// than tab, LF and CR, and the noncharacters U+FFFE and U+FFFF.
fn is_forbidden_char(c: char) -> bool {
    (c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
        || matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

/// Count typed nodes per kind and IRI-valued edges per predicate.
fn summarize(
    graph: &Graph,
    vocab: &Vocabulary,
    rows_processed: usize,
    rows_skipped: usize,
    attribute_issues: usize,
) -> TransformSummary {
    let entities = EntityKind::ALL
        .iter()
        .map(|kind| {
            let count = graph
                .subjects_of_type(&vocab.rdf_type, &vocab.class_iri(*kind))
                .len();
            (*kind, count)
        })
        .collect();

    let mut relationships: BTreeMap<String, usize> = BTreeMap::new();
    for triple in graph.triples() {
        if triple.predicate != vocab.rdf_type && triple.object.as_iri().is_some() {
            let count = relationships
                .entry(triple.predicate.as_str().to_string())
                .or_default();
            *count = count.saturating_add(1);
        }
    }

    TransformSummary {
        rows_processed,
        rows_skipped,
        triple_count: graph.triple_count(),
        entities,
        relationships,
        attribute_issues,
    }
}

// =============================================================================
// TESTS
// =============================================================================
