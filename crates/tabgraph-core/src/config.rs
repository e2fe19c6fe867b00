//! # Transformation Configuration
//!
//! Everything a run may tune: namespaces, language tag, data-quality
//! policies, digest length, column names, label templates and dataset
//! metadata. All sections default to the university-choice dataset, so an
//! empty TOML document is a valid configuration.

use crate::primitives::{DEFAULT_DIGEST_CHARS, MAX_DIGEST_CHARS, MIN_DIGEST_CHARS};
use crate::schema::ColumnMap;
use crate::vocab::Namespaces;
use crate::TabgraphError;
use serde::{Deserialize, Serialize};

// =============================================================================
// POLICIES
// =============================================================================

/// What to do when a natural key is missing or slugs to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Substitute [`crate::primitives::PLACEHOLDER_KEY`]. All such rows share
    /// one `<kind>_unknown` node.
    #[default]
    Placeholder,
    /// Refuse to mint. Referenced entities are skipped, rows without a
    /// primary key are skipped; both are reported as issues.
    Reject,
}

/// How boolean-like cells are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanPolicy {
    /// Truthy tokens map to `true`, anything else to `false`.
    #[default]
    DefaultFalse,
    /// Truthy tokens map to `true`, falsy tokens to `false`, anything else
    /// is an attribute error.
    Strict,
}

// =============================================================================
// LABELS & METADATA
// =============================================================================

/// Label templates. `{id}`, `{student}` and `{university}` are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelTemplates {
    /// Label of a student node.
    pub student: String,
    /// Label of a decision node.
    pub decision: String,
}

impl Default for LabelTemplates {
    fn default() -> Self {
        Self {
            student: "Estudiante {id}".to_string(),
            decision: "Decisión de {student} sobre {university}".to_string(),
        }
    }
}

impl LabelTemplates {
    /// Render the student label.
    #[must_use]
    pub fn student_label(&self, id: &str) -> String {
        self.student.replace("{id}", id)
    }

    /// Render the decision label.
    #[must_use]
    pub fn decision_label(&self, student: &str, university: &str) -> String {
        self.decision
            .replace("{student}", student)
            .replace("{university}", university)
    }
}

/// Descriptive metadata for the dataset node emitted at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetMetadata {
    /// Local name of the dataset node in the university namespace.
    pub slug: String,
    pub title: String,
    pub description: String,
    pub creator: String,
    /// Geographic coverage.
    pub spatial: String,
}

impl Default for DatasetMetadata {
    fn default() -> Self {
        Self {
            slug: "university_choices".to_string(),
            title: "Dataset de Decisiones Universitarias Colombia".to_string(),
            description: "Datos sobre patrones de comportamiento estudiantil en la selección de universidades en Colombia".to_string(),
            creator: "Proyecto Linked Data - Web Semántica".to_string(),
            spatial: "Colombia".to_string(),
        }
    }
}

// =============================================================================
// TRANSFORM CONFIG
// =============================================================================

/// Configuration of one transformation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Language tag attached to labels and free-text attributes.
    pub language: String,
    /// Missing natural key handling.
    pub missing_key: MissingKeyPolicy,
    /// Boolean normalization.
    pub boolean: BooleanPolicy,
    /// Hex characters kept from composite digests.
    pub digest_chars: usize,
    /// Emit `dcterms:created` on decisions and the dataset node.
    pub timestamps: bool,
    /// Dataset namespaces.
    pub namespaces: Namespaces,
    /// Source column names.
    pub columns: ColumnMap,
    /// Label templates.
    pub labels: LabelTemplates,
    /// Dataset node; `None` disables it.
    pub dataset: Option<DatasetMetadata>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            missing_key: MissingKeyPolicy::default(),
            boolean: BooleanPolicy::default(),
            digest_chars: DEFAULT_DIGEST_CHARS,
            timestamps: true,
            namespaces: Namespaces::default(),
            columns: ColumnMap::default(),
            labels: LabelTemplates::default(),
            dataset: Some(DatasetMetadata::default()),
        }
    }
}

impl TransformConfig {
    /// Check the configuration before any row is processed.
    pub fn validate(&self) -> Result<(), TabgraphError> {
        if !(MIN_DIGEST_CHARS..=MAX_DIGEST_CHARS).contains(&self.digest_chars) {
            return Err(TabgraphError::InvalidConfig(format!(
                "digest_chars must be between {} and {}, got {}",
                MIN_DIGEST_CHARS, MAX_DIGEST_CHARS, self.digest_chars
            )));
        }

        if self.language.is_empty()
            || !self
                .language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(TabgraphError::InvalidConfig(format!(
                "invalid language tag {:?}",
                self.language
            )));
        }

        for (prefix, namespace) in self.namespaces.entries() {
            let well_formed = namespace.contains(':')
                && (namespace.ends_with('/') || namespace.ends_with('#'));
            if !well_formed {
                return Err(TabgraphError::InvalidConfig(format!(
                    "namespace `{}` must be an absolute IRI ending in '/' or '#', got {:?}",
                    prefix, namespace
                )));
            }
        }

        if let Some(dataset) = &self.dataset
            && dataset.slug.trim().is_empty()
        {
            return Err(TabgraphError::InvalidConfig(
                "dataset.slug must not be empty".to_string(),
            ));
        }

        self.columns.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(TransformConfig::default().validate().is_ok());
    }

    #[test]
    fn digest_length_out_of_range_rejected() {
        let config = TransformConfig {
            digest_chars: 4,
            ..TransformConfig::default()
        };
        let err = config.validate().expect_err("too short");
        assert!(err.is_configuration());

        let config = TransformConfig {
            digest_chars: 65,
            ..TransformConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn relative_namespace_rejected() {
        let mut config = TransformConfig::default();
        config.namespaces.geography = "geo/".to_string();
        assert!(matches!(
            config.validate(),
            Err(TabgraphError::InvalidConfig(_))
        ));
    }

    #[test]
    fn bad_language_tag_rejected() {
        let config = TransformConfig {
            language: "es es".to_string(),
            ..TransformConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn label_templates_substitute() {
        let labels = LabelTemplates::default();
        assert_eq!(labels.student_label("E7"), "Estudiante E7");
        assert_eq!(
            labels.decision_label("E7", "U001"),
            "Decisión de E7 sobre U001"
        );
    }
}
