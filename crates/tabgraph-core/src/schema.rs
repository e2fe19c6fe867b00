//! # Row Schema
//!
//! The source table and the explicit column mapping that turns its rows into
//! typed [`SourceRecord`]s.
//!
//! The header is checked once by [`RowSchema::bind`], before any row is
//! touched. A missing required column is a configuration error; a missing
//! cell is just `None`.

use crate::TabgraphError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// TABLE
// =============================================================================

/// An in-memory table: a header plus rows of optional cells.
///
/// Cells are trimmed on construction and blank cells become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create a table. Short rows are padded with `None`.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let columns = columns.into_iter().map(|c| c.trim().to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Option<String>> = row
                    .into_iter()
                    .map(|cell| {
                        cell.map(|c| c.trim().to_string())
                            .filter(|c| !c.is_empty())
                    })
                    .collect();
                cells.resize(width.max(cells.len()), None);
                cells
            })
            .collect();
        Self { columns, rows }
    }

    /// Convenience constructor from string slices; `""` is a missing cell.
    #[must_use]
    pub fn from_strs(columns: &[&str], rows: &[Vec<&str>]) -> Self {
        Self::new(
            columns.iter().map(|c| (*c).to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| Some((*c).to_string())).collect())
                .collect(),
        )
    }

    /// Header names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// COLUMN MAP
// =============================================================================

/// Source column names for every field the builder reads.
///
/// Defaults are the headers of the university-choice CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub student_id: String,
    pub age: String,
    pub gender: String,
    pub stratum: String,
    pub score: String,
    pub origin_city: String,
    /// Optional: when absent from the header, cities get no department.
    pub origin_department: String,
    pub preferred_area: String,
    pub university_code: String,
    pub university_name: String,
    pub university_department: String,
    pub university_type: String,
    pub university_accredited: String,
    pub national_ranking: String,
    pub chose_university: String,
    pub program_modality: String,
    pub international_agreement: String,
    pub scholarship_available: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            student_id: "id_estudiante".to_string(),
            age: "edad".to_string(),
            gender: "genero".to_string(),
            stratum: "estrato".to_string(),
            score: "puntaje_saber11".to_string(),
            origin_city: "ciudad_origen".to_string(),
            origin_department: "departamento_origen".to_string(),
            preferred_area: "preferencia_area".to_string(),
            university_code: "universidad_codigo".to_string(),
            university_name: "universidad_nombre".to_string(),
            university_department: "universidad_departamento".to_string(),
            university_type: "universidad_tipo".to_string(),
            university_accredited: "universidad_acreditada".to_string(),
            national_ranking: "ranking_nacional".to_string(),
            chose_university: "eligio_universidad".to_string(),
            program_modality: "modalidad_programa".to_string(),
            international_agreement: "convenio_internacional".to_string(),
            scholarship_available: "beca_disponible".to_string(),
        }
    }
}

impl ColumnMap {
    /// Required columns, in record-field order.
    fn required(&self) -> [&str; 17] {
        [
            self.student_id.as_str(),
            self.age.as_str(),
            self.gender.as_str(),
            self.stratum.as_str(),
            self.score.as_str(),
            self.origin_city.as_str(),
            self.preferred_area.as_str(),
            self.university_code.as_str(),
            self.university_name.as_str(),
            self.university_department.as_str(),
            self.university_type.as_str(),
            self.university_accredited.as_str(),
            self.national_ranking.as_str(),
            self.chose_university.as_str(),
            self.program_modality.as_str(),
            self.international_agreement.as_str(),
            self.scholarship_available.as_str(),
        ]
    }

    /// Reject empty or duplicated column names.
    pub fn validate(&self) -> Result<(), TabgraphError> {
        let mut seen = BTreeSet::new();
        for name in self
            .required()
            .into_iter()
            .chain(std::iter::once(self.origin_department.as_str()))
        {
            if name.trim().is_empty() {
                return Err(TabgraphError::InvalidConfig(
                    "column names must not be empty".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(TabgraphError::InvalidConfig(format!(
                    "column {:?} is mapped to more than one field",
                    name
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// ROW SCHEMA
// =============================================================================

/// Column indices resolved against a table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    required: [usize; 17],
    origin_department: Option<usize>,
}

impl RowSchema {
    /// Resolve every mapped column against `header`.
    ///
    /// Returns `TabgraphError::MissingColumn` for the first required column
    /// that is absent.
    pub fn bind(columns: &ColumnMap, header: &[String]) -> Result<Self, TabgraphError> {
        let position = |name: &str| header.iter().position(|h| h == name);

        let mut required = [0usize; 17];
        for (slot, name) in required.iter_mut().zip(columns.required()) {
            *slot = position(name).ok_or_else(|| TabgraphError::MissingColumn {
                column: name.to_string(),
            })?;
        }

        Ok(Self {
            required,
            origin_department: position(&columns.origin_department),
        })
    }

    /// Extract a typed record from one row.
    #[must_use]
    pub fn record(&self, row: &[Option<String>]) -> SourceRecord {
        let cell = |index: usize| row.get(index).cloned().flatten();
        let [
            student_id,
            age,
            gender,
            stratum,
            score,
            origin_city,
            preferred_area,
            university_code,
            university_name,
            university_department,
            university_type,
            university_accredited,
            national_ranking,
            chose_university,
            program_modality,
            international_agreement,
            scholarship_available,
        ] = self.required.map(cell);

        SourceRecord {
            student_id,
            age,
            gender,
            stratum,
            score,
            origin_city,
            origin_department: self.origin_department.and_then(cell),
            preferred_area,
            university_code,
            university_name,
            university_department,
            university_type,
            university_accredited,
            national_ranking,
            chose_university,
            program_modality,
            international_agreement,
            scholarship_available,
        }
    }
}

/// One row, with every field addressed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecord {
    pub student_id: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub stratum: Option<String>,
    pub score: Option<String>,
    pub origin_city: Option<String>,
    pub origin_department: Option<String>,
    pub preferred_area: Option<String>,
    pub university_code: Option<String>,
    pub university_name: Option<String>,
    pub university_department: Option<String>,
    pub university_type: Option<String>,
    pub university_accredited: Option<String>,
    pub national_ranking: Option<String>,
    pub chose_university: Option<String>,
    pub program_modality: Option<String>,
    pub international_agreement: Option<String>,
    pub scholarship_available: Option<String>,
}

impl SourceRecord {
    /// Every cell paired with the name of the column it came from.
    pub fn cells_mut<'a>(
        &'a mut self,
        columns: &'a ColumnMap,
    ) -> [(&'a str, &'a mut Option<String>); 18] {
        [
            (columns.student_id.as_str(), &mut self.student_id),
            (columns.age.as_str(), &mut self.age),
            (columns.gender.as_str(), &mut self.gender),
            (columns.stratum.as_str(), &mut self.stratum),
            (columns.score.as_str(), &mut self.score),
            (columns.origin_city.as_str(), &mut self.origin_city),
            (columns.origin_department.as_str(), &mut self.origin_department),
            (columns.preferred_area.as_str(), &mut self.preferred_area),
            (columns.university_code.as_str(), &mut self.university_code),
            (columns.university_name.as_str(), &mut self.university_name),
            (
                columns.university_department.as_str(),
                &mut self.university_department,
            ),
            (columns.university_type.as_str(), &mut self.university_type),
            (
                columns.university_accredited.as_str(),
                &mut self.university_accredited,
            ),
            (columns.national_ranking.as_str(), &mut self.national_ranking),
            (columns.chose_university.as_str(), &mut self.chose_university),
            (columns.program_modality.as_str(), &mut self.program_modality),
            (
                columns.international_agreement.as_str(),
                &mut self.international_agreement,
            ),
            (
                columns.scholarship_available.as_str(),
                &mut self.scholarship_available,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn full_header() -> Vec<String> {
        let map = ColumnMap::default();
        let mut names: Vec<String> = map.required().iter().map(|s| (*s).to_string()).collect();
        names.push(map.origin_department.clone());
        names
    }

    #[test]
    fn table_trims_and_blanks_become_none() {
        let table = Table::from_strs(&["a", "b"], &[vec!["  x ", "   "]]);
        assert_eq!(table.rows()[0], vec![Some("x".to_string()), None]);
    }

    #[test]
    fn short_rows_are_padded() {
        let table = Table::new(header(&["a", "b", "c"]), vec![vec![Some("1".into())]]);
        assert_eq!(table.rows()[0].len(), 3);
    }

    #[test]
    fn bind_reports_first_missing_column() {
        let err = RowSchema::bind(&ColumnMap::default(), &header(&["id_estudiante"]))
            .expect_err("columns missing");
        assert!(matches!(
            err,
            TabgraphError::MissingColumn { ref column } if column == "edad"
        ));
    }

    #[test]
    fn origin_department_is_optional() {
        let map = ColumnMap::default();
        let mut names = full_header();
        names.retain(|n| *n != map.origin_department);

        let schema = RowSchema::bind(&map, &names).expect("bind");
        let row: Vec<Option<String>> = names.iter().map(|n| Some(n.clone())).collect();
        let record = schema.record(&row);
        assert_eq!(record.origin_department, None);
        assert_eq!(record.student_id.as_deref(), Some("id_estudiante"));
    }

    #[test]
    fn record_follows_header_order() {
        let map = ColumnMap::default();
        let mut names = full_header();
        names.reverse();

        let schema = RowSchema::bind(&map, &names).expect("bind");
        let row: Vec<Option<String>> = names.iter().map(|n| Some(format!("v:{n}"))).collect();
        let record = schema.record(&row);
        assert_eq!(record.university_code.as_deref(), Some("v:universidad_codigo"));
        assert_eq!(
            record.origin_department.as_deref(),
            Some("v:departamento_origen")
        );
    }

    #[test]
    fn duplicate_mapping_rejected() {
        let map = ColumnMap {
            age: "id_estudiante".to_string(),
            ..ColumnMap::default()
        };
        assert!(map.validate().is_err());
    }
}
