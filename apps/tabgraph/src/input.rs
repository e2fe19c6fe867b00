//! # Table Input
//!
//! Loads the source table from disk. Two layouts are accepted:
//!
//! - **CSV** with a header row (`csv` crate, configurable delimiter)
//! - **JSON**: an array of flat objects, one per row
//!
//! Cells are handed to [`Table::new`], which trims them and turns blanks into
//! missing values.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use tabgraph_core::{Table, TabgraphError};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum input table size (100 MB).
pub const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum number of rows accepted from one file.
pub const MAX_INPUT_ROWS: usize = 1_000_000;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Validate file size before reading.
pub fn validate_file_size(path: &Path, max_size: u64) -> Result<(), TabgraphError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TabgraphError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(TabgraphError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and make sure it names a regular file.
pub fn validate_file_path(path: &Path) -> Result<PathBuf, TabgraphError> {
    let canonical = path.canonicalize().map_err(|e| {
        TabgraphError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(TabgraphError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Canonicalize the parent directory of an output path.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, TabgraphError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        TabgraphError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(TabgraphError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| TabgraphError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// FORMATS
// =============================================================================

/// Layout of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Delimited text with a header row.
    Csv,
    /// JSON array of row objects.
    Json,
}

impl InputFormat {
    /// Guess the layout from the file extension. Anything but `.json` is CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

impl FromStr for InputFormat {
    type Err = TabgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "tsv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            other => Err(TabgraphError::InvalidInput(format!(
                "Unknown input format: {}. Use: csv, json",
                other
            ))),
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

/// Read and parse a table file.
///
/// `format` overrides the extension-based guess.
pub fn load_table(
    path: &Path,
    format: Option<InputFormat>,
    delimiter: char,
) -> Result<Table, TabgraphError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_INPUT_FILE_SIZE)?;

    let contents = std::fs::read(&validated)
        .map_err(|e| TabgraphError::IoError(format!("Read file: {}", e)))?;

    let format = format.unwrap_or_else(|| InputFormat::from_path(&validated));
    tracing::info!(path = %validated.display(), ?format, bytes = contents.len(), "loading table");

    let table = match format {
        InputFormat::Csv => parse_csv(&contents, delimiter)?,
        InputFormat::Json => parse_json(&contents)?,
    };

    if table.len() > MAX_INPUT_ROWS {
        return Err(TabgraphError::InvalidInput(format!(
            "Row count {} exceeds maximum allowed {}",
            table.len(),
            MAX_INPUT_ROWS
        )));
    }
    Ok(table)
}

/// Parse delimited text with a header row. Short rows are padded.
pub fn parse_csv(contents: &[u8], delimiter: char) -> Result<Table, TabgraphError> {
    let delimiter = u8::try_from(delimiter).map_err(|_| {
        TabgraphError::InvalidInput(format!("Delimiter {:?} is not a single byte", delimiter))
    })?;
    let contents = contents.strip_prefix(UTF8_BOM).unwrap_or(contents);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(contents);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| TabgraphError::InvalidInput(format!("CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| TabgraphError::InvalidInput(format!("CSV row {}: {}", index, e)))?;
        rows.push(record.iter().map(|cell| Some(cell.to_string())).collect());
    }

    Ok(Table::new(columns, rows))
}

/// Parse a JSON array of flat objects.
///
/// The header is the union of keys in first-seen order. Strings, numbers and
/// booleans become cells; `null` and absent keys are missing values.
pub fn parse_json(contents: &[u8]) -> Result<Table, TabgraphError> {
    let records: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_slice(contents)
            .map_err(|e| TabgraphError::InvalidInput(format!("JSON: {}", e)))?;

    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            let cell = match record.get(column) {
                None | Some(serde_json::Value::Null) => None,
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
                Some(_) => {
                    return Err(TabgraphError::InvalidInput(format!(
                        "JSON row {}: field {:?} is not a scalar",
                        index, column
                    )));
                }
            };
            row.push(cell);
        }
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}
