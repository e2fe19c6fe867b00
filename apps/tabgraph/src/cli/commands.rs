//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::InputArgs;
use crate::input::{InputFormat, load_table, validate_output_path};
use crate::settings::render_config;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tabgraph_core::{
    GraphBuilder, GraphStore, IntegrityReport, RdfFormat, TabgraphError, TransformConfig,
    Transformation, canonical_checksum, export_all,
};

// =============================================================================
// TRANSFORM COMMAND
// =============================================================================

/// Transform a table and write one file per format.
pub fn cmd_transform(
    config: TransformConfig,
    json_mode: bool,
    verbose: bool,
    input: &InputArgs,
    output: &Path,
    formats: Option<&str>,
) -> Result<(), TabgraphError> {
    let formats = parse_formats(formats)?;
    let transformation = run_transformation(config, input)?;
    let report = transformation.validate();
    let prefixes = transformation.prefixes();

    let rendered = export_all(&transformation.graph, &prefixes, &formats)?;

    let mut written: Vec<(RdfFormat, PathBuf, usize)> = Vec::with_capacity(rendered.len());
    for (format, bytes) in rendered {
        let path = validate_output_path(&artifact_path(output, format))?;
        std::fs::write(&path, &bytes)
            .map_err(|e| TabgraphError::IoError(format!("Write file: {}", e)))?;
        tracing::info!(%format, path = %path.display(), bytes = bytes.len(), "artifact written");
        written.push((format, path, bytes.len()));
    }

    if json_mode {
        let output = serde_json::json!({
            "summary": transformation.summary,
            "integrity": report,
            "issues": transformation.issues,
            "artifacts": written
                .iter()
                .map(|(format, path, bytes)| serde_json::json!({
                    "format": format,
                    "media_type": format.media_type(),
                    "path": path.to_string_lossy(),
                    "bytes": bytes,
                }))
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    print_summary(&transformation);
    println!();
    print_report(&report);
    if verbose && !transformation.issues.is_empty() {
        println!();
        println!("Dropped attributes:");
        for issue in &transformation.issues {
            println!("  {}", issue);
        }
    }
    println!();
    for (format, path, bytes) in &written {
        println!("Wrote {:>9} bytes ({}) to {:?}", bytes, format, path);
    }

    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Transform in memory and print the integrity report.
pub fn cmd_validate(
    config: TransformConfig,
    json_mode: bool,
    input: &InputArgs,
    strict: bool,
) -> Result<(), TabgraphError> {
    let transformation = run_transformation(config, input)?;
    let report = transformation.validate();

    if json_mode {
        let output = serde_json::json!({
            "summary": transformation.summary,
            "integrity": report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        print_summary(&transformation);
        println!();
        print_report(&report);
    }

    if strict && !report.is_clean() {
        return Err(TabgraphError::InvalidInput(format!(
            "{} integrity checks failed",
            report.findings.len()
        )));
    }
    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the canonical checksum of the graph.
pub fn cmd_hash(
    config: TransformConfig,
    json_mode: bool,
    input: &InputArgs,
    include_timestamps: bool,
) -> Result<(), TabgraphError> {
    let transformation = run_transformation(config, input)?;

    let excluded = if include_timestamps {
        Vec::new()
    } else {
        vec![transformation.vocab.dcterms_created.clone()]
    };
    let checksum = canonical_checksum(&transformation.graph, &excluded)?;

    if json_mode {
        let output = serde_json::json!({
            "algorithm": "BLAKE3",
            "hash": checksum,
            "triple_count": transformation.graph.triple_count(),
            "timestamps_included": include_timestamps,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("BLAKE3: {}", checksum);
        println!("Triples: {}", transformation.graph.triple_count());
    }

    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration.
pub fn cmd_config(config: &TransformConfig, json_mode: bool) -> Result<(), TabgraphError> {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(config).unwrap_or_default()
        );
    } else {
        print!("{}", render_config(config)?);
    }
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load the input table and run the builder over it.
pub fn run_transformation(
    config: TransformConfig,
    input: &InputArgs,
) -> Result<Transformation, TabgraphError> {
    let format = input
        .input_format
        .as_deref()
        .map(str::parse::<InputFormat>)
        .transpose()?;
    let table = load_table(&input.input, format, input.delimiter)?;
    GraphBuilder::new(config)?.transform(&table)
}

/// Parse a comma-separated format list. `None` selects every format.
pub fn parse_formats(list: Option<&str>) -> Result<Vec<RdfFormat>, TabgraphError> {
    let Some(list) = list else {
        return Ok(RdfFormat::ALL.to_vec());
    };

    let mut formats = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let format: RdfFormat = name.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(TabgraphError::InvalidConfig(
            "no output format selected".to_string(),
        ));
    }
    Ok(formats)
}

/// `<base>.<ext>`, appended rather than replacing an existing extension.
pub fn artifact_path(base: &Path, format: RdfFormat) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

fn print_summary(transformation: &Transformation) {
    let summary = &transformation.summary;
    println!("tabgraph Transformation Summary");
    println!("===============================");
    println!("Rows processed:   {}", summary.rows_processed);
    println!("Rows skipped:     {}", summary.rows_skipped);
    println!("Triples:          {}", summary.triple_count);
    println!("Attribute issues: {}", summary.attribute_issues);
    println!();
    println!("Entities:");
    for (kind, count) in &summary.entities {
        println!("  {:<18} {}", kind.to_string(), count);
    }
    println!();
    println!("Relationships:");
    let prefixes = transformation.prefixes();
    for (predicate, count) in &summary.relationships {
        let name = prefixes
            .split(predicate)
            .map(|(prefix, local)| format!("{prefix}:{local}"))
            .unwrap_or_else(|| predicate.clone());
        println!("  {:<28} {}", name, count);
    }
}

fn print_report(report: &IntegrityReport) {
    println!("Integrity");
    println!("=========");
    println!("Coverage:     {}", report.coverage);
    println!("Completeness: {}", report.completeness);
    println!("Orphans:      {}", report.orphans);
    println!("Untyped:      {}", report.untyped_objects.len());
    println!("Multi-typed:  {}", report.multiply_typed.len());
    if report.is_clean() {
        println!("All checks passed");
    }
    for finding in &report.findings {
        println!("  [{}] {}", finding.check, finding.message);
    }
}
