//! Batch result export: scored dataset and JSON report

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use serde::Serialize;

use super::summary::BatchSummary;
use crate::pipeline::{Decision, DecisionPolicy, PipelineError, PolicyKind, Prediction};

pub const PROBABILITY_COLUMN: &str = "churn_probability";
pub const DECISION_COLUMN: &str = "decision";
pub const ERROR_COLUMN: &str = "error";

/// Metadata about the scoring run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub churnwise_version: String,
    pub input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<String>,
    pub model: String,
    pub policy: PolicyKind,
    pub threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium_boundary: Option<f64>,
}

/// One scored (or rejected) row
#[derive(Serialize)]
pub struct RowResult {
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Complete batch report
#[derive(Serialize)]
pub struct BatchReport<'a> {
    pub metadata: RunMetadata,
    pub summary: &'a BatchSummary,
    pub rows: Vec<RowResult>,
}

/// Parameters describing the run for the report metadata
pub struct ReportParams<'a> {
    pub input_file: &'a str,
    pub artifact_dir: Option<&'a Path>,
    pub model: String,
    pub policy: &'a DecisionPolicy,
}

fn row_results(
    results: &[Result<Prediction, PipelineError>],
    ids: Option<&[Option<String>]>,
) -> Vec<RowResult> {
    results
        .iter()
        .enumerate()
        .map(|(row, result)| {
            let id = ids.and_then(|ids| ids.get(row).cloned().flatten());
            match result {
                Ok(p) => RowResult {
                    row,
                    id,
                    probability: Some(p.probability),
                    decision: Some(p.decision),
                    error: None,
                },
                Err(e) => RowResult {
                    row,
                    id,
                    probability: None,
                    decision: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect()
}

/// Write the batch report as pretty JSON
pub fn export_batch_report(
    results: &[Result<Prediction, PipelineError>],
    ids: Option<&[Option<String>]>,
    summary: &BatchSummary,
    output_path: &Path,
    params: &ReportParams,
) -> Result<()> {
    let report = BatchReport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            churnwise_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            artifact_dir: params.artifact_dir.map(|p| p.display().to_string()),
            model: params.model.clone(),
            policy: params.policy.kind(),
            threshold: params.policy.threshold().value(),
            medium_boundary: params.policy.medium_boundary(),
        },
        summary,
        rows: row_results(results, ids),
    };

    let json =
        serde_json::to_string_pretty(&report).context("Failed to serialize batch report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write batch report to {}", output_path.display()))?;

    Ok(())
}

/// Build the scored output frame: optional ID column, probability, decision
/// and error, one row per input row.
pub fn scored_dataframe(
    results: &[Result<Prediction, PipelineError>],
    id_column: Option<(&str, &[Option<String>])>,
) -> Result<DataFrame> {
    let probabilities: Vec<Option<f64>> = results
        .iter()
        .map(|r| r.as_ref().ok().map(|p| p.probability))
        .collect();
    let decisions: Vec<Option<&str>> = results
        .iter()
        .map(|r| r.as_ref().ok().map(|p| p.decision.as_str()))
        .collect();
    let errors: Vec<Option<String>> = results
        .iter()
        .map(|r| r.as_ref().err().map(|e| e.to_string()))
        .collect();

    let mut columns = Vec::with_capacity(4);
    if let Some((name, ids)) = id_column {
        columns.push(Column::new(name.into(), ids.to_vec()));
    }
    columns.push(Column::new(PROBABILITY_COLUMN.into(), probabilities));
    columns.push(Column::new(DECISION_COLUMN.into(), decisions));
    columns.push(Column::new(ERROR_COLUMN.into(), errors));

    DataFrame::new(columns).context("Failed to build scored dataset")
}

/// Save a dataset to file (CSV or Parquet based on extension)
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}
