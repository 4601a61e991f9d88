//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::artifacts::{ArtifactPaths, MODEL_FILE};
use crate::pipeline::decision::{validate_medium_fraction, DEFAULT_MEDIUM_FRACTION};
use crate::pipeline::record::parse_field_assignment;
use crate::pipeline::{FieldValue, PipelineConfig, PolicyKind};

/// churnwise - Score telecom customers for churn risk from trained model artifacts
#[derive(Parser, Debug)]
#[command(name = "churnwise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Increase diagnostic logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Artifact locations and decision settings shared by every command
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Directory holding model.json and the optional encoder, feature order,
    /// scaler and threshold artifacts
    #[arg(short, long, default_value = "artifacts", global = true)]
    pub artifacts: PathBuf,

    /// Model artifact (overrides <ARTIFACTS>/model.json)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Scaler artifact (overrides <ARTIFACTS>/scaler.json)
    #[arg(long, global = true)]
    pub scaler: Option<PathBuf>,

    /// Encoder artifact (overrides <ARTIFACTS>/encoders.json)
    #[arg(long, global = true)]
    pub encoders: Option<PathBuf>,

    /// Feature order artifact (overrides <ARTIFACTS>/feature_order.json)
    #[arg(long, global = true)]
    pub feature_order: Option<PathBuf>,

    /// Threshold artifact (overrides <ARTIFACTS>/threshold.json)
    #[arg(long, global = true)]
    pub threshold_file: Option<PathBuf>,

    /// Decision threshold (0.0 to 1.0). Takes precedence over the threshold artifact.
    #[arg(long, value_parser = validate_threshold, global = true)]
    pub threshold: Option<f64>,

    /// Decision policy.
    /// Options: "two-tier" (churn/stay, default) or "three-tier" (low/medium/high)
    #[arg(long, default_value = "two-tier", global = true)]
    pub policy: PolicyKind,

    /// Fraction of the threshold below which a three-tier decision is "low".
    /// Only applies with --policy three-tier.
    #[arg(long, default_value_t = DEFAULT_MEDIUM_FRACTION, value_parser = parse_medium_fraction, global = true)]
    pub medium_fraction: f64,
}

impl PipelineArgs {
    /// Resolve artifact files: explicit flags win, then conventional names in
    /// the artifact directory.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let dir = self.artifacts.as_path();
        let defaults = ArtifactPaths::from_dir(dir);
        ArtifactPaths {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| dir.join(MODEL_FILE)),
            encoders: self.encoders.clone().or(defaults.encoders),
            feature_order: self.feature_order.clone().or(defaults.feature_order),
            scaler: self.scaler.clone().or(defaults.scaler),
            threshold: self.threshold_file.clone().or(defaults.threshold),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            threshold: self.threshold,
            policy: self.policy,
            medium_fraction: self.medium_fraction,
        }
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifacts
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a single customer
    Predict {
        /// JSON file with one customer record (field name -> value).
        /// Yes/No fields also accept 0/1.
        #[arg(short, long)]
        record: Option<PathBuf>,

        /// Field assignment, e.g. --field tenure=12 --field "Contract=One year".
        /// Applied on top of --record when both are given.
        #[arg(short, long = "field", value_parser = parse_field_assignment)]
        fields: Vec<(String, FieldValue)>,

        /// Print the prediction as JSON instead of the styled card
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Score every row of a CSV or Parquet customer file
    Batch {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (CSV or Parquet, determined by extension).
        /// Defaults to input directory with '_scored' suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column carried through to the output to identify rows
        #[arg(long, default_value = "customerID")]
        id_column: String,

        /// Column with observed churn (Yes/No or 1/0) for accuracy, precision and recall
        #[arg(long)]
        label_column: Option<String>,

        /// Write a JSON report with run metadata and per-row results
        #[arg(long)]
        export_json: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Show the loaded artifacts and decision policy
    Inspect,
}

/// Derive the scored output path from the input path: same directory, '_scored' suffix.
pub fn scored_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv");
    parent.join(format!("{}_scored.{}", stem, extension))
}

/// Validator for threshold parameter
fn validate_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !(0.0..=1.0).contains(&value) {
        Err(format!("threshold must be between 0.0 and 1.0, got {}", value))
    } else {
        Ok(value)
    }
}

/// Validator for medium_fraction parameter
fn parse_medium_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    validate_medium_fraction(value)
}
