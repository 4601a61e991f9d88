//! Batch scoring command for CSV and Parquet customer files

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use console::style;
use tracing::info;

use super::predict::print_pipeline;
use super::{load_context, scored_output_path, PipelineArgs};
use crate::pipeline::{churn_labels, load_dataset, records_from_dataframe};
use crate::report::{
    export_batch_report, save_dataset, scored_dataframe, BatchSummary, Evaluation, ReportParams,
};
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_count, print_info, print_step_header, print_success, print_warning,
};

/// Options of the `batch` command
pub struct BatchOptions<'a> {
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub id_column: &'a str,
    pub label_column: Option<&'a str>,
    pub export_json: Option<&'a Path>,
    pub infer_schema_length: usize,
}

/// Score every row of a customer file and write the scored dataset
pub fn run_batch(args: &PipelineArgs, options: &BatchOptions) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));

    let context = load_context(args)?;
    print_pipeline(&context, args.artifact_dir());

    // Step 1: Load customers
    print_step_header(1, "Load Customers");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading customer file...");
    let df = load_dataset(options.input, options.infer_schema_length)?;
    let batch = records_from_dataframe(&df, Some(options.id_column))?;
    finish_with_success(&spinner, "Customer file loaded");
    print_count("customer(s)", batch.len(), None);
    if batch.ids.is_none() {
        print_info(&format!(
            "ID column '{}' not found; rows are identified by position",
            options.id_column
        ));
    }

    let labels = options
        .label_column
        .map(|column| churn_labels(&df, column))
        .transpose()?;
    let load_time = step_start.elapsed();

    // Step 2: Score
    print_step_header(2, "Score Customers");
    let step_start = Instant::now();
    let spinner = create_spinner("Scoring customers...");
    let results = context.predict_batch(&batch.records);
    let score_time = step_start.elapsed();

    let mut summary = BatchSummary::from_results(&results);
    summary.set_load_time(load_time);
    summary.set_score_time(score_time);
    if summary.failed() == 0 {
        finish_with_success(&spinner, "All customers scored");
    } else {
        finish_with_warning(
            &spinner,
            &format!("{} customer(s) could not be scored", summary.failed()),
        );
    }
    info!(
        total = summary.total,
        scored = summary.scored,
        failed = summary.failed(),
        "Batch scored"
    );

    if let Some(labels) = &labels {
        summary.set_evaluation(Evaluation::from_results(&results, labels));
    }

    // Step 3: Write outputs
    print_step_header(3, "Write Results");
    let output_path = options
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| scored_output_path(options.input));
    let id_column = batch
        .ids
        .as_deref()
        .map(|ids| (options.id_column, ids));
    let mut scored = scored_dataframe(&results, id_column)?;
    save_dataset(&mut scored, &output_path)?;
    print_success(&format!("Scored dataset saved to {}", output_path.display()));

    if let Some(report_path) = options.export_json {
        let input_file = options.input.display().to_string();
        let params = ReportParams {
            input_file: &input_file,
            artifact_dir: context.artifact_dir().map(|p| p.as_path()),
            model: context.classifier().describe(),
            policy: context.policy(),
        };
        export_batch_report(
            &results,
            batch.ids.as_deref(),
            &summary,
            report_path,
            &params,
        )?;
        print_success(&format!("Report saved to {}", report_path.display()));
    }

    if let Some(first_error) = results.iter().find_map(|r| r.as_ref().err()) {
        print_warning(&format!(
            "First rejected row: {}",
            style(first_error.to_string()).dim()
        ));
    }

    summary.display();
    print_completion("Scoring complete");

    Ok(())
}
