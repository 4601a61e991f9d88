//! Single-customer scoring command

use std::path::Path;

use anyhow::{Context, Result};
use console::Term;

use super::{load_context, prompt_customer, PipelineArgs};
use crate::pipeline::{CustomerRecord, FieldValue, InferenceContext};
use crate::report::{display_prediction, PredictionOutput};
use crate::utils::{print_banner, print_config, print_info};

/// Score one customer and print the verdict
pub fn run_predict(
    args: &PipelineArgs,
    record_path: Option<&Path>,
    fields: &[(String, FieldValue)],
    json: bool,
) -> Result<()> {
    let context = load_context(args)?;

    if !json {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_pipeline(&context, args.artifact_dir());
    }

    let record = resolve_record(&context, record_path, fields)?;
    let prediction = context
        .predict(&record)
        .context("Could not score customer")?;

    if json {
        let output = PredictionOutput::new(&prediction, context.policy());
        let text = serde_json::to_string_pretty(&output)
            .context("Failed to serialize prediction to JSON")?;
        println!("{}", text);
    } else {
        display_prediction(&prediction, context.policy());
    }

    Ok(())
}

/// Print the configuration card for a loaded context
pub fn print_pipeline(context: &InferenceContext, artifacts: &Path) {
    print_config(
        artifacts,
        &context.classifier().describe(),
        context.encoders().source(),
        context.scaler().map_or(0, |s| s.columns().len()),
        context.policy(),
    );
}

/// Build the record from a JSON file and/or field flags, falling back to the
/// interactive form on a terminal.
fn resolve_record(
    context: &InferenceContext,
    record_path: Option<&Path>,
    fields: &[(String, FieldValue)],
) -> Result<CustomerRecord> {
    if record_path.is_none() && fields.is_empty() {
        if !Term::stdout().is_term() {
            anyhow::bail!(
                "No customer given. Use --record <file.json> or --field Name=Value, \
                 or run in a terminal for the interactive form."
            );
        }
        print_info("Enter the customer's details");
        return prompt_customer(context.encoders());
    }

    let mut record = match record_path {
        Some(path) => read_record(path)?,
        None => CustomerRecord::new(),
    };
    for (name, value) in fields {
        record.insert(name, value.clone());
    }
    Ok(record)
}

/// Read a customer record from a JSON object file
pub fn read_record(path: &Path) -> Result<CustomerRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse record file: {}", path.display()))
}
