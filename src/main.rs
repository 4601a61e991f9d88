//! churnwise: Customer Churn Scoring CLI
//!
//! Scores single customers or whole customer files against trained churn
//! model artifacts.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use churnwise::cli::batch::{run_batch, BatchOptions};
use churnwise::cli::inspect::run_inspect;
use churnwise::cli::predict::run_predict;
use churnwise::cli::{Cli, Commands};
use churnwise::utils::print_error;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Predict {
            record,
            fields,
            json,
        } => run_predict(&cli.pipeline, record.as_deref(), fields, *json),
        Commands::Batch {
            input,
            output,
            id_column,
            label_column,
            export_json,
            infer_schema_length,
        } => run_batch(
            &cli.pipeline,
            &BatchOptions {
                input,
                output: output.as_deref(),
                id_column,
                label_column: label_column.as_deref(),
                export_json: export_json.as_deref(),
                infer_schema_length: *infer_schema_length,
            },
        ),
        Commands::Inspect => run_inspect(&cli.pipeline),
    }
}

/// Install the log subscriber on stderr; stdout carries results
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "churnwise=warn",
        1 => "churnwise=info",
        _ => "churnwise=debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
