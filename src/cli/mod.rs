//! CLI module - argument parsing, interactive form and command runners

mod args;
pub mod batch;
pub mod inspect;
pub mod predict;
mod prompts;

pub use args::*;
pub use prompts::*;

use anyhow::{Context, Result};

use crate::pipeline::InferenceContext;

/// Load and validate every artifact named by the pipeline flags
pub fn load_context(args: &PipelineArgs) -> Result<InferenceContext> {
    let paths = args.artifact_paths();
    InferenceContext::load(&paths, &args.pipeline_config()).with_context(|| {
        format!(
            "Failed to load model artifacts from {}",
            args.artifact_dir().display()
        )
    })
}
