//! Artifact inspection command

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::predict::print_pipeline;
use super::{load_context, PipelineArgs};
use crate::pipeline::schema::field_spec;
use crate::pipeline::InferenceContext;
use crate::utils::{print_banner, print_completion};

pub fn run_inspect(args: &PipelineArgs) -> Result<()> {
    let context = load_context(args)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_pipeline(&context, args.artifact_dir());

    print_section("🧮", "FEATURE ORDER");
    print_indented(&feature_table(&context));

    print_section("🔑", "CATEGORY ENCODINGS");
    print_indented(&encoding_table(&context));

    if let Some(boundary) = context.policy().medium_boundary() {
        println!(
            "    {} low < {:.4} <= medium < {:.4} <= high",
            style("Tiers:").dim(),
            boundary,
            context.policy().threshold().value()
        );
    }

    print_completion("Artifacts are consistent");
    Ok(())
}

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Position, name, kind and scaling of every model input
pub fn feature_table(context: &InferenceContext) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Kind").add_attribute(Attribute::Bold),
        Cell::new("Scaled").add_attribute(Attribute::Bold),
    ]);

    for (position, name) in context.feature_order().names().iter().enumerate() {
        let kind = if field_spec(name).is_some_and(|s| s.is_numeric()) {
            "numeric"
        } else {
            "categorical"
        };
        let scaled = context.scaler().is_some_and(|s| s.is_scaled(position));
        table.add_row(vec![
            Cell::new(position),
            Cell::new(name),
            Cell::new(kind),
            if scaled {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("-").fg(Color::DarkGrey)
            },
        ]);
    }
    table
}

/// Label-to-code mapping of every categorical field
pub fn encoding_table(context: &InferenceContext) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new(format!("Codes ({})", context.encoders().source())).add_attribute(Attribute::Bold),
    ]);

    for (field, encoder) in context.encoders().iter() {
        let codes = encoder
            .classes()
            .iter()
            .enumerate()
            .map(|(code, label)| format!("{}={}", label, code))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![Cell::new(field), Cell::new(codes)]);
    }
    table
}
