//! Terminal styling utilities for a modern, visually appealing TUI

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::{DecisionPolicy, EncodingSource};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static KEY: Emoji<'_, '_> = Emoji("🔑 ", "");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("churnwise").cyan().bold(),
        style("Customer Churn Intelligence").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the loaded pipeline configuration card
pub fn print_config(
    artifacts: &Path,
    model: &str,
    encoding: EncodingSource,
    scaled_columns: usize,
    policy: &DecisionPolicy,
) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Pipeline").cyan().bold(),
        " ".repeat(box_width - 15)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Artifacts: {:<36}│",
        FOLDER,
        truncate_path(artifacts, 35)
    );
    println!("    │  {} Model:     {:<36}│", CHART, truncate_string(model, 35));
    println!(
        "    │  {} Encoders:  {:<36}│",
        KEY,
        truncate_string(&encoding.to_string(), 35)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Threshold: {:<36}│",
        TARGET,
        style(format!("{:.2}", policy.threshold().value())).yellow()
    );
    println!(
        "    │  {} Policy:    {:<36}│",
        TARGET,
        style(policy.kind().to_string()).yellow()
    );
    println!(
        "    │  {} Scaled:    {:<36}│",
        CHART,
        style(format!("{} column(s)", scaled_columns)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("    {} {}", style("✗").red().bold(), style(message).red());
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {} {}", ROCKET, style(message).green().bold());
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, detail: Option<&str>) {
    if let Some(info) = detail {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

/// Render a probability as a text progress bar, e.g. `[██████░░░░] 62.0%`
pub fn probability_bar(probability: f64, width: usize) -> String {
    let clamped = probability.clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    format!(
        "[{}{}] {:.2}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        clamped * 100.0
    )
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}
