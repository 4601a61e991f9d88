//! Single prediction rendering

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{Decision, DecisionPolicy, PolicyKind, Prediction};
use crate::utils::probability_bar;

/// JSON view of a prediction for machine consumers
#[derive(Debug, Serialize)]
pub struct PredictionOutput<'a> {
    pub probability: f64,
    pub decision: Decision,
    pub churn: bool,
    pub threshold: f64,
    pub policy: PolicyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium_boundary: Option<f64>,
    pub features: &'a [f64],
}

impl<'a> PredictionOutput<'a> {
    pub fn new(prediction: &'a Prediction, policy: &DecisionPolicy) -> Self {
        Self {
            probability: prediction.probability,
            decision: prediction.decision,
            churn: prediction.decision.is_churn(),
            threshold: policy.threshold().value(),
            policy: policy.kind(),
            medium_boundary: policy.medium_boundary(),
            features: prediction.features.as_slice(),
        }
    }
}

/// Headline sentence for a decision
pub fn verdict_text(decision: Decision) -> &'static str {
    match decision {
        Decision::Churn => "Customer is likely to churn",
        Decision::Stay => "Customer is likely to stay",
        Decision::High => "High churn risk",
        Decision::Medium => "Medium churn risk",
        Decision::Low => "Low churn risk",
    }
}

fn decision_color(decision: Decision) -> Color {
    match decision {
        Decision::Churn | Decision::High => Color::Red,
        Decision::Medium => Color::Yellow,
        Decision::Stay | Decision::Low => Color::Green,
    }
}

/// Print the prediction card
pub fn display_prediction(prediction: &Prediction, policy: &DecisionPolicy) {
    println!();
    println!(
        "    {} {}",
        style("🔮").cyan(),
        style("PREDICTION").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![
        Cell::new("Verdict"),
        Cell::new(verdict_text(prediction.decision))
            .fg(decision_color(prediction.decision))
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Churn Probability"),
        Cell::new(format!("{:.2}%", prediction.probability * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Threshold"),
        Cell::new(format!("{:.2}", policy.threshold().value())),
    ]);
    if let Some(boundary) = policy.medium_boundary() {
        table.add_row(vec![
            Cell::new("Medium Risk From"),
            Cell::new(format!("{:.4}", boundary)),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }

    println!();
    println!("    {}", probability_bar(prediction.probability, 40));
    println!();
}
