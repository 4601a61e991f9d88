//! Batch scoring summary and evaluation

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{Decision, PipelineError, Prediction};

/// Agreement between churn verdicts and known outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    /// Rows without a usable label or without a prediction
    pub skipped: usize,
}

impl Evaluation {
    /// Compare predictions with observed churn labels row by row
    pub fn from_results(
        results: &[Result<Prediction, PipelineError>],
        labels: &[Option<bool>],
    ) -> Self {
        let mut eval = Evaluation::default();
        for (result, label) in results.iter().zip(labels) {
            match (result, label) {
                (Ok(prediction), Some(actual)) => {
                    match (prediction.decision.is_churn(), *actual) {
                        (true, true) => eval.true_positives += 1,
                        (true, false) => eval.false_positives += 1,
                        (false, false) => eval.true_negatives += 1,
                        (false, true) => eval.false_negatives += 1,
                    }
                }
                _ => eval.skipped += 1,
            }
        }
        eval
    }

    pub fn evaluated(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positives + self.true_negatives, self.evaluated())
    }

    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

/// Summary of a batch scoring run
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub scored: usize,
    /// Rows rejected because of their data
    pub input_errors: usize,
    /// Rows rejected because of artifacts or inference faults
    pub system_errors: usize,
    pub decisions: Vec<(Decision, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    #[serde(skip)]
    pub load_time: Option<Duration>,
    #[serde(skip)]
    pub score_time: Option<Duration>,
}

impl BatchSummary {
    pub fn from_results(results: &[Result<Prediction, PipelineError>]) -> Self {
        let mut summary = BatchSummary {
            total: results.len(),
            ..Default::default()
        };
        let mut probability_sum = 0.0;

        for result in results {
            match result {
                Ok(prediction) => {
                    summary.scored += 1;
                    probability_sum += prediction.probability;
                    match summary
                        .decisions
                        .iter_mut()
                        .find(|(d, _)| *d == prediction.decision)
                    {
                        Some((_, count)) => *count += 1,
                        None => summary.decisions.push((prediction.decision, 1)),
                    }
                }
                Err(e) if e.is_user_error() => summary.input_errors += 1,
                Err(_) => summary.system_errors += 1,
            }
        }

        summary
            .decisions
            .sort_by_key(|(d, _)| decision_rank(*d));
        summary.mean_probability =
            (summary.scored > 0).then(|| probability_sum / summary.scored as f64);
        summary
    }

    pub fn failed(&self) -> usize {
        self.input_errors + self.system_errors
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.decisions
            .iter()
            .find(|(d, _)| *d == decision)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }

    pub fn set_load_time(&mut self, duration: Duration) {
        self.load_time = Some(duration);
    }

    pub fn set_score_time(&mut self, duration: Duration) {
        self.score_time = Some(duration);
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("SCORING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Customers"), Cell::new(self.total)]);
        table.add_row(vec![
            Cell::new("✅ Scored"),
            Cell::new(self.scored)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("❌ Failed"),
            Cell::new(format!(
                "{} ({} input, {} system)",
                self.failed(),
                self.input_errors,
                self.system_errors
            ))
            .fg(if self.failed() == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        for (decision, count) in &self.decisions {
            let color = if decision.is_churn() {
                Color::Red
            } else if *decision == Decision::Medium {
                Color::Yellow
            } else {
                Color::Cyan
            };
            table.add_row(vec![
                Cell::new(format!("   {}", decision)),
                Cell::new(count).fg(color),
            ]);
        }

        if let Some(mean) = self.mean_probability {
            table.add_row(vec![
                Cell::new("📉 Mean Probability"),
                Cell::new(format!("{:.2}%", mean * 100.0)),
            ]);
        }

        if let Some(eval) = &self.evaluation {
            let pct = |v: Option<f64>| {
                v.map(|x| format!("{:.1}%", x * 100.0))
                    .unwrap_or_else(|| "n/a".to_string())
            };
            table.add_row(vec![
                Cell::new("🎯 Accuracy"),
                Cell::new(pct(eval.accuracy())).add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("   Precision"), Cell::new(pct(eval.precision()))]);
            table.add_row(vec![Cell::new("   Recall"), Cell::new(pct(eval.recall()))]);
            table.add_row(vec![
                Cell::new("   Evaluated"),
                Cell::new(format!("{} ({} skipped)", eval.evaluated(), eval.skipped)),
            ]);
        }

        if let Some(load) = self.load_time {
            table.add_row(vec![
                Cell::new("⏱️  Load Time"),
                Cell::new(format!("{:.2}s", load.as_secs_f64())),
            ]);
        }
        if let Some(score) = self.score_time {
            table.add_row(vec![
                Cell::new("⏱️  Score Time"),
                Cell::new(format!("{:.2}s", score.as_secs_f64())),
            ]);
        }

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}

fn decision_rank(decision: Decision) -> u8 {
    match decision {
        Decision::Churn | Decision::High => 0,
        Decision::Medium => 1,
        Decision::Stay | Decision::Low => 2,
    }
}
