//! Decision policy: probability -> verdict

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// Threshold used by the form application before a tuned threshold existed
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Default fraction of the threshold below which a customer is low risk
pub const DEFAULT_MEDIUM_FRACTION: f64 = 0.65;

/// Probability cutoff in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, String> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Threshold(value))
        } else {
            Err(format!("threshold must be between 0.0 and 1.0, got {}", value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Threshold::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(t: Threshold) -> Self {
        t.0
    }
}

/// Which family of verdicts to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// churn / stay
    #[default]
    TwoTier,
    /// low / medium / high
    ThreeTier,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::TwoTier => write!(f, "two-tier"),
            PolicyKind::ThreeTier => write!(f, "three-tier"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "two-tier" | "two_tier" | "binary" => Ok(PolicyKind::TwoTier),
            "three-tier" | "three_tier" | "tiered" => Ok(PolicyKind::ThreeTier),
            _ => Err(format!(
                "Unknown decision policy: '{}'. Use 'two-tier' or 'three-tier'.",
                s
            )),
        }
    }
}

/// Verdict for one customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Churn,
    Stay,
    Low,
    Medium,
    High,
}

impl Decision {
    /// True for the verdicts that flag a customer as likely to leave
    pub fn is_churn(self) -> bool {
        matches!(self, Decision::Churn | Decision::High)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Churn => "churn",
            Decision::Stay => "stay",
            Decision::Low => "low",
            Decision::Medium => "medium",
            Decision::High => "high",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a churn probability to a decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// `churn` when `p >= threshold`, else `stay`
    TwoTier { threshold: Threshold },
    /// `low` below `medium_fraction * threshold`, `high` at or above
    /// `threshold`, `medium` in between
    ThreeTier {
        threshold: Threshold,
        medium_fraction: f64,
    },
}

impl DecisionPolicy {
    pub fn two_tier(threshold: Threshold) -> Self {
        DecisionPolicy::TwoTier { threshold }
    }

    pub fn three_tier(threshold: Threshold, medium_fraction: f64) -> Result<Self, String> {
        validate_medium_fraction(medium_fraction)?;
        Ok(DecisionPolicy::ThreeTier {
            threshold,
            medium_fraction,
        })
    }

    pub fn from_kind(
        kind: PolicyKind,
        threshold: Threshold,
        medium_fraction: f64,
    ) -> Result<Self, String> {
        match kind {
            PolicyKind::TwoTier => Ok(Self::two_tier(threshold)),
            PolicyKind::ThreeTier => Self::three_tier(threshold, medium_fraction),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            DecisionPolicy::TwoTier { .. } => PolicyKind::TwoTier,
            DecisionPolicy::ThreeTier { .. } => PolicyKind::ThreeTier,
        }
    }

    pub fn threshold(&self) -> Threshold {
        match self {
            DecisionPolicy::TwoTier { threshold } | DecisionPolicy::ThreeTier { threshold, .. } => {
                *threshold
            }
        }
    }

    /// Lower bound of the medium tier, for three-tier policies
    pub fn medium_boundary(&self) -> Option<f64> {
        match self {
            DecisionPolicy::TwoTier { .. } => None,
            DecisionPolicy::ThreeTier {
                threshold,
                medium_fraction,
            } => Some(medium_fraction * threshold.value()),
        }
    }

    pub fn decide(&self, probability: f64) -> Result<Decision, PipelineError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::invalid(
                "probability",
                format!("{} is not in [0, 1]", probability),
            ));
        }

        let t = self.threshold().value();
        let decision = match self.medium_boundary() {
            None if probability >= t => Decision::Churn,
            None => Decision::Stay,
            Some(_) if probability >= t => Decision::High,
            Some(boundary) if probability >= boundary => Decision::Medium,
            Some(_) => Decision::Low,
        };
        Ok(decision)
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        DecisionPolicy::two_tier(Threshold::default())
    }
}

/// Validate the medium fraction of a three-tier policy
pub fn validate_medium_fraction(value: f64) -> Result<f64, String> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "medium fraction must be in (0.0, 1.0], got {}",
            value
        ))
    }
}
