//! Inference context: loaded artifacts plus the request pipeline
//!
//! The context is built once at startup and is immutable afterwards, so a
//! shared reference can score records from any number of threads.

use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::artifacts::{ArtifactPaths, ArtifactSet};
use super::assembler::{FeatureOrder, FeatureVector};
use super::classifier::Classifier;
use super::decision::{Decision, DecisionPolicy, PolicyKind, Threshold, DEFAULT_MEDIUM_FRACTION};
use super::encoder::EncodingTable;
use super::error::{ArtifactLoadError, PipelineError};
use super::record::{CustomerRecord, FieldValue};
use super::scaler::BoundScaler;
use super::schema::{field_spec, indicator_label, CUSTOMER_FIELDS, TENURE};

/// Settings that shape the pipeline beyond the artifacts themselves
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Overrides the threshold artifact when set
    pub threshold: Option<f64>,
    pub policy: PolicyKind,
    pub medium_fraction: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            policy: PolicyKind::TwoTier,
            medium_fraction: DEFAULT_MEDIUM_FRACTION,
        }
    }
}

/// Result of scoring one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub probability: f64,
    pub decision: Decision,
    /// Scaled vector the classifier saw
    pub features: FeatureVector,
}

/// Immutable, shareable pipeline state
pub struct InferenceContext {
    classifier: Box<dyn Classifier>,
    encoders: EncodingTable,
    feature_order: FeatureOrder,
    scaler: Option<BoundScaler>,
    policy: DecisionPolicy,
    artifact_dir: Option<PathBuf>,
}

impl std::fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceContext")
            .field("classifier", &self.classifier.describe())
            .field("encoders", &self.encoders.source())
            .field("feature_order", &self.feature_order.names())
            .field("scaler", &self.scaler)
            .field("policy", &self.policy)
            .finish()
    }
}

impl InferenceContext {
    /// Validate a loaded artifact set against the customer schema and build
    /// the context.
    pub fn new(artifacts: ArtifactSet, config: &PipelineConfig) -> Result<Self, ArtifactLoadError> {
        let ArtifactSet {
            classifier,
            encoders,
            feature_order,
            scaler,
            threshold,
        } = artifacts;

        let (missing, unexpected) =
            feature_order.diff(CUSTOMER_FIELDS.iter().map(|f| f.name));
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ArtifactLoadError::integrity(
                "feature order",
                format!(
                    "columns do not match the customer fields (unknown: [{}], absent: [{}])",
                    missing.join(", "),
                    unexpected.join(", ")
                ),
            ));
        }

        if classifier.n_features() != feature_order.len() {
            return Err(ArtifactLoadError::integrity(
                "model",
                format!(
                    "model expects {} features but the feature order has {}",
                    classifier.n_features(),
                    feature_order.len()
                ),
            ));
        }

        let scaler = scaler
            .map(|artifact| artifact.bind(&feature_order))
            .transpose()?;

        let threshold = match config.threshold {
            Some(value) => Threshold::new(value)
                .map_err(|message| ArtifactLoadError::integrity("threshold", message))?,
            None => threshold.unwrap_or_default(),
        };
        let policy = DecisionPolicy::from_kind(config.policy, threshold, config.medium_fraction)
            .map_err(|message| ArtifactLoadError::integrity("policy", message))?;

        Ok(Self {
            classifier,
            encoders,
            feature_order,
            scaler,
            policy,
            artifact_dir: None,
        })
    }

    /// Load artifacts from disk and build the context
    pub fn load(paths: &ArtifactPaths, config: &PipelineConfig) -> Result<Self, ArtifactLoadError> {
        let mut context = Self::new(ArtifactSet::load(paths)?, config)?;
        context.artifact_dir = paths.model.parent().map(|p| p.to_path_buf());
        Ok(context)
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn encoders(&self) -> &EncodingTable {
        &self.encoders
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.feature_order
    }

    pub fn scaler(&self) -> Option<&BoundScaler> {
        self.scaler.as_ref()
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    pub fn artifact_dir(&self) -> Option<&PathBuf> {
        self.artifact_dir.as_ref()
    }

    /// Encode categorical fields and validate numeric ones.
    ///
    /// A Yes/No field also accepts the 0/1 indicator used in raw datasets.
    /// The output keeps the record's field order; reordering is left to the
    /// assembler.
    pub fn encode(&self, record: &CustomerRecord) -> Result<Vec<(String, f64)>, PipelineError> {
        let (missing, unexpected) = self.feature_order.diff(record.names());
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(PipelineError::MissingFeature {
                missing,
                unexpected,
            });
        }

        record
            .iter()
            .map(|(name, value)| {
                let encoded = match (self.encoders.is_categorical(name), value) {
                    (true, FieldValue::Label(label)) => self.encoders.encode(name, label)? as f64,
                    (true, FieldValue::Number(n)) => match binary_label(name, *n) {
                        Some(label) => self.encoders.encode(name, label)? as f64,
                        None => {
                            return Err(PipelineError::invalid(
                                name,
                                format!("expected a category label, got number {}", n),
                            ))
                        }
                    },
                    (false, FieldValue::Number(n)) => check_numeric(name, *n)?,
                    (false, FieldValue::Label(label)) => {
                        return Err(PipelineError::invalid(
                            name,
                            format!("expected a number, got '{}'", label),
                        ))
                    }
                };
                Ok((name.to_string(), encoded))
            })
            .collect()
    }

    /// Encode, reorder and scale a record into the classifier's input
    pub fn features(&self, record: &CustomerRecord) -> Result<FeatureVector, PipelineError> {
        let encoded = self.encode(record)?;
        let mut vector = self
            .feature_order
            .assemble(encoded.iter().map(|(n, v)| (n.as_str(), *v)))?;
        if let Some(scaler) = &self.scaler {
            scaler.transform(&mut vector)?;
        }
        Ok(vector)
    }

    /// Run the full pipeline on one record
    pub fn predict(&self, record: &CustomerRecord) -> Result<Prediction, PipelineError> {
        let features = self.features(record)?;
        let probability = self.classifier.predict_proba(features.as_slice())?;
        let decision = self.policy.decide(probability)?;
        debug!(probability, %decision, "Scored record");
        Ok(Prediction {
            probability,
            decision,
            features,
        })
    }

    /// Score many records in parallel. Results keep input order; a failing
    /// record does not affect the others.
    pub fn predict_batch(&self, records: &[CustomerRecord]) -> Vec<Result<Prediction, PipelineError>> {
        records.par_iter().map(|record| self.predict(record)).collect()
    }
}

fn binary_label(name: &str, value: f64) -> Option<&'static str> {
    field_spec(name)
        .filter(|spec| spec.is_binary())
        .and_then(|_| indicator_label(value))
}

fn check_numeric(name: &str, value: f64) -> Result<f64, PipelineError> {
    if !value.is_finite() {
        return Err(PipelineError::invalid(name, format!("{} is not a finite number", value)));
    }
    if value < 0.0 {
        return Err(PipelineError::invalid(name, format!("{} is negative", value)));
    }
    if name == TENURE && value.fract() != 0.0 {
        warn!(field = name, value, "Tenure is counted in whole months");
    }
    if let Some((lo, hi)) = field_spec(name).and_then(|spec| spec.typical_range) {
        if value < lo || value > hi {
            warn!(
                field = name,
                value,
                "Value outside the training range [{}, {}]; prediction quality may degrade",
                lo,
                hi
            );
        }
    }
    Ok(value)
}
