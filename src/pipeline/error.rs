//! Error types for artifact loading and per-request inference.
//!
//! `ArtifactLoadError` stops the process before any request is served.
//! `PipelineError` is reported for a single record and never retried.

use std::path::PathBuf;

use thiserror::Error;

use super::classifier::ClassifierError;

/// Errors raised while loading model artifacts at startup.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    /// A required artifact file does not exist.
    #[error("Missing {artifact} artifact: {} not found", path.display())]
    Missing {
        /// Artifact kind (model, scaler, encoders, ...)
        artifact: &'static str,
        /// Path that was expected to hold it
        path: PathBuf,
    },

    /// The artifact file exists but could not be read.
    #[error("Failed to read {artifact} artifact {}: {source}", path.display())]
    Io {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact file is not valid JSON for its expected shape.
    #[error("Corrupt {artifact} artifact {}: {source}", path.display())]
    Parse {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact parsed but is inconsistent with the schema or with
    /// another artifact.
    #[error("Invalid {artifact} artifact: {message}")]
    Integrity {
        artifact: &'static str,
        message: String,
    },
}

impl ArtifactLoadError {
    pub(crate) fn integrity(artifact: &'static str, message: impl Into<String>) -> Self {
        ArtifactLoadError::Integrity {
            artifact,
            message: message.into(),
        }
    }
}

/// Errors raised while scoring a single customer record.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A categorical value is not part of the field's trained vocabulary.
    #[error("Unknown category '{value}' for field '{field}'")]
    UnknownCategory { field: String, value: String },

    /// The encoded record does not match the feature order exactly.
    #[error("{}", describe_mismatch(missing, unexpected))]
    MissingFeature {
        /// Feature order fields absent from the record
        missing: Vec<String>,
        /// Record fields that are not part of the feature order (or repeated)
        unexpected: Vec<String>,
    },

    /// A value has the wrong type or is outside its numeric domain.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// The classifier failed on the assembled vector.
    #[error("Inference failed: {0}")]
    Inference(#[from] ClassifierError),
}

impl PipelineError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True when the failure was caused by the caller's data rather than by
    /// the loaded artifacts or the program itself.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownCategory { .. } | PipelineError::InvalidInput { .. }
        )
    }
}

fn describe_mismatch(missing: &[String], unexpected: &[String]) -> String {
    match (missing.is_empty(), unexpected.is_empty()) {
        (false, true) => format!("Missing feature(s): {}", missing.join(", ")),
        (true, false) => format!("Unexpected feature(s): {}", unexpected.join(", ")),
        _ => format!(
            "Missing feature(s): {}; unexpected feature(s): {}",
            missing.join(", "),
            unexpected.join(", ")
        ),
    }
}
