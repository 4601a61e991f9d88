//! Categorical encoding: label <-> integer code per field
//!
//! A `FieldEncoder` holds the classes of one field in code order, so the code
//! of a label is its position in the list. Trained encoders are loaded from a
//! JSON artifact of the form `{"field": ["class0", "class1", ...]}`; when no
//! artifact is available the built-in hand mapping is used instead.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{ArtifactLoadError, PipelineError};
use super::schema::{self, categorical_fields, field_spec, FieldKind};

/// Where an encoding table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EncodingSource {
    /// Loaded from the encoder artifact saved at training time
    Trained,
    /// Hand-written mapping compiled into the binary
    Builtin,
}

impl fmt::Display for EncodingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingSource::Trained => write!(f, "trained"),
            EncodingSource::Builtin => write!(f, "builtin"),
        }
    }
}

/// Label encoder for a single categorical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldEncoder {
    classes: Vec<String>,
}

impl FieldEncoder {
    pub fn new<S: Into<String>>(classes: impl IntoIterator<Item = S>) -> Self {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn code(&self, label: &str) -> Option<u32> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|idx| idx as u32)
    }

    pub fn label(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Per-field encoders for every categorical customer field
#[derive(Debug, Clone)]
pub struct EncodingTable {
    encoders: BTreeMap<String, FieldEncoder>,
    source: EncodingSource,
}

impl EncodingTable {
    /// The hand mapping of the form application.
    ///
    /// Note the payment method codes follow form order, not the sorted order
    /// a fitted label encoder would produce.
    pub fn builtin() -> Self {
        let mut encoders = BTreeMap::new();
        for spec in categorical_fields() {
            let classes: Vec<&str> = match spec.name {
                schema::GENDER => vec!["Female", "Male"],
                schema::INTERNET_SERVICE => vec!["DSL", "Fiber optic", "No"],
                schema::CONTRACT => vec!["Month-to-month", "One year", "Two year"],
                schema::PAYMENT_METHOD => vec![
                    "Electronic check",
                    "Mailed check",
                    "Bank transfer (automatic)",
                    "Credit card (automatic)",
                ],
                _ => schema::YES_NO.to_vec(),
            };
            encoders.insert(spec.name.to_string(), FieldEncoder::new(classes));
        }
        Self {
            encoders,
            source: EncodingSource::Builtin,
        }
    }

    /// Build a trained table, checking it against the customer schema.
    pub fn from_trained(
        encoders: BTreeMap<String, FieldEncoder>,
    ) -> Result<Self, ArtifactLoadError> {
        for name in encoders.keys() {
            match field_spec(name) {
                Some(spec) if spec.kind == FieldKind::Categorical => {}
                Some(_) => {
                    return Err(ArtifactLoadError::integrity(
                        "encoders",
                        format!("field '{}' is numeric and cannot have an encoder", name),
                    ))
                }
                None => {
                    return Err(ArtifactLoadError::integrity(
                        "encoders",
                        format!("field '{}' is not a customer field", name),
                    ))
                }
            }
        }

        for spec in categorical_fields() {
            let encoder = encoders.get(spec.name).ok_or_else(|| {
                ArtifactLoadError::integrity(
                    "encoders",
                    format!("no encoder for categorical field '{}'", spec.name),
                )
            })?;

            let classes: HashSet<&str> = encoder.classes.iter().map(String::as_str).collect();
            if classes.len() != encoder.classes.len() {
                return Err(ArtifactLoadError::integrity(
                    "encoders",
                    format!("encoder for '{}' has duplicate classes", spec.name),
                ));
            }
            if encoder.classes.len() != spec.vocabulary.len() {
                return Err(ArtifactLoadError::integrity(
                    "encoders",
                    format!(
                        "encoder for '{}' has {} classes, expected {}",
                        spec.name,
                        encoder.classes.len(),
                        spec.vocabulary.len()
                    ),
                ));
            }
            if let Some(unknown) = spec.vocabulary.iter().find(|v| !classes.contains(*v)) {
                return Err(ArtifactLoadError::integrity(
                    "encoders",
                    format!("encoder for '{}' does not know '{}'", spec.name, unknown),
                ));
            }
        }

        Ok(Self {
            encoders,
            source: EncodingSource::Trained,
        })
    }

    pub fn source(&self) -> EncodingSource {
        self.source
    }

    pub fn is_categorical(&self, field: &str) -> bool {
        self.encoders.contains_key(field)
    }

    pub fn encoder(&self, field: &str) -> Option<&FieldEncoder> {
        self.encoders.get(field)
    }

    /// Encode a label. Labels outside the field's vocabulary are rejected,
    /// never mapped to a default code.
    pub fn encode(&self, field: &str, label: &str) -> Result<u32, PipelineError> {
        let unknown = || PipelineError::UnknownCategory {
            field: field.to_string(),
            value: label.to_string(),
        };
        self.encoders
            .get(field)
            .ok_or_else(unknown)?
            .code(label)
            .ok_or_else(unknown)
    }

    pub fn decode(&self, field: &str, code: u32) -> Option<&str> {
        self.encoders.get(field)?.label(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEncoder)> {
        self.encoders.iter().map(|(n, e)| (n.as_str(), e))
    }
}
