//! Numeric scaling with parameters fixed at training time

use serde::{Deserialize, Serialize};

use super::assembler::{FeatureOrder, FeatureVector};
use super::error::{ArtifactLoadError, PipelineError};
use super::schema::field_spec;

/// Scaler artifact as saved next to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    /// `(x - min) / (max - min)`
    MinMax {
        columns: Vec<String>,
        min: Vec<f64>,
        max: Vec<f64>,
    },
}

impl ScalerArtifact {
    pub fn columns(&self) -> &[String] {
        match self {
            ScalerArtifact::Standard { columns, .. } | ScalerArtifact::MinMax { columns, .. } => {
                columns
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ScalerArtifact::Standard { .. } => "standard",
            ScalerArtifact::MinMax { .. } => "min-max",
        }
    }

    /// Resolve the artifact to per-position affine transforms against a
    /// feature order.
    pub fn bind(&self, order: &FeatureOrder) -> Result<BoundScaler, ArtifactLoadError> {
        let (columns, first, second) = match self {
            ScalerArtifact::Standard {
                columns,
                mean,
                scale,
            } => (columns, mean, scale),
            ScalerArtifact::MinMax { columns, min, max } => (columns, min, max),
        };

        if first.len() != columns.len() || second.len() != columns.len() {
            return Err(ArtifactLoadError::integrity(
                "scaler",
                format!(
                    "{} columns but {} and {} parameters",
                    columns.len(),
                    first.len(),
                    second.len()
                ),
            ));
        }

        let mut columns_out = Vec::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            match field_spec(name) {
                Some(spec) if spec.is_numeric() => {}
                _ => {
                    return Err(ArtifactLoadError::integrity(
                        "scaler",
                        format!("column '{}' is not a numeric customer field", name),
                    ))
                }
            }

            let position = order.position(name).ok_or_else(|| {
                ArtifactLoadError::integrity(
                    "scaler",
                    format!("column '{}' is not in the feature order", name),
                )
            })?;

            if columns_out.iter().any(|c: &ScaledColumn| c.position == position) {
                return Err(ArtifactLoadError::integrity(
                    "scaler",
                    format!("column '{}' appears more than once", name),
                ));
            }

            let (offset, divisor) = match self {
                ScalerArtifact::Standard { .. } => (first[i], second[i]),
                ScalerArtifact::MinMax { .. } => (first[i], second[i] - first[i]),
            };

            if !offset.is_finite() || !divisor.is_finite() || divisor <= 0.0 {
                return Err(ArtifactLoadError::integrity(
                    "scaler",
                    format!(
                        "degenerate {} parameters for '{}' (offset {}, divisor {})",
                        self.kind(),
                        name,
                        offset,
                        divisor
                    ),
                ));
            }

            columns_out.push(ScaledColumn {
                name: name.clone(),
                position,
                offset,
                divisor,
            });
        }

        Ok(BoundScaler {
            kind: self.kind(),
            columns: columns_out,
        })
    }
}

/// One scaled column resolved to its feature vector position
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledColumn {
    pub name: String,
    pub position: usize,
    offset: f64,
    divisor: f64,
}

/// A scaler bound to a feature order; touches only its own positions
#[derive(Debug, Clone, PartialEq)]
pub struct BoundScaler {
    kind: &'static str,
    columns: Vec<ScaledColumn>,
}

impl BoundScaler {
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn columns(&self) -> &[ScaledColumn] {
        &self.columns
    }

    pub fn is_scaled(&self, position: usize) -> bool {
        self.columns.iter().any(|c| c.position == position)
    }

    /// Scale the bound positions in place
    pub fn transform(&self, vector: &mut FeatureVector) -> Result<(), PipelineError> {
        let values = vector.as_mut_slice();
        for column in &self.columns {
            let value = *values.get(column.position).ok_or_else(|| {
                PipelineError::invalid(
                    &column.name,
                    format!(
                        "feature vector has {} positions, scaler expects position {}",
                        values.len(),
                        column.position
                    ),
                )
            })?;
            if !value.is_finite() {
                return Err(PipelineError::invalid(
                    &column.name,
                    format!("{} is not a finite number", value),
                ));
            }
            values[column.position] = (value - column.offset) / column.divisor;
        }
        Ok(())
    }
}
