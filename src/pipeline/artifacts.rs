//! Artifact loading from an artifact directory
//!
//! Conventional file names inside the directory:
//!
//! | File                 | Required | Fallback when absent          |
//! |----------------------|----------|-------------------------------|
//! | `model.json`         | yes      | -                             |
//! | `encoders.json`      | no       | built-in hand mapping         |
//! | `feature_order.json` | no       | built-in column order         |
//! | `scaler.json`        | no       | no scaling                    |
//! | `threshold.json`     | no       | 0.5                           |

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use super::assembler::FeatureOrder;
use super::classifier::{Classifier, ModelArtifact};
use super::decision::Threshold;
use super::encoder::{EncodingTable, FieldEncoder};
use super::error::ArtifactLoadError;
use super::scaler::ScalerArtifact;

pub const MODEL_FILE: &str = "model.json";
pub const ENCODERS_FILE: &str = "encoders.json";
pub const FEATURE_ORDER_FILE: &str = "feature_order.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const THRESHOLD_FILE: &str = "threshold.json";

/// Locations of the artifact files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoders: Option<PathBuf>,
    pub feature_order: Option<PathBuf>,
    pub scaler: Option<PathBuf>,
    pub threshold: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Resolve conventional file names inside `dir`. Optional artifacts are
    /// only included when a directory entry exists. A dangling symlink still
    /// counts, so loading it fails instead of falling back.
    pub fn from_dir(dir: &Path) -> Self {
        let optional = |name: &str| {
            let path = dir.join(name);
            path.symlink_metadata().is_ok().then_some(path)
        };
        Self {
            model: dir.join(MODEL_FILE),
            encoders: optional(ENCODERS_FILE),
            feature_order: optional(FEATURE_ORDER_FILE),
            scaler: optional(SCALER_FILE),
            threshold: optional(THRESHOLD_FILE),
        }
    }
}

/// Threshold file: either a bare number or `{"threshold": x}`
#[derive(Deserialize)]
#[serde(untagged)]
enum ThresholdFile {
    Bare(Threshold),
    Wrapped { threshold: Threshold },
}

impl From<ThresholdFile> for Threshold {
    fn from(file: ThresholdFile) -> Self {
        match file {
            ThresholdFile::Bare(t) | ThresholdFile::Wrapped { threshold: t } => t,
        }
    }
}

/// Everything loaded from disk, before cross-artifact validation
pub struct ArtifactSet {
    pub classifier: Box<dyn Classifier>,
    pub encoders: EncodingTable,
    pub feature_order: FeatureOrder,
    pub scaler: Option<ScalerArtifact>,
    pub threshold: Option<Threshold>,
}

impl std::fmt::Debug for ArtifactSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactSet")
            .field("classifier", &self.classifier.describe())
            .field("encoders", &self.encoders.source())
            .field("feature_order", &self.feature_order.len())
            .field("scaler", &self.scaler.is_some())
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl ArtifactSet {
    /// Load every artifact named in `paths`.
    ///
    /// Any missing required file, unreadable or corrupt file is an error;
    /// nothing is defaulted for a file that was named but failed to load.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        let model: ModelArtifact = read_json("model", &paths.model)?;
        let classifier = model.into_classifier()?;
        info!(path = %paths.model.display(), model = %classifier.describe(), "Loaded model");

        let encoders = match &paths.encoders {
            Some(path) => {
                let raw: BTreeMap<String, FieldEncoder> = read_json("encoders", path)?;
                let table = EncodingTable::from_trained(raw)?;
                info!(path = %path.display(), "Loaded trained encoders");
                table
            }
            None => {
                warn!("No encoder artifact; using the built-in hand mapping");
                EncodingTable::builtin()
            }
        };

        let feature_order = match &paths.feature_order {
            Some(path) => {
                let order: FeatureOrder = read_json("feature order", path)?;
                info!(path = %path.display(), columns = order.len(), "Loaded feature order");
                order
            }
            None => {
                info!("No feature order artifact; using the built-in column order");
                FeatureOrder::builtin()
            }
        };

        let scaler = match &paths.scaler {
            Some(path) => {
                let scaler: ScalerArtifact = read_json("scaler", path)?;
                info!(path = %path.display(), columns = scaler.columns().len(), "Loaded scaler");
                Some(scaler)
            }
            None => None,
        };

        let threshold = match &paths.threshold {
            Some(path) => {
                let file: ThresholdFile = read_json("threshold", path)?;
                let threshold = Threshold::from(file);
                info!(path = %path.display(), threshold = threshold.value(), "Loaded threshold");
                Some(threshold)
            }
            None => None,
        };

        Ok(Self {
            classifier,
            encoders,
            feature_order,
            scaler,
            threshold,
        })
    }

    /// Load from a directory using the conventional file names
    pub fn load_dir(dir: &Path) -> Result<Self, ArtifactLoadError> {
        Self::load(&ArtifactPaths::from_dir(dir))
    }
}

fn read_json<T: DeserializeOwned>(artifact: &'static str, path: &Path) -> Result<T, ArtifactLoadError> {
    if !path.exists() {
        return Err(ArtifactLoadError::Missing {
            artifact,
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).map_err(|source| ArtifactLoadError::Io {
        artifact,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ArtifactLoadError::Parse {
        artifact,
        path: path.to_path_buf(),
        source,
    })
}
