//! Pipeline module - encode, assemble, scale, classify, decide

pub mod artifacts;
pub mod assembler;
pub mod classifier;
pub mod context;
pub mod decision;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod record;
pub mod scaler;
pub mod schema;

pub use artifacts::{ArtifactPaths, ArtifactSet};
pub use assembler::{FeatureOrder, FeatureVector};
pub use classifier::{Classifier, ClassifierError, LogisticModel, ModelArtifact, TreeEnsemble};
pub use context::{InferenceContext, PipelineConfig, Prediction};
pub use decision::{Decision, DecisionPolicy, PolicyKind, Threshold};
pub use encoder::{EncodingSource, EncodingTable, FieldEncoder};
pub use error::{ArtifactLoadError, PipelineError};
pub use loader::*;
pub use record::{CustomerRecord, FieldValue};
pub use scaler::{BoundScaler, ScalerArtifact};
