//! Classbridge Classifier
//!
//! Everything between a host application and the model-execution engine:
//! - Narrow, key-anchored loaders for the scaling profile and label map
//! - Tolerant parsing of delimited numeric rows for batch prediction
//! - Feature standardization and the inference adapter over a pluggable engine
//! - The session handle (`Bridge`) that gates every prediction
//!
//! The ONNX Runtime backend lives behind the `onnx` feature (enabled by default).

pub mod config;
pub mod engine;
pub mod labels;
pub mod numeric;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod predictor;
pub mod rows;
pub mod scaler;
pub mod session;

pub use config::{ArtifactPaths, BridgeConfig, EngineConfig, OptimizationLevel, ScalerPolicy};
pub use engine::{EngineLoader, InferenceAdapter, InferenceEngine};
pub use labels::LabelMap;
pub use numeric::{parse_f32_prefix, parse_f64_prefix};
#[cfg(feature = "onnx")]
pub use onnx::{OrtEngine, OrtLoader};
pub use predictor::Predictor;
pub use rows::{parse_row, parse_rows, read_samples};
pub use scaler::{extract_array, ScalingProfile};
pub use session::{Bridge, LabeledPrediction};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ArtifactPaths, BridgeConfig};
    pub use crate::engine::{EngineLoader, InferenceEngine};
    pub use crate::session::{Bridge, LabeledPrediction};
    pub use classbridge_core::prelude::*;
}
