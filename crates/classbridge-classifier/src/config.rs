//! Configuration for the bridge and its inference engine

use classbridge_core::{Error, Result, CLASS_COUNT, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional file name of the exported model
pub const DEFAULT_MODEL_FILE: &str = "lightgbm_model.onnx";

/// Conventional file name of the scaling profile
pub const DEFAULT_SCALER_FILE: &str = "scaler_params.json";

/// Conventional file name of the label map
pub const DEFAULT_LABELS_FILE: &str = "label_mapping.json";

/// Shape and engine settings for a bridge session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Features per sample (F)
    #[serde(default = "default_feature_count")]
    pub feature_count: usize,

    /// Classes produced by the model (C)
    #[serde(default = "default_class_count")]
    pub class_count: usize,

    /// Scaling profile validation policy
    #[serde(default)]
    pub scaler: ScalerPolicy,

    /// Inference engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            feature_count: default_feature_count(),
            class_count: default_class_count(),
            scaler: ScalerPolicy::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject shapes and settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.feature_count == 0 {
            return Err(Error::config("feature_count must be at least 1"));
        }
        if self.class_count == 0 {
            return Err(Error::config("class_count must be at least 1"));
        }
        if self.engine.intra_threads == 0 {
            return Err(Error::config("engine.intra_threads must be at least 1"));
        }
        Ok(())
    }
}

/// Validation applied to a loaded scaling profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalerPolicy {
    /// Treat a zero scale entry as an invalid profile instead of letting it
    /// produce non-finite features at predict time
    #[serde(default)]
    pub reject_zero_scale: bool,
}

/// Model-execution engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Declared model input that receives the `[1, F]` tensor
    #[serde(default)]
    pub input_slot: usize,

    /// Declared model output holding class probabilities. Classifier exports
    /// list the label output first and the probability output second.
    #[serde(default = "default_probability_output_slot")]
    pub probability_output_slot: usize,

    /// Intra-op threads for the engine
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,

    /// Graph optimization level
    #[serde(default)]
    pub optimization: OptimizationLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_slot: 0,
            probability_output_slot: default_probability_output_slot(),
            intra_threads: default_intra_threads(),
            optimization: OptimizationLevel::default(),
        }
    }
}

/// Graph optimization level passed to the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    #[default]
    Disable,
    Basic,
    Extended,
    All,
}

/// Locations of the three artifacts a session is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub labels: PathBuf,
}

impl ArtifactPaths {
    pub fn new(
        model: impl Into<PathBuf>,
        scaler: impl Into<PathBuf>,
        labels: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model: model.into(),
            scaler: scaler.into(),
            labels: labels.into(),
        }
    }

    /// Artifacts under their conventional names inside `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(DEFAULT_MODEL_FILE),
            dir.join(DEFAULT_SCALER_FILE),
            dir.join(DEFAULT_LABELS_FILE),
        )
    }

    /// Paths that do not point at an existing file
    pub fn missing(&self) -> Vec<&Path> {
        [&self.model, &self.scaler, &self.labels]
            .into_iter()
            .filter(|p| !p.is_file())
            .map(PathBuf::as_path)
            .collect()
    }
}

fn default_feature_count() -> usize {
    FEATURE_COUNT
}

fn default_class_count() -> usize {
    CLASS_COUNT
}

fn default_probability_output_slot() -> usize {
    1
}

fn default_intra_threads() -> usize {
    1
}
