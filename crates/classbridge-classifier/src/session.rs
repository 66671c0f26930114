//! Session handle and lifecycle
//!
//! A [`Bridge`] owns everything a prediction needs: the scaling profile, the
//! label map and the engine session. It starts uninitialized, becomes
//! initialized only when all three artifacts load, and returns to
//! uninitialized on [`Bridge::cleanup`]. Calls must be serialized by the
//! owner; the bridge performs no internal locking.

use crate::config::{ArtifactPaths, BridgeConfig};
use crate::engine::{EngineLoader, InferenceAdapter, InferenceEngine};
use crate::labels::LabelMap;
use crate::predictor::Predictor;
use crate::scaler::ScalingProfile;
use classbridge_core::{BatchResult, Error, PredictionResult, Result, Sample};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Loaded state of an initialized bridge
struct SessionState {
    predictor: Predictor,
    labels: LabelMap,
}

/// Explicit session handle for one classifier
pub struct Bridge {
    config: BridgeConfig,
    loader: Box<dyn EngineLoader>,
    state: Option<SessionState>,
}

/// Prediction paired with the display name of its class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledPrediction {
    pub class_name: String,
    pub confidence: f32,
    #[serde(flatten)]
    pub result: PredictionResult,
}

impl Bridge {
    /// Uninitialized bridge backed by ONNX Runtime
    #[cfg(feature = "onnx")]
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_loader(config, crate::onnx::OrtLoader::new())
    }

    /// Uninitialized bridge with a custom engine loader
    pub fn with_loader(config: BridgeConfig, loader: impl EngineLoader + 'static) -> Self {
        Self {
            config,
            loader: Box::new(loader),
            state: None,
        }
    }

    /// Construct and initialize in one step
    pub fn open(
        config: BridgeConfig,
        loader: impl EngineLoader + 'static,
        paths: &ArtifactPaths,
    ) -> Result<Self> {
        let mut bridge = Self::with_loader(config, loader);
        bridge.initialize(paths)?;
        Ok(bridge)
    }

    /// Load the scaler, the label map and the model, in that order.
    ///
    /// Any failing stage leaves the bridge uninitialized. Initializing a live
    /// session is refused; call [`Bridge::cleanup`] first.
    pub fn initialize(&mut self, paths: &ArtifactPaths) -> Result<()> {
        if self.state.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        self.config.validate()?;

        let feature_count = self.config.feature_count;
        let class_count = self.config.class_count;

        info!(
            model = %paths.model.display(),
            scaler = %paths.scaler.display(),
            labels = %paths.labels.display(),
            "Initializing classifier"
        );

        let profile = ScalingProfile::load(&paths.scaler, feature_count, &self.config.scaler)?;
        let labels = LabelMap::load(&paths.labels, class_count)?;
        let engine = self.loader.load(&paths.model, &self.config.engine)?;

        let adapter = InferenceAdapter::new(engine, &self.config.engine, feature_count, class_count);
        self.state = Some(SessionState {
            predictor: Predictor::new(profile, adapter, feature_count),
            labels,
        });

        info!(
            features = feature_count,
            classes = class_count,
            "Classifier initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Classify one sample of exactly `feature_count` raw features
    pub fn predict(&mut self, features: &[f32]) -> Result<PredictionResult> {
        self.state_mut()?.predictor.predict(features)
    }

    /// Classify already-parsed samples in order
    pub fn predict_samples(&mut self, samples: &[Sample]) -> Result<BatchResult> {
        self.state_mut()?.predictor.predict_samples(samples)
    }

    /// Classify every accepted row of a delimited file
    pub fn predict_file(&mut self, path: impl AsRef<Path>) -> Result<BatchResult> {
        self.state_mut()?.predictor.predict_file(path)
    }

    /// Display name for a class index
    pub fn class_name(&self, index: usize) -> Result<&str> {
        let labels = &self.state()?.labels;
        labels.get(index).ok_or(Error::ClassIndex {
            index: index as i64,
            count: labels.len(),
        })
    }

    /// Attach the class display name and confidence to a result
    pub fn label_prediction(&self, result: PredictionResult) -> Result<LabeledPrediction> {
        let class_name = self.class_name(result.predicted_class)?.to_string();
        Ok(LabeledPrediction {
            class_name,
            confidence: result.confidence(),
            result,
        })
    }

    pub fn labels(&self) -> Result<&LabelMap> {
        Ok(&self.state()?.labels)
    }

    pub fn profile(&self) -> Result<&ScalingProfile> {
        Ok(self.state()?.predictor.profile())
    }

    /// The engine session backing this bridge
    pub fn engine(&self) -> Result<&dyn InferenceEngine> {
        Ok(self.state()?.predictor.adapter().engine())
    }

    pub fn feature_count(&self) -> usize {
        self.config.feature_count
    }

    pub fn class_count(&self) -> usize {
        self.config.class_count
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Release the engine session and loaded artifacts. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        if self.state.take().is_some() {
            info!("Classifier resources released");
        }
    }

    fn state(&self) -> Result<&SessionState> {
        self.state.as_ref().ok_or(Error::NotInitialized)
    }

    fn state_mut(&mut self) -> Result<&mut SessionState> {
        self.state.as_mut().ok_or(Error::NotInitialized)
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    struct UniformEngine;

    impl InferenceEngine for UniformEngine {
        fn name(&self) -> &str {
            "uniform"
        }

        fn input_names(&self) -> Vec<String> {
            vec!["input".to_string()]
        }

        fn output_names(&self) -> Vec<String> {
            vec!["label".to_string(), "probabilities".to_string()]
        }

        fn run(&mut self, _: usize, _: usize, _: [usize; 2], _: &[f32]) -> Result<Vec<f32>> {
            Ok(vec![0.25; 4])
        }
    }

    fn uniform_loader(_: &Path, _: &EngineConfig) -> Result<Box<dyn InferenceEngine>> {
        Ok(Box::new(UniformEngine))
    }

    fn small_config() -> BridgeConfig {
        BridgeConfig {
            feature_count: 2,
            class_count: 4,
            ..BridgeConfig::default()
        }
    }

    fn write_artifacts(dir: &Path) -> ArtifactPaths {
        let paths = ArtifactPaths::from_dir(dir);
        std::fs::write(&paths.model, b"model").unwrap();
        std::fs::write(&paths.scaler, r#"{"mean": [0, 0], "scale": [1, 1]}"#).unwrap();
        std::fs::write(&paths.labels, r#"{"0": "a", "1": "b", "2": "c", "3": "d"}"#).unwrap();
        paths
    }

    #[test]
    fn test_uninitialized_bridge() {
        let mut bridge = Bridge::with_loader(small_config(), uniform_loader);

        assert!(!bridge.is_initialized());
        assert!(matches!(bridge.predict(&[0.0, 0.0]), Err(Error::NotInitialized)));
        assert!(matches!(bridge.labels(), Err(Error::NotInitialized)));
        assert!(bridge.engine().is_err());
        assert_eq!(bridge.feature_count(), 2);
        assert_eq!(bridge.class_count(), 4);
    }

    #[test]
    fn test_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        let mut bridge = Bridge::with_loader(small_config(), uniform_loader);

        bridge.initialize(&paths).unwrap();
        let result = bridge.predict(&[1.0, 2.0]).unwrap();
        assert_eq!(result.probabilities.len(), 4);
        // Ties resolve to the lowest index
        assert_eq!(result.predicted_class, 0);
        assert_eq!(bridge.class_name(3).unwrap(), "d");
        assert_eq!(bridge.profile().unwrap().len(), 2);

        bridge.cleanup();
        assert!(!bridge.is_initialized());
        bridge.cleanup();
    }

    #[test]
    fn test_invalid_config_is_rejected_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        let config = BridgeConfig {
            class_count: 0,
            ..small_config()
        };

        let mut bridge = Bridge::with_loader(config, uniform_loader);
        assert!(matches!(bridge.initialize(&paths), Err(Error::Config(_))));
        assert!(!bridge.is_initialized());
    }

    #[test]
    fn test_labeled_prediction_serializes_flat() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_artifacts(dir.path());
        let bridge = Bridge::open(small_config(), uniform_loader, &paths).unwrap();

        let labeled = bridge
            .label_prediction(PredictionResult::from_probabilities(vec![0.1, 0.7, 0.1, 0.1]))
            .unwrap();
        assert_eq!(labeled.class_name, "b");

        let json = serde_json::to_value(&labeled).unwrap();
        assert_eq!(json["class_name"], "b");
        assert_eq!(json["predicted_class"], 1);
        assert_eq!(json["probabilities"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_debug_reports_state_only() {
        let bridge = Bridge::with_loader(small_config(), uniform_loader);
        let debug = format!("{:?}", bridge);
        assert!(debug.contains("initialized: false"));
    }
}
