//! Inference adapter over a pluggable model-execution engine

use crate::config::EngineConfig;
use classbridge_core::{Error, PredictionResult, Result};
use std::path::Path;

/// A loaded model that can run a forward pass over a fixed-shape tensor.
///
/// Implement this for a concrete runtime (ONNX Runtime ships behind the
/// `onnx` feature). Slots are positions in the model's declared inputs and
/// outputs.
pub trait InferenceEngine: Send {
    /// Engine or model identifier for logs
    fn name(&self) -> &str;

    /// Declared input names, in order
    fn input_names(&self) -> Vec<String>;

    /// Declared output names, in order
    fn output_names(&self) -> Vec<String>;

    /// Feed `data` with `shape` to `input_slot` and return the flattened
    /// values of `output_slot`
    fn run(
        &mut self,
        input_slot: usize,
        output_slot: usize,
        shape: [usize; 2],
        data: &[f32],
    ) -> Result<Vec<f32>>;
}

/// Constructs engine sessions from a model artifact
pub trait EngineLoader: Send + Sync {
    fn load(&self, model_path: &Path, config: &EngineConfig) -> Result<Box<dyn InferenceEngine>>;
}

impl<F> EngineLoader for F
where
    F: Fn(&Path, &EngineConfig) -> Result<Box<dyn InferenceEngine>> + Send + Sync,
{
    fn load(&self, model_path: &Path, config: &EngineConfig) -> Result<Box<dyn InferenceEngine>> {
        self(model_path, config)
    }
}

/// Turns standardized features into class probabilities via an engine
pub struct InferenceAdapter {
    engine: Box<dyn InferenceEngine>,
    input_slot: usize,
    output_slot: usize,
    feature_count: usize,
    class_count: usize,
}

impl InferenceAdapter {
    pub fn new(
        engine: Box<dyn InferenceEngine>,
        config: &EngineConfig,
        feature_count: usize,
        class_count: usize,
    ) -> Self {
        Self {
            engine,
            input_slot: config.input_slot,
            output_slot: config.probability_output_slot,
            feature_count,
            class_count,
        }
    }

    /// Run one `[1, F]` forward pass and keep the first C output values.
    ///
    /// The predicted class is recomputed from those values rather than taken
    /// from any label output the model also exposes.
    pub fn infer(&mut self, standardized: &[f32]) -> Result<PredictionResult> {
        if standardized.len() != self.feature_count {
            return Err(Error::FeatureCount {
                expected: self.feature_count,
                actual: standardized.len(),
            });
        }

        let mut output = self.engine.run(
            self.input_slot,
            self.output_slot,
            [1, self.feature_count],
            standardized,
        )?;

        if output.len() < self.class_count {
            return Err(Error::engine(format!(
                "output slot {} of '{}' has {} values, expected at least {}",
                self.output_slot,
                self.engine.name(),
                output.len(),
                self.class_count
            )));
        }
        output.truncate(self.class_count);

        Ok(PredictionResult::from_probabilities(output))
    }

    pub fn engine(&self) -> &dyn InferenceEngine {
        self.engine.as_ref()
    }

    pub fn output_slot(&self) -> usize {
        self.output_slot
    }
}
