//! Standardize, infer, and select a class for single samples and batches

use crate::engine::InferenceAdapter;
use crate::rows::read_samples;
use crate::scaler::ScalingProfile;
use classbridge_core::{BatchResult, Error, PredictionResult, Result, Sample};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs the prediction pipeline for one loaded model
pub struct Predictor {
    profile: ScalingProfile,
    adapter: InferenceAdapter,
    feature_count: usize,
}

impl Predictor {
    pub fn new(profile: ScalingProfile, adapter: InferenceAdapter, feature_count: usize) -> Self {
        Self {
            profile,
            adapter,
            feature_count,
        }
    }

    /// Classify one raw feature vector.
    ///
    /// A wrong feature count is rejected before the engine is touched.
    pub fn predict(&mut self, features: &[f32]) -> Result<PredictionResult> {
        if features.len() != self.feature_count {
            return Err(Error::FeatureCount {
                expected: self.feature_count,
                actual: features.len(),
            });
        }

        let start = Instant::now();
        let standardized = self.profile.standardize(features);

        match self.adapter.infer(&standardized) {
            Ok(result) => {
                let latency_us = start.elapsed().as_micros() as u64;
                metrics::counter!("classbridge_predictions_total").increment(1);
                metrics::histogram!("classbridge_inference_latency_us").record(latency_us as f64);
                debug!(
                    class = result.predicted_class,
                    confidence = result.confidence(),
                    latency_us,
                    "Prediction complete"
                );
                Ok(result)
            }
            Err(e) => {
                metrics::counter!("classbridge_prediction_failures_total").increment(1);
                Err(e)
            }
        }
    }

    /// Classify samples in order; the first failure aborts the batch
    pub fn predict_samples(&mut self, samples: &[Sample]) -> Result<BatchResult> {
        let mut results = Vec::with_capacity(samples.len());

        for (index, sample) in samples.iter().enumerate() {
            let result = self.predict(sample.values()).map_err(|e| {
                warn!(sample = index, error = %e, "Batch aborted");
                e
            })?;
            results.push(result);
        }

        Ok(BatchResult::new(results))
    }

    /// Classify every accepted row of a delimited file.
    ///
    /// Results are aligned with acceptance order, not file line numbers.
    pub fn predict_file(&mut self, path: impl AsRef<Path>) -> Result<BatchResult> {
        let path = path.as_ref();
        let samples = read_samples(path, self.feature_count)?;

        if samples.is_empty() {
            return Err(Error::NoUsableData(path.to_path_buf()));
        }

        info!(path = %path.display(), samples = samples.len(), "Running batch prediction");
        self.predict_samples(&samples)
    }

    pub fn profile(&self) -> &ScalingProfile {
        &self.profile
    }

    pub fn adapter(&self) -> &InferenceAdapter {
        &self.adapter
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }
}
