//! Core types for classbridge

use serde::{Deserialize, Serialize};

/// Features per sample expected by the reference model
pub const FEATURE_COUNT: usize = 20;

/// Classes produced by the reference model
pub const CLASS_COUNT: usize = 6;

/// One fixed-width feature vector to be classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(Vec<f32>);

impl Sample {
    /// Create a sample from raw feature values
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Feature values in column order
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for Sample {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl AsRef<[f32]> for Sample {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Class probabilities for one sample plus the selected class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probabilities in label-map order
    pub probabilities: Vec<f32>,

    /// Index of the highest probability (first occurrence wins)
    pub predicted_class: usize,
}

impl PredictionResult {
    /// Build a result, selecting the class with [`argmax`]
    pub fn from_probabilities(probabilities: Vec<f32>) -> Self {
        let predicted_class = argmax(&probabilities);
        Self {
            probabilities,
            predicted_class,
        }
    }

    /// Probability assigned to the predicted class
    pub fn confidence(&self) -> f32 {
        self.probabilities
            .get(self.predicted_class)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Results for every accepted sample of a batch, in acceptance order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<PredictionResult>,
}

impl BatchResult {
    pub fn new(results: Vec<PredictionResult>) -> Self {
        Self { results }
    }

    /// Number of accepted samples
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PredictionResult> {
        self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PredictionResult> {
        self.results.iter()
    }

    /// Predicted class of every sample, index-aligned with the batch
    pub fn predicted_classes(&self) -> Vec<usize> {
        self.results.iter().map(|r| r.predicted_class).collect()
    }
}

impl IntoIterator for BatchResult {
    type Item = PredictionResult;
    type IntoIter = std::vec::IntoIter<PredictionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a PredictionResult;
    type IntoIter = std::slice::Iter<'a, PredictionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Position of the maximum value; ties resolve to the lowest index.
///
/// The first element seeds the running maximum and only a strictly greater
/// value replaces it. A NaN at index 0 therefore wins; a later NaN never
/// does. An empty slice yields 0.
pub fn argmax(values: &[f32]) -> usize {
    let Some(&first) = values.first() else {
        return 0;
    };

    let mut best_idx = 0;
    let mut best = first;
    for (idx, &value) in values.iter().enumerate().skip(1) {
        if value > best {
            best = value;
            best_idx = idx;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_argmax_picks_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.05, 0.05, 0.05, 0.05]), 1);
    }

    #[test]
    fn test_argmax_tie_first_occurrence() {
        assert_eq!(argmax(&[0.5, 0.5, 0.0, 0.0, 0.0, 0.0]), 0);
        assert_eq!(argmax(&[0.0, 0.3, 0.3, 0.3]), 1);
    }

    #[test]
    fn test_argmax_nan_handling() {
        // A leading NaN is never displaced
        assert_eq!(argmax(&[f32::NAN, 0.2, 0.9]), 0);
        assert_eq!(argmax(&[0.4, f32::NAN, 0.1]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn test_prediction_confidence() {
        let result = PredictionResult::from_probabilities(vec![0.1, 0.2, 0.6, 0.1]);
        assert_eq!(result.predicted_class, 2);
        assert!((result.confidence() - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn test_batch_result_alignment() {
        let batch = BatchResult::new(vec![
            PredictionResult::from_probabilities(vec![0.9, 0.1]),
            PredictionResult::from_probabilities(vec![0.2, 0.8]),
        ]);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.predicted_classes(), vec![0, 1]);
        assert_eq!(batch.get(1).map(|r| r.predicted_class), Some(1));
    }

    #[test]
    fn test_sample_serializes_as_array() {
        let sample = Sample::new(vec![1.0, 2.5]);
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, "[1.0,2.5]");
    }

    proptest! {
        #[test]
        fn prop_argmax_is_first_maximum(values in prop::collection::vec(-1.0e6f32..1.0e6, 1..32)) {
            let idx = argmax(&values);
            let max = values.iter().cloned().fold(f32::MIN, f32::max);

            prop_assert_eq!(values[idx], max);
            prop_assert!(values[..idx].iter().all(|&v| v < max));
        }
    }
}
