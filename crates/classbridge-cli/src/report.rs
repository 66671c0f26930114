//! Human and JSON renderings of prediction results

use classbridge_classifier::{LabelMap, LabeledPrediction};
use classbridge_core::PredictionResult;
use serde::Serialize;
use std::fmt::Write;

/// JSON document emitted by `batch --json`
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub source: String,
    pub total: usize,
    pub samples: Vec<LabeledPrediction>,
}

fn display_name(labels: &LabelMap, index: usize) -> String {
    match labels.get(index) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("class {}", index),
    }
}

/// Class probabilities at or above `min_probability`, highest first
pub fn visible_probabilities(
    labels: &LabelMap,
    result: &PredictionResult,
    min_probability: f32,
) -> Vec<(String, f32)> {
    let mut visible: Vec<(String, f32)> = result
        .probabilities
        .iter()
        .enumerate()
        .filter(|(_, p)| **p >= min_probability)
        .map(|(i, p)| (display_name(labels, i), *p))
        .collect();
    visible.sort_by(|a, b| b.1.total_cmp(&a.1));
    visible
}

/// Text block for one prediction
pub fn render_prediction(
    labels: &LabelMap,
    result: &PredictionResult,
    min_probability: f32,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({:.1}%)",
        display_name(labels, result.predicted_class),
        result.confidence() * 100.0
    );
    for (name, probability) in visible_probabilities(labels, result, min_probability) {
        let _ = writeln!(out, "    {:<12} {:>6.1}%", name, probability * 100.0);
    }
    out
}

/// Text report for a batch, numbered from 1, followed by the total
pub fn render_batch<'a>(
    labels: &LabelMap,
    results: impl IntoIterator<Item = &'a PredictionResult>,
    min_probability: f32,
) -> String {
    let mut out = String::new();
    let mut total = 0;
    for (i, result) in results.into_iter().enumerate() {
        let _ = write!(
            out,
            "Sample {}: {}",
            i + 1,
            render_prediction(labels, result, min_probability)
        );
        total += 1;
    }
    let _ = writeln!(out, "Total samples: {}", total);
    out
}
