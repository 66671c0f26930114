//! Fixture engine and artifact helpers for bridge tests

#![allow(dead_code)]

use classbridge_classifier::{ArtifactPaths, EngineConfig, EngineLoader, InferenceEngine};
use classbridge_core::{Error, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Engine whose output is a deterministic function of its input: the value
/// at output position i is the i-th standardized feature, padded with a
/// label output in slot 0 that disagrees with the probabilities.
pub struct FixtureEngine {
    calls: Arc<AtomicUsize>,
}

impl InferenceEngine for FixtureEngine {
    fn name(&self) -> &str {
        "fixture"
    }

    fn input_names(&self) -> Vec<String> {
        vec!["float_input".to_string()]
    }

    fn output_names(&self) -> Vec<String> {
        vec!["output_label".to_string(), "output_probability".to_string()]
    }

    fn run(
        &mut self,
        input_slot: usize,
        output_slot: usize,
        shape: [usize; 2],
        data: &[f32],
    ) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if input_slot != 0 || shape != [1, data.len()] {
            return Err(Error::engine("bad input"));
        }
        match output_slot {
            // Label output: always claims the last class
            0 => Ok(vec![5.0]),
            1 => Ok(data.to_vec()),
            other => Err(Error::engine(format!("no output slot {}", other))),
        }
    }
}

/// Loader that hands out fixture engines, or fails if configured to
#[derive(Clone, Default)]
pub struct FixtureLoader {
    pub loads: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FixtureLoader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EngineLoader for FixtureLoader {
    fn load(&self, model_path: &Path, _config: &EngineConfig) -> Result<Box<dyn InferenceEngine>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::engine(format!(
                "cannot build session from {}",
                model_path.display()
            )));
        }
        Ok(Box::new(FixtureEngine {
            calls: Arc::clone(&self.calls),
        }))
    }
}

/// Route bridge logs to the test harness output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("classbridge_classifier=debug")
        .with_test_writer()
        .try_init();
}

pub const LABELS: &str = r#"{"0": "DH", "1": "KD", "2": "PS10", "3": "PS10-H", "4": "QZ", "5": "YM"}"#;

/// Scaler text with `count` entries of the given mean and scale
pub fn scaler_text(count: usize, mean: f64, scale: f64) -> String {
    let repeat = |v: f64| vec![v.to_string(); count].join(", ");
    format!(
        "{{\n  \"mean\": [{}],\n  \"scale\": [{}]\n}}\n",
        repeat(mean),
        repeat(scale)
    )
}

/// Temp directory holding a model placeholder, scaler and labels
pub struct Artifacts {
    pub dir: TempDir,
    pub paths: ArtifactPaths,
}

impl Artifacts {
    pub fn new(scaler: &str, labels: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::from_dir(dir.path());
        std::fs::write(&paths.model, b"placeholder").unwrap();
        std::fs::write(&paths.scaler, scaler).unwrap();
        std::fs::write(&paths.labels, labels).unwrap();
        Self { dir, paths }
    }

    /// Identity scaler for 20 features and the six reference labels
    pub fn reference() -> Self {
        Self::new(&scaler_text(20, 0.0, 1.0), LABELS)
    }

    pub fn write(&self, name: &str, content: &str) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }
}

/// A 20-feature sample whose first six values favour `class`
pub fn sample_for(class: usize) -> Vec<f32> {
    let mut features = vec![0.01; 20];
    features[class] = 0.9;
    features
}

pub fn csv_row(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
