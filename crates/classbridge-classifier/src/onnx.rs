//! ONNX Runtime backend for the inference adapter

use crate::config::{EngineConfig, OptimizationLevel};
use crate::engine::{EngineLoader, InferenceEngine};
use classbridge_core::{Error, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use tracing::{debug, info};

/// Loads ONNX models into ONNX Runtime sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct OrtLoader;

impl OrtLoader {
    pub fn new() -> Self {
        Self
    }
}

impl EngineLoader for OrtLoader {
    fn load(&self, model_path: &Path, config: &EngineConfig) -> Result<Box<dyn InferenceEngine>> {
        Ok(Box::new(OrtEngine::load(model_path, config)?))
    }
}

/// ONNX Runtime session with its declared input and output names
pub struct OrtEngine {
    name: String,
    session: Session,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtEngine {
    /// Build a session for the model at `path`
    pub fn load(path: &Path, config: &EngineConfig) -> Result<Self> {
        // Environment setup is process-wide; a failure here resurfaces below
        if let Err(e) = ort::init().commit() {
            debug!(error = %e, "ONNX Runtime environment setup failed");
        }

        let session = Session::builder()
            .map_err(|e| Error::engine(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(graph_optimization(config.optimization))
            .map_err(|e| Error::engine(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| Error::engine(format!("Failed to set intra-op threads: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| {
                Error::engine(format!("Failed to load model from {}: {}", path.display(), e))
            })?;

        let input_names: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model")
            .to_string();

        info!(
            model = %name,
            inputs = ?input_names,
            outputs = ?output_names,
            threads = config.intra_threads,
            "ONNX model loaded"
        );

        Ok(Self {
            name,
            session,
            input_names,
            output_names,
        })
    }
}

impl InferenceEngine for OrtEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_names(&self) -> Vec<String> {
        self.input_names.clone()
    }

    fn output_names(&self) -> Vec<String> {
        self.output_names.clone()
    }

    fn run(
        &mut self,
        input_slot: usize,
        output_slot: usize,
        shape: [usize; 2],
        data: &[f32],
    ) -> Result<Vec<f32>> {
        let input_name = slot_name(&self.input_names, input_slot, "input", &self.name)?;
        let output_name = slot_name(&self.output_names, output_slot, "output", &self.name)?;

        let dims = vec![shape[0] as i64, shape[1] as i64];
        let tensor = Tensor::from_array((dims, data.to_vec()))
            .map_err(|e| Error::engine(format!("Failed to create input tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![input_name.as_str() => tensor])
            .map_err(|e| Error::engine(format!("Inference failed: {}", e)))?;

        let output = outputs.get(output_name.as_str()).ok_or_else(|| {
            Error::engine(format!("Missing output '{}' in results", output_name))
        })?;

        if let Ok((_, values)) = output.try_extract_tensor::<f32>() {
            return Ok(values.to_vec());
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return extract_sequence_map(output);
        }

        Err(Error::engine(format!(
            "Output '{}' is neither a float tensor nor a sequence of maps",
            output_name
        )))
    }
}

/// Read a `seq(map(int64, float))` output (zipmap-style classifier export),
/// ordered by class id
fn extract_sequence_map(output: &DynValue) -> Result<Vec<f32>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| Error::engine(format!("Failed to downcast to sequence: {}", e)))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| Error::engine(format!("Failed to extract sequence: {}", e)))?;

    let first = maps
        .first()
        .ok_or_else(|| Error::engine("Empty probability sequence"))?;

    let mut pairs = first
        .try_extract_key_values::<i64, f32>()
        .map_err(|e| Error::engine(format!("Failed to extract probability map: {}", e)))?;
    pairs.sort_by_key(|(class_id, _)| *class_id);

    debug!(classes = pairs.len(), "Extracted probabilities from seq(map)");
    Ok(pairs.into_iter().map(|(_, p)| p).collect())
}

fn slot_name(names: &[String], slot: usize, kind: &str, model: &str) -> Result<String> {
    names.get(slot).cloned().ok_or_else(|| {
        Error::engine(format!(
            "Model '{}' declares {} {}s, slot {} does not exist",
            model,
            names.len(),
            kind,
            slot
        ))
    })
}

fn graph_optimization(level: OptimizationLevel) -> GraphOptimizationLevel {
    match level {
        OptimizationLevel::Disable => GraphOptimizationLevel::Disable,
        OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
        OptimizationLevel::Extended => GraphOptimizationLevel::Level2,
        OptimizationLevel::All => GraphOptimizationLevel::Level3,
    }
}
