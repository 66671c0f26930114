//! Classbridge Core
//!
//! Core types and error handling shared across the classbridge crates.
//!
//! This crate provides:
//! - The error taxonomy and `Result` alias used by every library crate
//! - Fixed-width feature samples and prediction results
//! - The reference model shape (feature and class counts)
//! - First-occurrence arg-max used to pick the predicted class

pub mod error;
pub mod types;

pub use error::{Artifact, Error, ErrorKind, Result};
pub use types::{argmax, BatchResult, PredictionResult, Sample, CLASS_COUNT, FEATURE_COUNT};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::types::{BatchResult, PredictionResult, Sample};
}
