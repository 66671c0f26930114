//! Error types for classbridge

use std::fmt;
use std::path::PathBuf;

/// Result type alias using classbridge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Artifacts read by the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Per-feature mean/scale profile
    Scaler,
    /// Class index to display name map
    Labels,
    /// Trained model consumed by the inference engine
    Model,
    /// Delimited numeric rows for batch prediction
    Samples,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scaler => "scaler",
            Self::Labels => "label map",
            Self::Model => "model",
            Self::Samples => "sample file",
        };
        f.write_str(name)
    }
}

/// Core error type for classbridge operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A prediction or label lookup ran before a successful initialize
    #[error("classifier is not initialized")]
    NotInitialized,

    /// Initialize was called on a live session without cleanup
    #[error("classifier is already initialized; call cleanup first")]
    AlreadyInitialized,

    /// Sample width does not match the model input
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    /// Class index outside `0..count`
    #[error("class index {index} out of range (0..{count})")]
    ClassIndex { index: i64, count: usize },

    /// An artifact could not be opened or read
    #[error("failed to open {artifact} at {}: {source}", .path.display())]
    Open {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scaler arrays failed validation
    #[error("invalid scaler: {0}")]
    InvalidScaler(String),

    /// A scaler array token is not a number
    #[error("scaler array {key:?} contains non-numeric token {token:?}")]
    ScalerParse { key: String, token: String },

    /// A sample file produced no accepted rows
    #[error("no usable rows in {}", .0.display())]
    NoUsableData(PathBuf),

    /// Model-execution engine errors (session construction or forward pass)
    #[error("inference engine error: {0}")]
    Engine(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors not tied to a specific artifact
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of errors, used by boundary layers to pick status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    InvalidInput,
    ResourceUnavailable,
    Validation,
    Engine,
    Parse,
    Internal,
}

impl Error {
    /// Create a new engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid scaler error
    pub fn invalid_scaler(msg: impl Into<String>) -> Self {
        Self::InvalidScaler(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an open error for the given artifact
    pub fn open(artifact: Artifact, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            artifact,
            path: path.into(),
            source,
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::AlreadyInitialized | Self::FeatureCount { .. } | Self::ClassIndex { .. } => {
                ErrorKind::InvalidInput
            }
            Self::Open { .. } | Self::NoUsableData(_) | Self::Io(_) => {
                ErrorKind::ResourceUnavailable
            }
            Self::InvalidScaler(_) | Self::Config(_) => ErrorKind::Validation,
            Self::Engine(_) => ErrorKind::Engine,
            Self::ScalerParse { .. } => ErrorKind::Parse,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The artifact this error refers to, if any
    pub fn artifact(&self) -> Option<Artifact> {
        match self {
            Self::Open { artifact, .. } => Some(*artifact),
            Self::InvalidScaler(_) | Self::ScalerParse { .. } => Some(Artifact::Scaler),
            Self::NoUsableData(_) => Some(Artifact::Samples),
            _ => None,
        }
    }
}
