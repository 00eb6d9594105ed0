//! Error types for melops-am organized by failure kind.

use ndarray::ShapeError;
use std::path::PathBuf;
use thiserror::Error;

/// Acoustic model error variants.
#[derive(Debug, Error)]
pub enum Error {
    /// Model loading error
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Model integrity violation (fatal for the lookup that hit it)
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Lookup issued before the model was allocated
    #[error("acoustic model is not allocated")]
    NotAllocated,

    /// Senone id outside the tied senone pool
    #[error("senone id {id} out of range (pool size {len})")]
    SenoneOutOfRange { id: usize, len: usize },
}

/// Model loading errors (missing or malformed model files).
#[derive(Debug, Error)]
pub enum LoadError {
    /// Model file not found in the repository
    #[error("model file not found: {0}")]
    ModelNotFound(String),

    /// IO error while reading a model file
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed model definition line
    #[error("mdef line {line}: {reason}")]
    Mdef { line: usize, reason: String },

    /// Model definition header disagrees with its body
    #[error("mdef declares {declared} {what} but defines {found}")]
    CountMismatch {
        what: &'static str,
        declared: usize,
        found: usize,
    },

    /// Unknown HMM position tag
    #[error("unknown hmm position: {0:?}")]
    UnknownPosition(String),

    /// Context phone that is not a declared base phone
    #[error("unknown context phone {phone:?} for unit {unit}")]
    UnknownContextPhone { unit: String, phone: String },

    /// Transition matrix id outside the loaded matrices
    #[error("transition matrix {id} out of range ({len} loaded)")]
    TransitionMatrixOutOfRange { id: usize, len: usize },

    /// State id outside the tied senone pool
    #[error("senone {id} of unit {unit} out of range (pool size {len})")]
    SenoneOutOfRange { unit: String, id: usize, len: usize },

    /// Transition matrix shape disagrees with the HMM's state count
    #[error("transition matrix {id} has shape {rows}x{cols}, unit {unit} needs {states}x{}", .states + 1)]
    TransitionMatrixShape {
        unit: String,
        id: usize,
        rows: usize,
        cols: usize,
        states: usize,
    },

    /// Transition probability outside [0, 1]
    #[error("transition matrix {id} holds invalid probability {value}")]
    InvalidTransition { id: usize, value: f32 },

    /// Same unit defined twice at the same position
    #[error("duplicate hmm for unit {unit} at position {position}")]
    DuplicateHmm { unit: String, position: String },

    /// IO error without a known path
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Transition matrix file decode error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// ndarray shape error
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Violations of invariants every well-formed model satisfies.
///
/// A model always carries a context-independent HMM for each base phone, so
/// hitting one of these means the model itself is broken. Callers should
/// treat them as fatal rather than retry.
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// No context-independent unit registered for a base phone
    #[error("no context-independent unit for base phone {name:?}")]
    MissingContextIndependentUnit { name: String },

    /// No context-independent HMM registered for a unit
    #[error("no context-independent hmm for unit {unit}")]
    MissingContextIndependentHmm { unit: String },
}

/// Result type alias for melops-am operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// std::io::Error → LoadError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Load(LoadError::Io(e))
    }
}

// serde_json::Error → LoadError → Error
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Load(LoadError::Json(e))
    }
}

// ShapeError → LoadError → Error
impl From<ShapeError> for Error {
    fn from(e: ShapeError) -> Self {
        Error::Load(LoadError::Shape(e))
    }
}
