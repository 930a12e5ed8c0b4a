use std::io;
use std::path::PathBuf;

/// Represents the different types of errors that can occur in the emotion classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Prediction or saving attempted before training or loading a model
    #[error("Model not ready: train or load a model first")]
    NotReady,
    /// One or both model artifacts are absent
    #[error("Model not found: {path:?} is missing. Run `cartas train` first")]
    MissingModel { path: PathBuf },
    /// The pipeline artifact does not belong to the label map next to it
    #[error("Model artifacts do not match: expected pipeline checksum {expected}, got {actual}")]
    ArtifactMismatch { expected: String, actual: String },
    /// A dataset row or persisted label map is invalid
    #[error("Malformed data: {0}")]
    MalformedData(String),
    /// Training could not run on the given data or configuration
    #[error("Training error: {0}")]
    Training(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}
