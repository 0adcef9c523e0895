//! Error types for chiller preprocessing.
//!
//! Only structural failures surface here. Per-timestep numeric edge cases
//! (infeasible turn-down, immaterial charge capacity) resolve to zero or
//! sentinel values inside the chiller modules and never become errors.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while loading or processing a chiller or plant.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Curve descriptor file does not exist.
    #[error("curve descriptor not found: {}", path.display())]
    MissingCurveData { path: PathBuf },

    /// Curve descriptor file exists but cannot be parsed.
    #[error("malformed curve descriptor {} (line {line}): {message}", path.display())]
    MalformedCurveData {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Timeseries arrays for one entity disagree in length.
    #[error("length mismatch for {entity}: `{field}` has {found} values, expected {expected}")]
    LengthMismatch {
        entity: String,
        field: String,
        expected: usize,
        found: usize,
    },

    /// Input data that parsed but cannot be used.
    #[error("invalid input for {entity}: {message}")]
    InvalidInput { entity: String, message: String },

    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Convenience alias used across the crate.
pub type PrepResult<T> = Result<T, PrepError>;
