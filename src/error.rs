//! Error type shared by the mask model, the filter constructors and the
//! configuration layer.
//!
//! Filter `process` calls never fail; errors only surface where a caller
//! hands us data or parameters that break a precondition.

use thiserror::Error;

/// Errors raised while building masks, reference devices or filters.
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("size mismatch: expected {expected} samples, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("unsupported channel count: {0} (expected 1, 2, 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("anisotropic fading is not implemented (x radius {x_radius}, y radius {y_radius})")]
    AnisotropicAntialiasing { x_radius: i32, y_radius: i32 },

    #[error("grow until darkest pixel needs a reference device")]
    MissingReference,

    #[error("invalid filter configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SelectionError>;

#[cfg(feature = "python")]
impl From<SelectionError> for pyo3::PyErr {
    fn from(err: SelectionError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
