//! Error types for cube operations.

use thiserror::Error;

/// Result type alias using CubeError.
pub type CubeResult<T> = Result<T, CubeError>;

/// Errors raised by the cube model and its coordinates.
#[derive(Debug, Error)]
pub enum CubeError {
    // === Coordinate Errors ===
    #[error("Coordinate not found: {0}")]
    CoordinateNotFound(String),

    #[error("Coordinate '{name}' has {points} points but dimension {axis} has length {len}")]
    CoordinateLength {
        name: String,
        points: usize,
        axis: usize,
        len: usize,
    },

    #[error("Coordinate '{0}' is not scalar")]
    NotScalar(String),

    // === Unit Errors ===
    #[error("Unable to convert from '{from}' to '{to}'")]
    IncompatibleUnits { from: String, to: String },

    #[error("Unparseable unit: {0}")]
    InvalidUnit(String),

    // === Shape Errors ===
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Axis {axis} out of range for cube with {ndim} dimensions")]
    AxisOutOfRange { axis: usize, ndim: usize },

    #[error("Cannot concatenate: {0}")]
    Concatenate(String),
}

impl From<ndarray::ShapeError> for CubeError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::ShapeMismatch(err.to_string())
    }
}
