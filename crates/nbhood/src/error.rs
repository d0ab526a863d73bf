//! Error types for neighbourhood processing.

use nbhood_common::CubeError;
use thiserror::Error;

/// Errors that can occur while configuring or running neighbourhood processing.
#[derive(Error, Debug)]
pub enum NbhoodError {
    /// Radii and lead times were given in different numbers.
    #[error(
        "There is a mismatch in the number of radii and the number of lead times. \
         Unable to continue due to mismatch."
    )]
    RadiiLeadTimeMismatch,

    /// The radius rounds down to no grid cells.
    #[error("Neighbourhood processing radius of {0} km gives zero cell extent")]
    RadiusTooSmall(f64),

    /// The radius is negative.
    #[error("Neighbourhood processing radius of {0} km gives a negative cell extent")]
    NegativeRadius(f64),

    /// The radius covers more cells than the kernel limit.
    #[error("Neighbourhood processing radius of {0} km exceeds maximum grid cell extent")]
    RadiusTooLarge(f64),

    /// The cube lacks usable projection coordinates.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A coordinate required to derive lead times is absent.
    #[error("{0}")]
    CoordinateNotFound(String),

    /// A coordinate is present but unusable.
    #[error("{0}")]
    InvalidCoordinate(String),

    /// More than one ensemble member in the input.
    #[error("Does not operate across realizations.")]
    MultipleRealizations,

    /// Input data contains NaN.
    #[error("Error: NaN detected in input cube data")]
    NanInInput,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Cube model error.
    #[error(transparent)]
    Cube(#[from] CubeError),
}

impl NbhoodError {
    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_yaml::Error> for NbhoodError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for neighbourhood processing operations.
pub type Result<T> = std::result::Result<T, NbhoodError>;
