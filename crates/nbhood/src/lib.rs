//! Neighbourhood Processing for Gridded Forecasts
//!
//! This crate smooths thresholded probability fields by averaging each grid
//! cell over a circular neighbourhood. It provides:
//!
//! - **Circular kernels**: weighted (linear fall-off in squared distance) or
//!   unweighted (constant inside the circle)
//! - **Lead-time radii**: the radius can grow with forecast lead time and is
//!   interpolated from a table of (lead time, radius) pairs
//! - **Metadata preservation**: coordinates and attributes pass through
//!   untouched; only the data values change
//!
//! # Architecture
//!
//! ```text
//! Input Cube
//!      │
//!      ▼
//! BasicNeighbourhoodProcessing::process(cube)
//!      │
//!      ├─► Reject multi-realization or NaN input
//!      │
//!      ├─► Fixed radius
//!      │         │
//!      │         └─► grid_cell_ranges ─► apply_kernel_for_smoothing
//!      │
//!      └─► Radius by lead time
//!                │
//!                ├─► find_required_lead_times
//!                ├─► interpolate radius per lead time
//!                ├─► slices_over("time"), smooth each slice
//!                └─► merge_slices back into one cube
//!                         │
//!                         ▼
//!                   Smoothed Cube
//! ```
//!
//! # Example
//!
//! ```ignore
//! use nbhood::BasicNeighbourhoodProcessing;
//!
//! let plugin = BasicNeighbourhoodProcessing::new(
//!     vec![2.0, 4.0, 6.0],
//!     Some(vec![2.0, 3.0, 4.0]),
//!     false,
//! )?;
//! let smoothed = plugin.process(&cube)?;
//! ```

pub mod config;
pub mod error;
pub mod kernel;
pub mod lead_time;
pub mod plugin;
pub mod radii;

// Re-export commonly used types at crate root
pub use config::{NbhoodConfig, MAX_KERNEL_CELL_RADIUS};
pub use error::{NbhoodError, Result};
pub use kernel::{Kernel, KernelRanges};
pub use lead_time::find_required_lead_times;
pub use plugin::BasicNeighbourhoodProcessing;
pub use radii::{interp, Radii, RadiusLookup};
