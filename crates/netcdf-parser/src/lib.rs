//! NetCDF loading and saving for cubes.
//!
//! Files are read and written with the native `netcdf` library (libnetcdf +
//! HDF5). Only the subset of the CF conventions needed to round-trip gridded
//! forecast fields is handled: dimension coordinates, auxiliary and scalar
//! coordinates listed in `coordinates`, coordinate bounds, and fill values.
//!
//! # Example
//!
//! ```ignore
//! use netcdf_parser::{load_cube, save_cube};
//!
//! let cube = load_cube("input.nc", None)?;
//! save_cube(&cube, "output.nc")?;
//! ```

pub mod error;
pub mod native;
pub mod reader;
pub mod writer;

pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use reader::load_cube;
pub use writer::save_cube;
