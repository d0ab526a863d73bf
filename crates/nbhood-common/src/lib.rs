//! Common types shared across the nbhood workspace: the cube data model,
//! its coordinates, and the unit handling needed to interpret them.

pub mod coord;
pub mod cube;
pub mod error;
pub mod time;
pub mod units;

pub use coord::{AttrValue, Coord};
pub use cube::{CoordRole, Cube};
pub use error::{CubeError, CubeResult};
pub use time::{epoch_hours, from_epoch_hours, EPOCH_HOURS};
pub use units::{Conversion, UnitKind, Units};
