//! Common test fixtures for neighbourhood processing tests.
//!
//! These mirror the grids and lead-time tables used in operational
//! configurations, scaled down so tests stay fast.

/// Grid spacings in metres.
pub mod spacing {
    /// UK national grid at 2 km.
    pub const UKV_2KM: f64 = 2000.0;

    /// Coarse test grid at 10 km.
    pub const COARSE_10KM: f64 = 10_000.0;
}

/// Radius-by-lead-time tables: `(lead_times_hours, radii_km)`.
pub mod lead_times {
    /// Radius growing with lead time.
    pub const GROWING: (&[f64], &[f64]) = (&[2.0, 3.0, 4.0], &[2.0, 4.0, 6.0]);
}

/// Epoch unit used for generated time coordinates.
pub const EPOCH_HOURS: &str = "hours since 1970-01-01 00:00:00";

/// 2017-02-17 06:00 UTC in hours since the epoch.
pub const REFERENCE_TIME_HOURS: f64 = 413_142.0;
