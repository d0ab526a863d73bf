//! Forecast lead times of a cube.

use nbhood_common::{Cube, CubeError, EPOCH_HOURS};
use tracing::debug;

use crate::error::{NbhoodError, Result};

/// Lead times, in hours, at which radii must be evaluated.
///
/// Read from `forecast_period` when present (points only, bounds ignored).
/// Otherwise derived as `time - forecast_reference_time`. Coordinates are
/// converted on copies; the cube itself is not modified.
pub fn find_required_lead_times(cube: &Cube) -> Result<Vec<f64>> {
    if let Ok(fp) = cube.coord("forecast_period") {
        let fp = fp
            .converted("hours")
            .map_err(|e| NbhoodError::InvalidCoordinate(format!("For forecast_period: {}", e)))?;
        debug!(lead_times = ?fp.points, "Lead times from forecast_period");
        return Ok(fp.points);
    }

    let (Ok(time), Ok(frt)) = (cube.coord("time"), cube.coord("forecast_reference_time")) else {
        return Err(NbhoodError::CoordinateNotFound(format!(
            "The forecast period coordinate is not available within {}. \
             The time coordinate and forecast_reference_time coordinate were \
             also not available for calculating the forecast_period.",
            cube
        )));
    };

    let convert = |e: CubeError| {
        NbhoodError::InvalidCoordinate(format!("For time/forecast_reference_time: {}", e))
    };
    let time = time.converted(EPOCH_HOURS).map_err(convert)?;
    let frt = frt.converted(EPOCH_HOURS).map_err(convert)?;

    let lead_times: Vec<f64> = match frt.points.as_slice() {
        [reference] => time.points.iter().map(|t| t - reference).collect(),
        refs if refs.len() == time.points.len() => {
            time.points.iter().zip(refs).map(|(t, r)| t - r).collect()
        }
        refs => {
            return Err(NbhoodError::InvalidCoordinate(format!(
                "For time/forecast_reference_time: {} times but {} reference times",
                time.points.len(),
                refs.len()
            )))
        }
    };

    debug!(lead_times = ?lead_times, "Lead times from time - forecast_reference_time");
    Ok(lead_times)
}
