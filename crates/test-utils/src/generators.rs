//! Test data generators for creating synthetic gridded fields.
//!
//! Every generator builds a cube on a regular projected grid with
//! `projection_y_coordinate` on axis 0 and `projection_x_coordinate` on
//! axis 1 (plus any leading axes it adds), spaced in metres.

use nbhood_common::{Coord, Cube};
use ndarray::{Array2, Array3, ArrayD};

use crate::fixtures::{EPOCH_HOURS, REFERENCE_TIME_HOURS};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Evenly spaced points starting at zero.
pub fn spaced_points(n: usize, spacing: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 * spacing).collect()
}

/// Wraps a (y, x) field into a cube with projection coordinates.
pub fn grid_cube(data: Array2<f32>, spacing_m: f64) -> Cube {
    let (height, width) = data.dim();
    Cube::new(data.into_dyn())
        .with_name("probability_of_precipitation_rate_above_threshold")
        .with_units("1")
        .with_dim_coord(
            Coord::new("projection_y_coordinate", spaced_points(height, spacing_m), "m"),
            0,
        )
        .and_then(|c| {
            c.with_dim_coord(
                Coord::new("projection_x_coordinate", spaced_points(width, spacing_m), "m"),
                1,
            )
        })
        .expect("generated coordinates match the grid")
}

/// Zeros everywhere except a 1.0 in the centre cell.
pub fn single_point_cube(width: usize, height: usize, spacing_m: f64) -> Cube {
    let mut data = Array2::<f32>::zeros((height, width));
    data[[height / 2, width / 2]] = 1.0;
    grid_cube(data, spacing_m)
}

/// A constant field.
pub fn constant_cube(width: usize, height: usize, spacing_m: f64, value: f32) -> Cube {
    grid_cube(Array2::from_elem((height, width), value), spacing_m)
}

/// The [`create_test_grid`] pattern as a cube.
pub fn pattern_cube(width: usize, height: usize, spacing_m: f64) -> Cube {
    let data = Array2::from_shape_vec((height, width), create_test_grid(width, height))
        .expect("pattern has width * height values");
    grid_cube(data, spacing_m)
}

/// Adds scalar `time`, `forecast_reference_time` and `forecast_period`
/// coordinates for a single lead time.
pub fn with_forecast_coords(cube: Cube, lead_time_hours: f64) -> Cube {
    cube.with_aux_coord(
        Coord::scalar("time", REFERENCE_TIME_HOURS + lead_time_hours, EPOCH_HOURS),
        None,
    )
    .and_then(|c| {
        c.with_aux_coord(
            Coord::scalar("forecast_reference_time", REFERENCE_TIME_HOURS, EPOCH_HOURS),
            None,
        )
    })
    .and_then(|c| {
        c.with_aux_coord(Coord::scalar("forecast_period", lead_time_hours, "hours"), None)
    })
    .expect("scalar coordinates always fit")
}

/// A (time, y, x) cube with a centred point source in every time slice.
///
/// `time` is the dimension coordinate on axis 0, `forecast_period` an
/// auxiliary coordinate on the same axis, `forecast_reference_time` scalar.
pub fn time_series_cube(
    lead_times_hours: &[f64],
    width: usize,
    height: usize,
    spacing_m: f64,
) -> Cube {
    let n = lead_times_hours.len();
    let mut data = Array3::<f32>::zeros((n, height, width));
    for t in 0..n {
        data[[t, height / 2, width / 2]] = 1.0;
    }
    let times: Vec<f64> = lead_times_hours
        .iter()
        .map(|lt| REFERENCE_TIME_HOURS + lt)
        .collect();

    build_3d(data.into_dyn(), spacing_m, |cube| {
        cube.with_dim_coord(Coord::new("time", times, EPOCH_HOURS), 0)?
            .with_aux_coord(
                Coord::new("forecast_period", lead_times_hours.to_vec(), "hours"),
                Some(0),
            )?
            .with_aux_coord(
                Coord::scalar("forecast_reference_time", REFERENCE_TIME_HOURS, EPOCH_HOURS),
                None,
            )
    })
}

/// A (realization, y, x) cube with `members` ensemble members.
pub fn realization_cube(members: usize, width: usize, height: usize, spacing_m: f64) -> Cube {
    let data = Array3::<f32>::from_elem((members, height, width), 0.5);
    let points: Vec<f64> = (0..members).map(|m| m as f64).collect();
    build_3d(data.into_dyn(), spacing_m, |cube| {
        cube.with_dim_coord(Coord::new("realization", points, "1"), 0)
    })
}

fn build_3d<F>(data: ArrayD<f32>, spacing_m: f64, leading: F) -> Cube
where
    F: FnOnce(Cube) -> nbhood_common::CubeResult<Cube>,
{
    let height = data.shape()[1];
    let width = data.shape()[2];
    let cube = Cube::new(data)
        .with_name("probability_of_precipitation_rate_above_threshold")
        .with_units("1");
    leading(cube)
        .and_then(|c| {
            c.with_dim_coord(
                Coord::new("projection_y_coordinate", spaced_points(height, spacing_m), "m"),
                1,
            )
        })
        .and_then(|c| {
            c.with_dim_coord(
                Coord::new("projection_x_coordinate", spaced_points(width, spacing_m), "m"),
                2,
            )
        })
        .expect("generated coordinates match the grid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[1], 1000.0);
        assert_eq!(grid[10], 1.0);
    }

    #[test]
    fn test_single_point_cube() {
        let cube = single_point_cube(5, 5, 2000.0);
        assert_eq!(cube.shape(), &[5, 5]);
        assert_eq!(cube.data()[[2, 2]], 1.0);
        assert_eq!(cube.data().sum(), 1.0);
        let x = cube.coord("projection_x_coordinate").unwrap();
        assert_eq!(x.points[1] - x.points[0], 2000.0);
    }

    #[test]
    fn test_time_series_cube() {
        let cube = time_series_cube(&[2.0, 3.0], 4, 3, 2000.0);
        assert_eq!(cube.shape(), &[2, 3, 4]);
        assert_eq!(cube.coord_dims("forecast_period").unwrap(), vec![0]);
        assert_eq!(cube.coord("time").unwrap().points[1], REFERENCE_TIME_HOURS + 3.0);
    }

    #[test]
    fn test_with_forecast_coords() {
        let cube = with_forecast_coords(constant_cube(3, 3, 1000.0, 1.0), 6.0);
        assert_eq!(cube.coord("forecast_period").unwrap().points, vec![6.0]);
        assert!(cube.coord_dims("time").unwrap().is_empty());
    }
}
