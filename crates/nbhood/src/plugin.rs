//! Basic neighbourhood processing.

use std::fmt;

use nbhood_common::Cube;
use ndarray::{Array3, ArrayD, Axis, IxDyn};
use tracing::{debug, info};

use crate::config::{NbhoodConfig, MAX_KERNEL_CELL_RADIUS};
use crate::error::{NbhoodError, Result};
use crate::kernel::{Kernel, KernelRanges};
use crate::lead_time::find_required_lead_times;
use crate::radii::{Radii, RadiusLookup};

const X_COORD: &str = "projection_x_coordinate";
const Y_COORD: &str = "projection_y_coordinate";

/// Apply a neighbourhood processing kernel to a thresholded cube.
///
/// When applied to a thresholded probabilistic cube it acts like a low-pass
/// filter which reduces noisiness in the probabilities.
///
/// The kernel only works with projections in which the x and y grid spacings
/// are constant over the entire domain, such as the UK national grid. Kernels
/// are limited to [`MAX_KERNEL_CELL_RADIUS`] grid cells.
#[derive(Debug, Clone)]
pub struct BasicNeighbourhoodProcessing {
    radii: Radii,
    lookup: RadiusLookup,
    unweighted_mode: bool,
    max_kernel_cell_radius: usize,
}

impl BasicNeighbourhoodProcessing {
    /// Create a processor.
    ///
    /// `radii` are in kilometres. With `lead_times` (hours) there must be one
    /// radius per lead time, and the radius for each forecast is interpolated
    /// from that table. `unweighted_mode` selects a constant-weight circle.
    pub fn new(
        radii: impl Into<Radii>,
        lead_times: Option<Vec<f64>>,
        unweighted_mode: bool,
    ) -> Result<Self> {
        let radii = radii.into();
        let lookup = RadiusLookup::new(radii.clone(), lead_times)?;
        Ok(Self {
            radii,
            lookup,
            unweighted_mode,
            max_kernel_cell_radius: MAX_KERNEL_CELL_RADIUS,
        })
    }

    /// Create a processor taking weighting and kernel limits from `config`.
    pub fn from_config(
        radii: impl Into<Radii>,
        lead_times: Option<Vec<f64>>,
        config: &NbhoodConfig,
    ) -> Result<Self> {
        config.validate().map_err(NbhoodError::config)?;
        let mut plugin = Self::new(radii, lead_times, config.unweighted_mode)?;
        plugin.max_kernel_cell_radius = config.max_kernel_cell_radius;
        Ok(plugin)
    }

    pub fn radii(&self) -> &Radii {
        &self.radii
    }

    pub fn unweighted_mode(&self) -> bool {
        self.unweighted_mode
    }

    /// Kernel half-widths, in grid cells, for `radius_km` on the cube's grid.
    ///
    /// Spacing is taken from the first two points of each projection
    /// coordinate. The cell count is truncated toward zero.
    pub fn grid_cell_ranges(&self, cube: &Cube, radius_km: f64) -> Result<KernelRanges> {
        let spacing = |name: &str| -> Result<f64> {
            let coord = cube
                .coord(name)
                .map_err(|_| NbhoodError::invalid_grid("projection_x/y coords required"))?
                .converted("metres")?;
            match coord.points.as_slice() {
                [first, second, ..] => Ok(second - first),
                _ => Err(NbhoodError::invalid_grid(format!(
                    "{} needs at least two points",
                    name
                ))),
            }
        };
        let d_east = spacing(X_COORD)?;
        let d_north = spacing(Y_COORD)?;

        let cells_x = (radius_km * 1000.0 / d_east.abs()).trunc();
        let cells_y = (radius_km * 1000.0 / d_north.abs()).trunc();

        if cells_x == 0.0 || cells_y == 0.0 {
            return Err(NbhoodError::RadiusTooSmall(radius_km));
        }
        if cells_x < 0.0 || cells_y < 0.0 {
            return Err(NbhoodError::NegativeRadius(radius_km));
        }
        let limit = self.max_kernel_cell_radius as f64;
        if cells_x > limit || cells_y > limit || !cells_x.is_finite() || !cells_y.is_finite() {
            return Err(NbhoodError::RadiusTooLarge(radius_km));
        }

        let ranges = KernelRanges {
            x: cells_x as usize,
            y: cells_y as usize,
        };
        debug!(radius_km, ranges_x = ranges.x, ranges_y = ranges.y, "Kernel extent");
        Ok(ranges)
    }

    /// Smooth every (y, x) field of the cube with a kernel of `ranges`.
    ///
    /// Non-spatial axes are iterated over, never smoothed across.
    pub fn apply_kernel_for_smoothing(&self, cube: &Cube, ranges: KernelRanges) -> Result<Cube> {
        let axis_of = |name: &str| -> Result<usize> {
            cube.coord_dims(name)
                .ok()
                .and_then(|dims| dims.first().copied())
                .ok_or_else(|| NbhoodError::invalid_grid("projection_x/y coords required"))
        };
        let x_axis = axis_of(X_COORD)?;
        let y_axis = axis_of(Y_COORD)?;
        if x_axis == y_axis {
            return Err(NbhoodError::invalid_grid(
                "projection_x/y coords share a dimension",
            ));
        }

        let kernel = Kernel::circular(ranges, !self.unweighted_mode);
        let smoothed = smooth_over_axes(cube.data(), y_axis, x_axis, &kernel)?;

        let mut out = cube.clone();
        out.set_data(smoothed)?;
        Ok(out)
    }

    /// Calculate and apply the kernel for each forecast in the cube.
    pub fn process(&self, cube: &Cube) -> Result<Cube> {
        if let Some(realization) = cube.coords("realization").first() {
            if realization.len() > 1 {
                return Err(NbhoodError::MultipleRealizations);
            }
        }
        if cube.has_nan() {
            return Err(NbhoodError::NanInInput);
        }

        info!(plugin = %self, cube = %cube, "Neighbourhood processing");

        if !self.lookup.varies_with_lead_time() {
            let radius = self.lookup.radius_at(0.0);
            let ranges = self.grid_cell_ranges(cube, radius)?;
            return self.apply_kernel_for_smoothing(cube, ranges);
        }

        let required_lead_times = find_required_lead_times(cube)?;
        let radii: Vec<f64> = required_lead_times
            .iter()
            .map(|&lt| self.lookup.radius_at(lt))
            .collect();

        let slice_coord = if cube.has_coord("time") {
            "time"
        } else {
            "forecast_period"
        };
        let slices = cube.slices_over(slice_coord)?;
        if slices.len() != radii.len() {
            return Err(NbhoodError::InvalidCoordinate(format!(
                "{} slices over {} but {} lead times",
                slices.len(),
                slice_coord,
                radii.len()
            )));
        }

        let smoothed = slices
            .iter()
            .zip(required_lead_times.iter().zip(&radii))
            .map(|(slice, (&lead_time, &radius))| {
                debug!(lead_time, radius_km = radius, "Smoothing forecast");
                let ranges = self.grid_cell_ranges(slice, radius)?;
                self.apply_kernel_for_smoothing(slice, ranges)
            })
            .collect::<Result<Vec<Cube>>>()?;

        Ok(cube.merge_slices(slice_coord, &smoothed)?)
    }
}

impl fmt::Display for BasicNeighbourhoodProcessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<NeighbourhoodProcessing: radii_in_km: {}; unweighted_mode: {}>",
            self.radii, self.unweighted_mode
        )
    }
}

/// Smooth each (y, x) plane of `data`, iterating over all other axes.
fn smooth_over_axes(
    data: &ArrayD<f32>,
    y_axis: usize,
    x_axis: usize,
    kernel: &Kernel,
) -> Result<ArrayD<f32>> {
    let ndim = data.ndim();
    let mut order: Vec<usize> = (0..ndim).filter(|&a| a != y_axis && a != x_axis).collect();
    order.push(y_axis);
    order.push(x_axis);

    let permuted = data
        .view()
        .permuted_axes(IxDyn(&order))
        .as_standard_layout()
        .into_owned();
    let permuted_shape = permuted.shape().to_vec();
    let ny = permuted_shape[ndim - 2];
    let nx = permuted_shape[ndim - 1];
    let planes = permuted_shape[..ndim - 2].iter().product::<usize>();

    let stacked = permuted
        .into_shape((planes, ny, nx))
        .map_err(nbhood_common::CubeError::from)?;

    let mut out = Array3::<f32>::zeros((planes, ny, nx));
    for (i, plane) in stacked.axis_iter(Axis(0)).enumerate() {
        let smoothed = kernel.smooth(plane);
        out.index_axis_mut(Axis(0), i).assign(&smoothed);
    }

    let restored = out
        .into_dyn()
        .into_shape(IxDyn(&permuted_shape))
        .map_err(nbhood_common::CubeError::from)?;

    let mut inverse = vec![0; ndim];
    for (position, &axis) in order.iter().enumerate() {
        inverse[axis] = position;
    }
    Ok(restored
        .permuted_axes(IxDyn(&inverse))
        .as_standard_layout()
        .into_owned())
}
