//! Circular smoothing kernels and their application to 2-D fields.
//!
//! A kernel is defined by its half-widths in grid cells along x and y
//! (`ranges`). The squared "radius" of the circle is `rx * ry`, so for square
//! grids it is the usual `r²`.
//!
//! Application is a correlation with "nearest" edge handling: indices that
//! fall outside the field are clamped to the nearest edge cell, matching
//! `scipy.ndimage.correlate(..., mode="nearest")`. The result is divided by
//! the kernel sum so constant fields are preserved.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use tracing::debug;

/// Kernel half-widths in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelRanges {
    pub x: usize,
    pub y: usize,
}

/// A circular kernel over a `(2*ry+1, 2*rx+1)` window.
#[derive(Debug, Clone)]
pub struct Kernel {
    ranges: KernelRanges,
    weights: Array2<f32>,
}

impl Kernel {
    /// Build a circular kernel.
    ///
    /// Weighted kernels fall off linearly in squared distance,
    /// `(r² - d²) / r²`, reaching zero at the circle edge. Unweighted kernels
    /// are 1 inside the circle (inclusive) and 0 outside.
    pub fn circular(ranges: KernelRanges, weighted: bool) -> Self {
        let (rx, ry) = (ranges.x as i64, ranges.y as i64);
        let r2 = (rx * ry) as f64;

        let weights = Array2::from_shape_fn(
            (2 * ranges.y + 1, 2 * ranges.x + 1),
            |(row, col)| {
                let dy = row as i64 - ry;
                let dx = col as i64 - rx;
                let d2 = (dx * dx + dy * dy) as f64;
                if weighted {
                    if r2 > 0.0 {
                        ((r2 - d2) / r2).max(0.0) as f32
                    } else if d2 == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else if d2 <= r2 {
                    1.0
                } else {
                    0.0
                }
            },
        );

        Self { ranges, weights }
    }

    pub fn ranges(&self) -> KernelRanges {
        self.ranges
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn sum(&self) -> f32 {
        self.weights.sum()
    }

    /// Non-zero taps as `(dy, dx, weight)` offsets from the centre.
    fn taps(&self) -> Vec<(isize, isize, f32)> {
        let (rx, ry) = (self.ranges.x as isize, self.ranges.y as isize);
        self.weights
            .indexed_iter()
            .filter(|(_, &w)| w != 0.0)
            .map(|((row, col), &w)| (row as isize - ry, col as isize - rx, w))
            .collect()
    }

    /// Smooth a (y, x) field: correlate with the kernel and normalise.
    pub fn smooth(&self, field: ArrayView2<f32>) -> Array2<f32> {
        let (nrows, ncols) = field.dim();
        let taps = self.taps();
        let norm = self.sum();
        debug!(
            rows = nrows,
            cols = ncols,
            taps = taps.len(),
            "Applying neighbourhood kernel"
        );

        if nrows == 0 || ncols == 0 {
            return field.to_owned();
        }

        let max_row = nrows as isize - 1;
        let max_col = ncols as isize - 1;

        // Process rows in parallel
        let rows: Vec<Vec<f32>> = (0..nrows)
            .into_par_iter()
            .map(|row| {
                (0..ncols)
                    .map(|col| {
                        let mut acc = 0.0f64;
                        for &(dy, dx, w) in &taps {
                            let r = (row as isize + dy).clamp(0, max_row) as usize;
                            let c = (col as isize + dx).clamp(0, max_col) as usize;
                            acc += f64::from(w) * f64::from(field[[r, c]]);
                        }
                        (acc / f64::from(norm)) as f32
                    })
                    .collect()
            })
            .collect();

        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((nrows, ncols), flat)
            .expect("one value per cell of the input field")
    }
}
