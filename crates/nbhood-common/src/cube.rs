//! The cube: an n-dimensional field with coordinate metadata.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{ArrayD, ArrayViewD, Axis};
use tracing::debug;

use crate::coord::{AttrValue, Coord};
use crate::error::{CubeError, CubeResult};
use crate::units::Units;

/// How a coordinate is attached to the cube's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordRole {
    /// Dimension coordinate describing `axis`.
    Dim(usize),
    /// Auxiliary coordinate spanning `axis`.
    Aux(usize),
    /// Single-point coordinate not tied to any axis.
    Scalar,
}

impl CoordRole {
    pub fn axis(&self) -> Option<usize> {
        match self {
            CoordRole::Dim(a) | CoordRole::Aux(a) => Some(*a),
            CoordRole::Scalar => None,
        }
    }

    fn shifted_after_removal(self, removed: usize) -> Self {
        match self {
            CoordRole::Dim(a) if a > removed => CoordRole::Dim(a - 1),
            CoordRole::Aux(a) if a > removed => CoordRole::Aux(a - 1),
            other => other,
        }
    }
}

/// Gridded data with its coordinates.
#[derive(Debug, Clone)]
pub struct Cube {
    pub name: String,
    pub var_name: Option<String>,
    pub units: Units,
    pub attributes: BTreeMap<String, AttrValue>,
    data: ArrayD<f32>,
    coords: Vec<(Coord, CoordRole)>,
}

impl Cube {
    pub fn new(data: ArrayD<f32>) -> Self {
        Self {
            name: "unknown".to_string(),
            var_name: None,
            units: Units::default(),
            attributes: BTreeMap::new(),
            data,
            coords: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_units(mut self, units: impl Into<Units>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_dim_coord(mut self, coord: Coord, axis: usize) -> CubeResult<Self> {
        self.add_dim_coord(coord, axis)?;
        Ok(self)
    }

    pub fn with_aux_coord(mut self, coord: Coord, axis: Option<usize>) -> CubeResult<Self> {
        self.add_aux_coord(coord, axis)?;
        Ok(self)
    }

    /// Attach a dimension coordinate to `axis`, replacing none.
    pub fn add_dim_coord(&mut self, coord: Coord, axis: usize) -> CubeResult<()> {
        self.check_axis_length(&coord, axis)?;
        if self.dim_coord(axis).is_some() {
            return Err(CubeError::ShapeMismatch(format!(
                "axis {} already has a dimension coordinate",
                axis
            )));
        }
        self.coords.push((coord, CoordRole::Dim(axis)));
        Ok(())
    }

    /// Attach an auxiliary coordinate spanning `axis`, or a scalar one.
    pub fn add_aux_coord(&mut self, coord: Coord, axis: Option<usize>) -> CubeResult<()> {
        let role = match axis {
            Some(axis) => {
                self.check_axis_length(&coord, axis)?;
                CoordRole::Aux(axis)
            }
            None if coord.is_scalar() => CoordRole::Scalar,
            None => return Err(CubeError::NotScalar(coord.name().to_string())),
        };
        self.coords.push((coord, role));
        Ok(())
    }

    fn check_axis_length(&self, coord: &Coord, axis: usize) -> CubeResult<()> {
        let len = *self.data.shape().get(axis).ok_or(CubeError::AxisOutOfRange {
            axis,
            ndim: self.ndim(),
        })?;
        if coord.len() != len {
            return Err(CubeError::CoordinateLength {
                name: coord.name().to_string(),
                points: coord.len(),
                axis,
                len,
            });
        }
        Ok(())
    }

    pub fn data(&self) -> &ArrayD<f32> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f32> {
        self.data
    }

    /// Replace the data, which must keep the current shape.
    pub fn set_data(&mut self, data: ArrayD<f32>) -> CubeResult<()> {
        if data.shape() != self.data.shape() {
            return Err(CubeError::ShapeMismatch(format!(
                "expected {:?}, got {:?}",
                self.data.shape(),
                data.shape()
            )));
        }
        self.data = data;
        Ok(())
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }

    /// All coordinates with their roles, in insertion order.
    pub fn coord_entries(&self) -> impl Iterator<Item = &(Coord, CoordRole)> {
        self.coords.iter()
    }

    /// Coordinates matching `name`; empty when there are none.
    pub fn coords(&self, name: &str) -> Vec<&Coord> {
        self.coords
            .iter()
            .filter(|(c, _)| c.name() == name || c.var_name == name)
            .map(|(c, _)| c)
            .collect()
    }

    pub fn has_coord(&self, name: &str) -> bool {
        !self.coords(name).is_empty()
    }

    pub fn coord(&self, name: &str) -> CubeResult<&Coord> {
        self.entry(name).map(|(c, _)| c)
    }

    pub fn coord_mut(&mut self, name: &str) -> CubeResult<&mut Coord> {
        self.coords
            .iter_mut()
            .find(|(c, _)| c.name() == name || c.var_name == name)
            .map(|(c, _)| c)
            .ok_or_else(|| CubeError::CoordinateNotFound(name.to_string()))
    }

    pub fn coord_role(&self, name: &str) -> CubeResult<CoordRole> {
        self.entry(name).map(|(_, r)| *r)
    }

    /// Data axes spanned by the named coordinate (empty for scalars).
    pub fn coord_dims(&self, name: &str) -> CubeResult<Vec<usize>> {
        Ok(self.coord_role(name)?.axis().into_iter().collect())
    }

    /// The dimension coordinate describing `axis`, if any.
    pub fn dim_coord(&self, axis: usize) -> Option<&Coord> {
        self.coords
            .iter()
            .find(|(_, r)| *r == CoordRole::Dim(axis))
            .map(|(c, _)| c)
    }

    fn entry(&self, name: &str) -> CubeResult<&(Coord, CoordRole)> {
        self.coords
            .iter()
            .find(|(c, _)| c.name() == name || c.var_name == name)
            .ok_or_else(|| CubeError::CoordinateNotFound(name.to_string()))
    }

    /// One cube per point of the named coordinate.
    ///
    /// When the coordinate spans an axis, that axis is dropped from each slice
    /// and every coordinate on it becomes scalar. A scalar coordinate yields a
    /// single copy of the cube.
    pub fn slices_over(&self, name: &str) -> CubeResult<Vec<Cube>> {
        let axis = match self.coord_role(name)?.axis() {
            Some(axis) => axis,
            None => return Ok(vec![self.clone()]),
        };

        let len = self.data.len_of(Axis(axis));
        debug!(coord = name, axis, slices = len, "Slicing cube");

        (0..len)
            .map(|i| {
                let data = self.data.index_axis(Axis(axis), i).to_owned();
                let mut coords = Vec::with_capacity(self.coords.len());
                for (coord, role) in &self.coords {
                    if role.axis() == Some(axis) {
                        let point = coord
                            .slice(i)
                            .ok_or_else(|| CubeError::CoordinateNotFound(coord.name().to_string()))?;
                        coords.push((point, CoordRole::Scalar));
                    } else {
                        coords.push((coord.clone(), role.shifted_after_removal(axis)));
                    }
                }
                Ok(Cube {
                    name: self.name.clone(),
                    var_name: self.var_name.clone(),
                    units: self.units.clone(),
                    attributes: self.attributes.clone(),
                    data,
                    coords,
                })
            })
            .collect()
    }

    /// Inverse of [`Cube::slices_over`]: rebuild this cube from processed slices.
    ///
    /// The slices supply the data only; metadata is kept from `self`.
    pub fn merge_slices(&self, name: &str, slices: &[Cube]) -> CubeResult<Cube> {
        let axis = match self.coord_role(name)?.axis() {
            Some(axis) => axis,
            None => {
                let [single] = slices else {
                    return Err(CubeError::Concatenate(format!(
                        "expected 1 slice over scalar '{}', got {}",
                        name,
                        slices.len()
                    )));
                };
                let mut out = self.clone();
                out.set_data(single.data.clone())?;
                return Ok(out);
            }
        };

        let expected = self.data.len_of(Axis(axis));
        if slices.len() != expected {
            return Err(CubeError::Concatenate(format!(
                "expected {} slices over '{}', got {}",
                expected,
                name,
                slices.len()
            )));
        }

        let views: Vec<ArrayViewD<f32>> = slices.iter().map(|s| s.data.view()).collect();
        let stacked = ndarray::stack(Axis(axis), &views)?;

        let mut out = self.clone();
        out.set_data(stacked)?;
        Ok(out)
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / ({})", self.name, self.units)?;
        let dims: Vec<String> = self
            .shape()
            .iter()
            .enumerate()
            .map(|(axis, len)| {
                let label = self.dim_coord(axis).map(|c| c.name()).unwrap_or("-- ");
                format!("{}: {}", label, len)
            })
            .collect();
        write!(f, " ({})", dims.join("; "))?;

        let scalars: Vec<String> = self
            .coords
            .iter()
            .filter(|(_, r)| *r == CoordRole::Scalar)
            .map(|(c, _)| format!("{}={}", c.name(), c.points[0]))
            .collect();
        if !scalars.is_empty() {
            write!(f, " [{}]", scalars.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    fn time_yx_cube() -> Cube {
        let data = Array::from_shape_fn(IxDyn(&[3, 2, 4]), |ix| {
            (ix[0] * 100 + ix[1] * 10 + ix[2]) as f32
        });
        Cube::new(data)
            .with_name("probability_of_rain")
            .with_dim_coord(
                Coord::new("time", vec![1.0, 2.0, 3.0], "hours since 1970-01-01 00:00:00"),
                0,
            )
            .unwrap()
            .with_aux_coord(Coord::new("forecast_period", vec![1.0, 2.0, 3.0], "hours"), Some(0))
            .unwrap()
            .with_dim_coord(Coord::new("projection_y_coordinate", vec![0.0, 2000.0], "m"), 1)
            .unwrap()
            .with_dim_coord(
                Coord::new("projection_x_coordinate", vec![0.0, 2000.0, 4000.0, 6000.0], "m"),
                2,
            )
            .unwrap()
            .with_aux_coord(
                Coord::scalar("forecast_reference_time", 0.0, "hours since 1970-01-01 00:00:00"),
                None,
            )
            .unwrap()
    }

    #[test]
    fn test_coord_lookup_and_dims() {
        let cube = time_yx_cube();
        assert_eq!(cube.coord_dims("projection_x_coordinate").unwrap(), vec![2]);
        assert_eq!(cube.coord_dims("forecast_period").unwrap(), vec![0]);
        assert!(cube.coord_dims("forecast_reference_time").unwrap().is_empty());
        assert!(cube.coords("realization").is_empty());
        assert!(matches!(
            cube.coord("realization"),
            Err(CubeError::CoordinateNotFound(_))
        ));
    }

    #[test]
    fn test_coord_length_checked() {
        let err = Cube::new(ArrayD::zeros(IxDyn(&[2, 3])))
            .with_dim_coord(Coord::new("projection_x_coordinate", vec![0.0, 1.0], "m"), 1)
            .unwrap_err();
        assert!(matches!(err, CubeError::CoordinateLength { len: 3, .. }));

        let err = Cube::new(ArrayD::zeros(IxDyn(&[2, 3])))
            .with_aux_coord(Coord::new("time", vec![0.0, 1.0], "hours"), None)
            .unwrap_err();
        assert!(matches!(err, CubeError::NotScalar(_)));
    }

    #[test]
    fn test_slices_over_dimension() {
        let cube = time_yx_cube();
        let slices = cube.slices_over("time").unwrap();
        assert_eq!(slices.len(), 3);

        let second = &slices[1];
        assert_eq!(second.shape(), &[2, 4]);
        assert_eq!(second.data()[[1, 3]], 113.0);
        assert_eq!(second.coord_role("time").unwrap(), CoordRole::Scalar);
        assert_eq!(second.coord("forecast_period").unwrap().points, vec![2.0]);
        assert_eq!(second.coord_dims("projection_x_coordinate").unwrap(), vec![1]);
    }

    #[test]
    fn test_slices_over_scalar() {
        let cube = time_yx_cube();
        let slices = cube.slices_over("forecast_reference_time").unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].shape(), cube.shape());
    }

    #[test]
    fn test_merge_slices_restores_cube() {
        let cube = time_yx_cube();
        let mut slices = cube.slices_over("time").unwrap();
        for s in &mut slices {
            let doubled = s.data().mapv(|v| v * 2.0);
            s.set_data(doubled).unwrap();
        }
        let merged = cube.merge_slices("time", &slices).unwrap();
        assert_eq!(merged.shape(), cube.shape());
        assert_eq!(merged.data()[[2, 1, 3]], 2.0 * 213.0);
        assert_eq!(merged.coord_dims("time").unwrap(), vec![0]);

        let err = cube.merge_slices("time", &slices[..2]).unwrap_err();
        assert!(matches!(err, CubeError::Concatenate(_)));
    }

    #[test]
    fn test_set_data_shape_checked() {
        let mut cube = time_yx_cube();
        assert!(cube.set_data(ArrayD::zeros(IxDyn(&[2, 4]))).is_err());
    }

    #[test]
    fn test_has_nan() {
        let mut cube = time_yx_cube();
        assert!(!cube.has_nan());
        let mut data = cube.data().clone();
        data[[0, 0, 0]] = f32::NAN;
        cube.set_data(data).unwrap();
        assert!(cube.has_nan());
    }

    #[test]
    fn test_display_summary() {
        let summary = time_yx_cube().to_string();
        assert!(summary.starts_with("probability_of_rain / (1)"));
        assert!(summary.contains("time: 3"));
        assert!(summary.contains("forecast_reference_time=0"));
    }
}
