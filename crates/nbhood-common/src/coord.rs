//! Coordinates attached to cube dimensions.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CubeError, CubeResult};
use crate::units::Units;

/// A metadata attribute value carried by cubes and coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Number(f64),
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Number(v) => write!(f, "{}", v),
        }
    }
}

/// A one-dimensional coordinate: named points with units and optional bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Coord {
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub var_name: String,
    pub units: Units,
    pub points: Vec<f64>,
    pub bounds: Option<Vec<[f64; 2]>>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Coord {
    /// Create a coordinate whose variable name and standard name are `name`.
    pub fn new(name: &str, points: Vec<f64>, units: impl Into<Units>) -> Self {
        Self {
            standard_name: Some(name.to_string()),
            long_name: None,
            var_name: name.to_string(),
            units: units.into(),
            points,
            bounds: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a single-point coordinate.
    pub fn scalar(name: &str, point: f64, units: impl Into<Units>) -> Self {
        Self::new(name, vec![point], units)
    }

    pub fn with_var_name(mut self, var_name: &str) -> Self {
        self.var_name = var_name.to_string();
        self
    }

    pub fn with_bounds(mut self, bounds: Vec<[f64; 2]>) -> CubeResult<Self> {
        if bounds.len() != self.points.len() {
            return Err(CubeError::ShapeMismatch(format!(
                "coordinate '{}' has {} points but {} bounds",
                self.name(),
                self.points.len(),
                bounds.len()
            )));
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    /// Identifying name: standard name, else long name, else variable name.
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(&self.var_name)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        self.points.len() == 1
    }

    /// Convert points and bounds to `target` in place.
    pub fn convert_units(&mut self, target: impl Into<Units>) -> CubeResult<()> {
        let target = target.into();
        let conv = self.units.conversion_to(&target)?;
        if !conv.is_identity() {
            for p in &mut self.points {
                *p = conv.apply(*p);
            }
            if let Some(bounds) = &mut self.bounds {
                for b in bounds.iter_mut() {
                    *b = [conv.apply(b[0]), conv.apply(b[1])];
                }
            }
        }
        self.units = target;
        Ok(())
    }

    /// A converted copy, leaving `self` untouched.
    pub fn converted(&self, target: impl Into<Units>) -> CubeResult<Coord> {
        let mut copy = self.clone();
        copy.convert_units(target)?;
        Ok(copy)
    }

    /// Single-point coordinate taken at `index`.
    pub fn slice(&self, index: usize) -> Option<Coord> {
        let point = *self.points.get(index)?;
        Some(Coord {
            points: vec![point],
            bounds: self
                .bounds
                .as_ref()
                .and_then(|b| b.get(index).copied())
                .map(|b| vec![b]),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_resolution() {
        let mut c = Coord::new("projection_x_coordinate", vec![0.0, 2000.0], "m");
        assert_eq!(c.name(), "projection_x_coordinate");

        c.standard_name = None;
        c.var_name = "x".to_string();
        assert_eq!(c.name(), "x");

        c.long_name = Some("easting".to_string());
        assert_eq!(c.name(), "easting");
    }

    #[test]
    fn test_convert_units_scales_points_and_bounds() {
        let mut c = Coord::new("forecast_period", vec![3600.0, 7200.0], "seconds")
            .with_bounds(vec![[0.0, 3600.0], [3600.0, 7200.0]])
            .unwrap();
        c.convert_units("hours").unwrap();
        assert_eq!(c.points, vec![1.0, 2.0]);
        assert_eq!(c.bounds.unwrap()[1], [1.0, 2.0]);
        assert_eq!(c.units.symbol(), "hours");
    }

    #[test]
    fn test_converted_leaves_original() {
        let c = Coord::new("projection_y_coordinate", vec![0.0, 2.0], "km");
        let m = c.converted("metres").unwrap();
        assert_eq!(m.points, vec![0.0, 2000.0]);
        assert_eq!(c.points, vec![0.0, 2.0]);
    }

    #[test]
    fn test_failed_conversion_keeps_units() {
        let mut c = Coord::new("forecast_period", vec![1.0], "m");
        assert!(c.convert_units("hours").is_err());
        assert_eq!(c.units.symbol(), "m");
    }

    #[test]
    fn test_slice() {
        let c = Coord::new("time", vec![10.0, 11.0, 12.0], "hours since 1970-01-01 00:00:00");
        let s = c.slice(1).unwrap();
        assert!(s.is_scalar());
        assert_eq!(s.points, vec![11.0]);
        assert!(c.slice(3).is_none());
    }

    #[test]
    fn test_bounds_length_checked() {
        let err = Coord::new("time", vec![1.0, 2.0], "hours")
            .with_bounds(vec![[0.0, 1.0]])
            .unwrap_err();
        assert!(matches!(err, CubeError::ShapeMismatch(_)));
    }
}
