//! Kernel radii, fixed or varying with forecast lead time.

use std::fmt;

use crate::error::{NbhoodError, Result};

/// Radii as supplied by the caller, in kilometres.
#[derive(Debug, Clone, PartialEq)]
pub enum Radii {
    Single(f64),
    ByLeadTime(Vec<f64>),
}

impl Radii {
    pub fn len(&self) -> usize {
        match self {
            Radii::Single(_) => 1,
            Radii::ByLeadTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<f64> for Radii {
    fn from(r: f64) -> Self {
        Radii::Single(r)
    }
}

impl From<Vec<f64>> for Radii {
    fn from(v: Vec<f64>) -> Self {
        match v.as_slice() {
            [single] => Radii::Single(*single),
            _ => Radii::ByLeadTime(v),
        }
    }
}

impl fmt::Display for Radii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radii::Single(r) => write!(f, "{}", r),
            Radii::ByLeadTime(v) => {
                let parts: Vec<String> = v.iter().map(|r| r.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Resolved radius lookup used by the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum RadiusLookup {
    /// One radius for every lead time.
    Fixed(f64),
    /// Radii tabulated at lead times (hours), sorted by lead time.
    ByLeadTime { lead_times: Vec<f64>, radii: Vec<f64> },
}

impl RadiusLookup {
    /// Pair radii with optional lead times.
    pub fn new(radii: Radii, lead_times: Option<Vec<f64>>) -> Result<Self> {
        let radii = match radii {
            Radii::Single(r) => vec![r],
            Radii::ByLeadTime(v) => v,
        };

        match lead_times {
            None => match radii.as_slice() {
                [r] => Ok(RadiusLookup::Fixed(*r)),
                _ => Err(NbhoodError::RadiiLeadTimeMismatch),
            },
            Some(lead_times) => {
                if lead_times.len() != radii.len() || radii.is_empty() {
                    return Err(NbhoodError::RadiiLeadTimeMismatch);
                }
                let mut pairs: Vec<(f64, f64)> = lead_times.into_iter().zip(radii).collect();
                pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
                let (lead_times, radii) = pairs.into_iter().unzip();
                Ok(RadiusLookup::ByLeadTime { lead_times, radii })
            }
        }
    }

    pub fn varies_with_lead_time(&self) -> bool {
        matches!(self, RadiusLookup::ByLeadTime { .. })
    }

    /// Radius in km at `lead_time` hours.
    pub fn radius_at(&self, lead_time: f64) -> f64 {
        match self {
            RadiusLookup::Fixed(r) => *r,
            RadiusLookup::ByLeadTime { lead_times, radii } => interp(lead_time, lead_times, radii),
        }
    }
}

/// Piecewise linear interpolation over sorted `xp`, clamped to the end values.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return f64::NAN;
    };
    if x <= first {
        return fp[0];
    }
    if x >= last {
        return fp[fp.len() - 1];
    }

    let i = xp.partition_point(|&v| v <= x).saturating_sub(1);
    let (x0, x1) = (xp[i], xp[i + 1]);
    let (y0, y1) = (fp[i], fp[i + 1]);
    if x1 == x0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interp_inside_and_clamped() {
        let xp = [2.0, 3.0, 4.0];
        let fp = [2.0, 4.0, 6.0];
        assert_eq!(interp(2.5, &xp, &fp), 3.0);
        assert_eq!(interp(3.0, &xp, &fp), 4.0);
        assert_eq!(interp(3.75, &xp, &fp), 5.5);
        assert_eq!(interp(0.0, &xp, &fp), 2.0);
        assert_eq!(interp(10.0, &xp, &fp), 6.0);
    }

    #[test]
    fn test_interp_single_point() {
        assert_eq!(interp(1.0, &[3.0], &[4.0]), 4.0);
        assert_eq!(interp(5.0, &[3.0], &[4.0]), 4.0);
    }

    #[test]
    fn test_lookup_requires_matching_lengths() {
        let err = RadiusLookup::new(Radii::ByLeadTime(vec![2.0, 4.0]), Some(vec![1.0]));
        assert!(matches!(err, Err(NbhoodError::RadiiLeadTimeMismatch)));

        let err = RadiusLookup::new(Radii::ByLeadTime(vec![2.0, 4.0]), None);
        assert!(matches!(err, Err(NbhoodError::RadiiLeadTimeMismatch)));

        let err = RadiusLookup::new(Radii::Single(2.0), Some(vec![1.0, 2.0]));
        assert!(matches!(err, Err(NbhoodError::RadiiLeadTimeMismatch)));
    }

    #[test]
    fn test_lookup_sorts_by_lead_time() {
        let lookup = RadiusLookup::new(
            Radii::ByLeadTime(vec![6.0, 2.0, 4.0]),
            Some(vec![4.0, 2.0, 3.0]),
        )
        .unwrap();
        assert_eq!(
            lookup,
            RadiusLookup::ByLeadTime {
                lead_times: vec![2.0, 3.0, 4.0],
                radii: vec![2.0, 4.0, 6.0],
            }
        );
        assert_eq!(lookup.radius_at(2.5), 3.0);
    }

    #[test]
    fn test_fixed_spec_ignores_lead_time() {
        let lookup = RadiusLookup::new(Radii::Single(6.0), None).unwrap();
        assert!(!lookup.varies_with_lead_time());
        assert_eq!(lookup.radius_at(48.0), 6.0);
    }

    #[test]
    fn test_radii_display() {
        assert_eq!(Radii::Single(6.5).to_string(), "6.5");
        assert_eq!(Radii::from(vec![2.0, 4.5]).to_string(), "[2, 4.5]");
        assert_eq!(Radii::from(vec![3.0]), Radii::Single(3.0));
    }
}
