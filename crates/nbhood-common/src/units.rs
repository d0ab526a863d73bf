//! Unit strings as found on CF coordinate variables.
//!
//! Only the families needed by neighbourhood processing are understood:
//! lengths (projection coordinates), periods (forecast periods) and
//! epoch-based times (`"<period> since <datetime>"`). Anything else is kept
//! verbatim and only converts to an identical string.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{CubeError, CubeResult};
use crate::time::parse_reference_time;

/// The physical family a unit string belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitKind {
    /// Length, stored as metres per unit.
    Length(f64),
    /// Time period, stored as seconds per unit.
    Period(f64),
    /// Time relative to an origin.
    Epoch { seconds: f64, origin: DateTime<Utc> },
    Dimensionless,
    Other,
}

/// A parsed unit, keeping the original spelling for output.
#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    symbol: String,
    kind: UnitKind,
}

/// Linear map `to = from * scale + offset` between two compatible units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub scale: f64,
    pub offset: f64,
}

impl Conversion {
    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }
}

fn length_factor(s: &str) -> Option<f64> {
    match s {
        "m" | "metre" | "metres" | "meter" | "meters" => Some(1.0),
        "km" | "kilometre" | "kilometres" | "kilometer" | "kilometers" => Some(1000.0),
        "cm" | "centimetre" | "centimetres" => Some(0.01),
        _ => None,
    }
}

fn period_factor(s: &str) -> Option<f64> {
    match s {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1.0),
        "min" | "mins" | "minute" | "minutes" => Some(60.0),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3600.0),
        "d" | "day" | "days" => Some(86_400.0),
        _ => None,
    }
}

impl Units {
    /// Parse a unit string. Unknown strings are kept as [`UnitKind::Other`].
    pub fn parse(symbol: &str) -> Self {
        let trimmed = symbol.trim();
        let lower = trimmed.to_ascii_lowercase();

        let kind = if lower.is_empty() || lower == "1" {
            UnitKind::Dimensionless
        } else if let Some(m) = length_factor(&lower) {
            UnitKind::Length(m)
        } else if let Some(s) = period_factor(&lower) {
            UnitKind::Period(s)
        } else if let Some(idx) = lower.find(" since ") {
            // Lowercasing is ASCII-only, so byte offsets line up with `trimmed`.
            let unit = lower[..idx].trim();
            let origin = &trimmed[idx + " since ".len()..];
            match (period_factor(unit), parse_reference_time(origin)) {
                (Some(seconds), Some(origin)) => UnitKind::Epoch { seconds, origin },
                _ => UnitKind::Other,
            }
        } else {
            UnitKind::Other
        };

        Self {
            symbol: trimmed.to_string(),
            kind,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    pub fn is_time_reference(&self) -> bool {
        matches!(self.kind, UnitKind::Epoch { .. })
    }

    /// Conversion from `self` into `target`.
    pub fn conversion_to(&self, target: &Units) -> CubeResult<Conversion> {
        let scale_only = |scale: f64| Conversion { scale, offset: 0.0 };

        match (&self.kind, &target.kind) {
            (UnitKind::Length(a), UnitKind::Length(b)) => Ok(scale_only(a / b)),
            (UnitKind::Period(a), UnitKind::Period(b)) => Ok(scale_only(a / b)),
            (
                UnitKind::Epoch { seconds: a, origin: oa },
                UnitKind::Epoch { seconds: b, origin: ob },
            ) => {
                let shift = (*oa - *ob).num_milliseconds() as f64 / 1000.0;
                Ok(Conversion {
                    scale: a / b,
                    offset: shift / b,
                })
            }
            (UnitKind::Dimensionless, UnitKind::Dimensionless) => Ok(scale_only(1.0)),
            (UnitKind::Other, UnitKind::Other) if self.symbol == target.symbol => {
                Ok(scale_only(1.0))
            }
            _ => Err(CubeError::IncompatibleUnits {
                from: self.symbol.clone(),
                to: target.symbol.clone(),
            }),
        }
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::parse("1")
    }
}

impl From<&str> for Units {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for Units {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Units> for String {
    fn from(u: Units) -> Self {
        u.symbol
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversion() {
        let conv = Units::parse("km").conversion_to(&Units::parse("metres")).unwrap();
        assert_eq!(conv.apply(2.5), 2500.0);
        assert!(Units::parse("m").conversion_to(&Units::parse("m")).unwrap().is_identity());
    }

    #[test]
    fn test_period_conversion() {
        let conv = Units::parse("seconds").conversion_to(&Units::parse("hours")).unwrap();
        assert_eq!(conv.apply(10_800.0), 3.0);
    }

    #[test]
    fn test_epoch_conversion_shifts_origin() {
        let from = Units::parse("seconds since 1970-01-01 01:00:00");
        let to = Units::parse("hours since 1970-01-01 00:00:00");
        let conv = from.conversion_to(&to).unwrap();
        assert_eq!(conv.apply(7200.0), 3.0);
    }

    #[test]
    fn test_incompatible_units() {
        let err = Units::parse("m").conversion_to(&Units::parse("hours")).unwrap_err();
        assert!(matches!(err, CubeError::IncompatibleUnits { .. }));

        let err = Units::parse("hours")
            .conversion_to(&Units::parse("hours since 1970-01-01 00:00:00"))
            .unwrap_err();
        assert!(err.to_string().contains("Unable to convert"));
    }

    #[test]
    fn test_unknown_units_are_kept() {
        let u = Units::parse("K");
        assert_eq!(u.kind(), &UnitKind::Other);
        assert_eq!(u.to_string(), "K");
        assert!(u.conversion_to(&Units::parse("K")).is_ok());
        assert!(u.conversion_to(&Units::parse("degC")).is_err());
    }

    #[test]
    fn test_malformed_epoch_is_other() {
        assert_eq!(Units::parse("hours since the dawn of time").kind(), &UnitKind::Other);
    }
}
