//! Distance resolution.
//!
//! Resolves distance strings such as `"3in"`, `".3in"`, `"1/2in"` or `"6"` to
//! millimetres. A bare number is taken as millimetres.

use crate::error::{CoreError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

static DISTANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?[0-9]*(?:\.[0-9]*)?)(?:\s*/\s*([0-9]*(?:\.[0-9]*)?))?\s*([A-Za-z]+)?\s*$")
        .expect("invalid distance regex")
});

/// Millimetres in `value` inches.
pub fn mm_from_inch(value: f64) -> f64 {
    value * 25.4
}

/// Length units accepted by the distance resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Inch,
    Pixel,
    /// Quarter-millimetre.
    Q,
    Pica,
    Point,
}

impl LengthUnit {
    /// Millimetres per unit.
    pub fn factor(&self) -> f64 {
        match self {
            LengthUnit::Millimeter => 1.0,
            LengthUnit::Centimeter => 10.0,
            LengthUnit::Inch => 25.4,
            LengthUnit::Pixel => 25.4 / 96.0,
            LengthUnit::Q => 0.25,
            LengthUnit::Pica => 25.4 / 6.0,
            LengthUnit::Point => 25.4 / 72.0,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mm" => Ok(LengthUnit::Millimeter),
            "cm" => Ok(LengthUnit::Centimeter),
            "in" => Ok(LengthUnit::Inch),
            "px" => Ok(LengthUnit::Pixel),
            "Q" => Ok(LengthUnit::Q),
            "pc" => Ok(LengthUnit::Pica),
            "pt" => Ok(LengthUnit::Point),
            other => Err(CoreError::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Inch => "in",
            LengthUnit::Pixel => "px",
            LengthUnit::Q => "Q",
            LengthUnit::Pica => "pc",
            LengthUnit::Point => "pt",
        };
        f.write_str(s)
    }
}

fn parse_number(text: &str, input: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| CoreError::InvalidDistance(input.to_string()))
}

/// Parses a distance string into millimetres.
pub fn parse_distance(input: &str) -> Result<f64> {
    let caps = DISTANCE_RE
        .captures(input)
        .ok_or_else(|| CoreError::InvalidDistance(input.to_string()))?;

    let numerator = parse_number(&caps[1], input)?;
    let denominator = match caps.get(2) {
        Some(m) => parse_number(m.as_str(), input)?,
        None => 1.0,
    };
    if denominator == 0.0 {
        return Err(CoreError::InvalidDistance(input.to_string()));
    }
    let unit = match caps.get(3) {
        Some(m) => m.as_str().parse::<LengthUnit>()?,
        None => LengthUnit::Millimeter,
    };

    Ok(numerator / denominator * unit.factor())
}

/// Resolves an optional distance, falling back to `default` when the value
/// is absent or cannot be parsed.
pub fn resolve_distance(value: Option<&str>, default: f64) -> f64 {
    match value {
        None => default,
        Some(text) => match parse_distance(text) {
            Ok(mm) => {
                tracing::debug!("distance: {:?} -> {}mm", text, mm);
                mm
            }
            Err(err) => {
                tracing::warn!("{}; using default {}mm", err, default);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_distance_pattern_compiles() {
        let caps = DISTANCE_RE.captures("1/4in").expect("pattern matches");
        assert_eq!(caps.get(1).map(|m| m.as_str()), Some("1"));
        assert_eq!(caps.get(2).map(|m| m.as_str()), Some("4"));
        assert_eq!(caps.get(3).map(|m| m.as_str()), Some("in"));
    }

    #[test]
    fn test_bare_number_is_millimetres() {
        assert!(close(parse_distance("6").expect("parse"), 6.0));
        assert!(close(parse_distance("2.5").expect("parse"), 2.5));
    }

    #[test]
    fn test_inches() {
        assert!(close(parse_distance("3in").expect("parse"), 76.2));
        assert!(close(parse_distance(".3in").expect("parse"), 7.62));
        assert!(close(parse_distance("1/2in").expect("parse"), 12.7));
    }

    #[test]
    fn test_other_units() {
        assert!(close(parse_distance("96px").expect("parse"), 25.4));
        assert!(close(parse_distance("72pt").expect("parse"), 25.4));
        assert!(close(parse_distance("6pc").expect("parse"), 25.4));
        assert!(close(parse_distance("2cm").expect("parse"), 20.0));
        assert!(close(parse_distance("4Q").expect("parse"), 1.0));
        assert!(close(parse_distance("3 mm").expect("parse"), 3.0));
    }

    #[test]
    fn test_invalid_distances() {
        assert!(matches!(
            parse_distance("abc"),
            Err(CoreError::InvalidDistance(_))
        ));
        assert!(matches!(
            parse_distance(""),
            Err(CoreError::InvalidDistance(_))
        ));
        assert!(matches!(
            parse_distance("1/0in"),
            Err(CoreError::InvalidDistance(_))
        ));
        assert!(matches!(
            parse_distance("3ft"),
            Err(CoreError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_resolve_distance_defaults() {
        assert_eq!(resolve_distance(None, 4.0), 4.0);
        assert_eq!(resolve_distance(Some("junk!"), 4.0), 4.0);
        assert!(close(resolve_distance(Some("1in"), 4.0), 25.4));
    }
}
