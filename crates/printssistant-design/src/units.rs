//! Physical-unit to pixel conversion.

use std::str::FromStr;

use crate::error::DesignError;

/// Print resolution used when converting physical sizes.
pub const PIXELS_PER_INCH: f64 = 300.0;

/// Unit a design dimension is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Px,
    In,
}

impl Unit {
    /// Convert `value` in this unit to whole pixels.
    pub fn to_pixels(self, value: f64) -> Result<u32, DesignError> {
        let pixels = match self {
            Unit::Px => value,
            Unit::In => value * PIXELS_PER_INCH,
        }
        .round();

        if !pixels.is_finite() || pixels < 1.0 || pixels > f64::from(u32::MAX) {
            return Err(DesignError::InvalidRequest(format!(
                "dimension {} {} is out of range",
                value,
                self.as_str()
            )));
        }
        Ok(pixels as u32)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::In => "in",
        }
    }
}

impl FromStr for Unit {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "px" | "pixel" | "pixels" => Ok(Unit::Px),
            "in" | "inch" | "inches" | "\"" => Ok(Unit::In),
            other => Err(DesignError::InvalidRequest(format!(
                "unsupported unit '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_size_at_300_ppi() {
        assert_eq!(Unit::In.to_pixels(8.5).unwrap(), 2550);
        assert_eq!(Unit::In.to_pixels(11.0).unwrap(), 3300);
    }

    #[test]
    fn test_pixels_round() {
        assert_eq!(Unit::Px.to_pixels(1200.0).unwrap(), 1200);
        assert_eq!(Unit::Px.to_pixels(599.6).unwrap(), 600);
    }

    #[test]
    fn test_out_of_range() {
        assert!(Unit::Px.to_pixels(0.0).is_err());
        assert!(Unit::Px.to_pixels(-5.0).is_err());
        assert!(Unit::In.to_pixels(f64::NAN).is_err());
        assert!(Unit::Px.to_pixels(1e12).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!("IN".parse::<Unit>().unwrap(), Unit::In);
        assert_eq!("inches".parse::<Unit>().unwrap(), Unit::In);
        assert_eq!("px".parse::<Unit>().unwrap(), Unit::Px);
        assert!("cm".parse::<Unit>().is_err());
    }
}
