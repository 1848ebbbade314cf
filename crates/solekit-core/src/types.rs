//! Clinical domain types validated at the boundary.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// EU shoe size, guaranteed to lie in the supported clinical domain.
///
/// Construction is the only place a size is validated; the size model and
/// the rotation-fit solver accept `ShoeSize` and therefore never see an
/// invalid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ShoeSize(i32);

impl ShoeSize {
    /// Smallest supported size.
    pub const MIN: i32 = 32;
    /// Largest supported size.
    pub const MAX: i32 = 50;

    pub fn new(value: i32) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::ShoeSizeOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    /// Parses textual input such as `"42"` or `" 42.0 "`.
    ///
    /// Fractional sizes are rejected: the clinical unit is an integer.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let not_numeric = || ValidationError::ShoeSizeNotNumeric {
            input: input.to_string(),
        };
        if let Ok(v) = trimmed.parse::<i32>() {
            return Self::new(v);
        }
        let v = trimmed.parse::<f64>().map_err(|_| not_numeric())?;
        if !v.is_finite() || v.fract() != 0.0 {
            return Err(not_numeric());
        }
        Self::new(v as i32)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// Zero-based index within the supported domain.
    pub fn index(&self) -> usize {
        (self.0 - Self::MIN) as usize
    }

    /// Every supported size in ascending order.
    pub fn all() -> impl Iterator<Item = ShoeSize> {
        (Self::MIN..=Self::MAX).map(ShoeSize)
    }
}

impl Default for ShoeSize {
    fn default() -> Self {
        Self(41)
    }
}

impl TryFrom<i32> for ShoeSize {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShoeSize> for i32 {
    fn from(size: ShoeSize) -> Self {
        size.0
    }
}

impl FromStr for ShoeSize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ShoeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which foot an insole is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootSide {
    Left,
    Right,
}

impl FootSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for FootSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FootSide {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            "" => Err(ValidationError::MissingFootSide),
            _ => Err(ValidationError::UnknownFootSide {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shoe_size_domain() {
        assert!(ShoeSize::new(31).is_err());
        assert_eq!(ShoeSize::new(32).map(|s| s.index()), Ok(0));
        assert_eq!(ShoeSize::new(50).map(|s| s.index()), Ok(18));
        assert!(ShoeSize::new(51).is_err());
        assert_eq!(ShoeSize::all().count(), 19);
    }

    #[test]
    fn test_shoe_size_parse() {
        assert_eq!(ShoeSize::parse(" 42 ").map(|s| s.value()), Ok(42));
        assert_eq!(ShoeSize::parse("43.0").map(|s| s.value()), Ok(43));
        assert!(matches!(
            ShoeSize::parse("42.5"),
            Err(ValidationError::ShoeSizeNotNumeric { .. })
        ));
        assert!(matches!(
            ShoeSize::parse("big"),
            Err(ValidationError::ShoeSizeNotNumeric { .. })
        ));
        assert!(matches!(
            ShoeSize::parse("12"),
            Err(ValidationError::ShoeSizeOutOfRange { value: 12, .. })
        ));
    }

    #[test]
    fn test_shoe_size_serde_rejects_out_of_range() {
        let ok: ShoeSize = serde_json::from_str("44").expect("valid size");
        assert_eq!(ok.value(), 44);
        assert!(serde_json::from_str::<ShoeSize>("99").is_err());
    }

    #[test]
    fn test_foot_side_parse() {
        assert_eq!("Left".parse::<FootSide>(), Ok(FootSide::Left));
        assert_eq!("r".parse::<FootSide>(), Ok(FootSide::Right));
        assert_eq!("".parse::<FootSide>(), Err(ValidationError::MissingFootSide));
        assert!("middle".parse::<FootSide>().is_err());
    }
}
