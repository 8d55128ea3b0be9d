//! Fixed-point numbers for catalog tuning values.
//!
//! Speeds, fuel burn, labor and craft times are stored as fixed-point so a
//! catalog built on one machine compares bit-for-bit with one built on
//! another. Data files carry plain decimals; they are converted once at load.

use fixed::types::I32F32;

/// Fixed-point number type for all tuning values.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
pub type Fixed = I32F32;

/// Convert a decimal from a data file into [`Fixed`].
///
/// Returns `None` for NaN, infinities and values outside the fixed range.
#[must_use]
pub fn decimal_to_fixed(value: f64) -> Option<Fixed> {
    if !value.is_finite() {
        return None;
    }
    Fixed::checked_from_num(value)
}

/// Convert a [`Fixed`] back into a decimal for display.
#[must_use]
pub fn fixed_to_decimal(value: Fixed) -> f64 {
    value.to_num::<f64>()
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_to_fixed() {
        assert_eq!(decimal_to_fixed(1.5), Some(Fixed::from_num(1.5)));
        assert_eq!(decimal_to_fixed(0.0), Some(Fixed::ZERO));
        assert_eq!(decimal_to_fixed(-2.0), Some(Fixed::from_num(-2)));
    }

    #[test]
    fn test_decimal_to_fixed_rejects_non_finite() {
        assert_eq!(decimal_to_fixed(f64::NAN), None);
        assert_eq!(decimal_to_fixed(f64::INFINITY), None);
        assert_eq!(decimal_to_fixed(1e20), None);
    }

    #[test]
    fn test_fixed_determinism() {
        // Same operations must produce identical results
        let a = Fixed::from_num(1250) * Fixed::from_num(0.8);
        let b = Fixed::from_num(1250) * Fixed::from_num(0.8);
        assert_eq!(a, b);
        assert_eq!(fixed_to_decimal(Fixed::from_num(12)), 12.0);
    }
}
