//! Exact conversion between human decimal amounts and minimal units.
//!
//! Minimal units are always an integer decimal-digit string on the outside
//! and an exact `u128` on the inside. Every amount field of the transaction
//! wire format is a `u128`, so values beyond that width are rejected as
//! [`AmountError::Overflow`] rather than rounded.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AmountError;

// ============================================================================
// MinimalUnits
// ============================================================================

/// A non-negative integer amount in a token's smallest unit.
///
/// ```
/// use near_commit::MinimalUnits;
///
/// let amount: MinimalUnits = "1000000000000000000000000".parse().unwrap();
/// assert_eq!(amount.as_u128(), 10u128.pow(24));
///
/// // Minimal units never carry a fractional part.
/// assert!("1.5".parse::<MinimalUnits>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MinimalUnits(u128);

impl MinimalUnits {
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl FromStr for MinimalUnits {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('.') {
            return Err(AmountError::DecimalPoint(s.to_string()));
        }
        if s.contains(['-', '+']) {
            return Err(AmountError::MalformedSign(s.to_string()));
        }
        parse_digits(s)
    }
}

impl Display for MinimalUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for MinimalUnits {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl Serialize for MinimalUnits {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for MinimalUnits {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a non-empty run of ASCII digits.
fn parse_digits(s: &str) -> Result<MinimalUnits, AmountError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidNumber(s.to_string()));
    }
    s.parse::<u128>()
        .map(MinimalUnits)
        .map_err(|_| AmountError::Overflow)
}

fn pow10(exp: u32) -> Result<u128, AmountError> {
    10u128.checked_pow(exp).ok_or(AmountError::Overflow)
}

// ============================================================================
// AmountConverter
// ============================================================================

/// Converts between decimal amounts and [`MinimalUnits`] for one token.
///
/// - `scale_decimals`: the token's decimals (24 for NEAR)
/// - `max_input_decimals`: decimal inputs are rounded to this many
///   fractional digits before scaling
/// - `display_decimals`: decimal outputs are truncated to this many
///   fractional digits
///
/// ```
/// use near_commit::AmountConverter;
///
/// let near = AmountConverter::NEAR;
/// assert_eq!(near.to_minimal_units(1.0).unwrap().to_string(), format!("1{}", "0".repeat(24)));
/// assert_eq!(near.to_decimal("500000000000000000000000").unwrap(), 0.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountConverter {
    pub scale_decimals: u32,
    pub max_input_decimals: u32,
    pub display_decimals: u32,
}

impl AmountConverter {
    /// NEAR: 24 decimals, inputs rounded to 6, outputs truncated to 4.
    pub const NEAR: Self = Self {
        scale_decimals: 24,
        max_input_decimals: 6,
        display_decimals: 4,
    };

    /// A converter for a token with the given number of decimals, using the
    /// default input and display precision.
    pub const fn with_scale(scale_decimals: u32) -> Self {
        Self {
            scale_decimals,
            max_input_decimals: 6,
            display_decimals: 4,
        }
    }

    fn input_decimals(&self) -> u32 {
        self.max_input_decimals.min(self.scale_decimals)
    }

    /// Convert a floating-point amount to minimal units.
    ///
    /// The amount is rounded (half away from zero) to `max_input_decimals`
    /// fractional digits first; digits past that boundary are never trusted.
    pub fn to_minimal_units(&self, amount: f64) -> Result<MinimalUnits, AmountError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AmountError::NotRepresentable(amount));
        }
        let decimals = self.input_decimals();
        let rounded = (amount * 10f64.powi(decimals as i32)).round();
        if rounded >= u128::MAX as f64 {
            return Err(AmountError::Overflow);
        }
        (rounded as u128)
            .checked_mul(pow10(self.scale_decimals - decimals)?)
            .map(MinimalUnits)
            .ok_or(AmountError::Overflow)
    }

    /// Convert a decimal string (`"12"`, `"0.5"`, `"1.2345678"`) to minimal
    /// units without going through floating point.
    ///
    /// Applies the same `max_input_decimals` rounding boundary as
    /// [`to_minimal_units`](Self::to_minimal_units).
    pub fn decimal_to_minimal_units(&self, amount: &str) -> Result<MinimalUnits, AmountError> {
        let amount = amount.trim();
        if amount.contains(['-', '+']) {
            return Err(AmountError::MalformedSign(amount.to_string()));
        }

        let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::InvalidNumber(amount.to_string()));
        }
        for part in [int_part, frac_part] {
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountError::InvalidNumber(amount.to_string()));
            }
        }

        let decimals = self.input_decimals() as usize;
        let (kept, round_up) = if frac_part.len() > decimals {
            (&frac_part[..decimals], frac_part.as_bytes()[decimals] >= b'5')
        } else {
            (frac_part, false)
        };

        let int_value = if int_part.is_empty() {
            0
        } else {
            parse_digits(int_part)?.0
        };
        let frac_value = if kept.is_empty() {
            0
        } else {
            parse_digits(kept)?.0
        };
        let frac_value = frac_value
            .checked_mul(pow10((decimals - kept.len()) as u32)?)
            .ok_or(AmountError::Overflow)?;

        int_value
            .checked_mul(pow10(decimals as u32)?)
            .and_then(|v| v.checked_add(frac_value))
            .and_then(|v| v.checked_add(u128::from(round_up)))
            .and_then(|v| v.checked_mul(10u128.checked_pow(self.scale_decimals - decimals as u32)?))
            .map(MinimalUnits)
            .ok_or(AmountError::Overflow)
    }

    /// Render minimal units as a decimal string truncated (never rounded)
    /// to `display_decimals` fractional digits.
    ///
    /// Accepts one optional leading `-`; rejects a decimal point or any
    /// other sign.
    pub fn to_decimal_string(&self, minimal: &str) -> Result<String, AmountError> {
        if minimal.contains('.') {
            return Err(AmountError::DecimalPoint(minimal.to_string()));
        }
        let (negative, digits) = match minimal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, minimal),
        };
        if digits.contains(['-', '+']) || (negative && digits.is_empty()) {
            return Err(AmountError::MalformedSign(minimal.to_string()));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidNumber(minimal.to_string()));
        }

        let scale = self.scale_decimals as usize;
        let shown = self.display_decimals.min(self.scale_decimals) as usize;
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let split = padded.len() - scale;
        let int_part = &padded[..split];
        let sign = if negative { "-" } else { "" };

        if shown == 0 {
            Ok(format!("{}{}", sign, int_part))
        } else {
            let frac_part = &padded[split..split + shown];
            Ok(format!("{}{}.{}", sign, int_part, frac_part))
        }
    }

    /// Convert minimal units to a floating-point decimal, truncated to
    /// `display_decimals` fractional digits.
    pub fn to_decimal(&self, minimal: &str) -> Result<f64, AmountError> {
        let text = self.to_decimal_string(minimal)?;
        text.parse::<f64>()
            .map_err(|_| AmountError::InvalidNumber(minimal.to_string()))
    }
}

impl Default for AmountConverter {
    fn default() -> Self {
        Self::NEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yocto(near_digits: &str) -> String {
        format!("{}{}", near_digits, "0".repeat(24))
    }

    // ========================================================================
    // to_minimal_units tests
    // ========================================================================

    #[test]
    fn test_one_near() {
        let units = AmountConverter::NEAR.to_minimal_units(1.0).unwrap();
        assert_eq!(units.to_string(), yocto("1"));
    }

    #[test]
    fn test_input_rounded_to_six_decimals() {
        let near = AmountConverter::NEAR;
        // 8 fractional digits: rounded at the 6th before scaling
        let units = near.to_minimal_units(0.12345678).unwrap();
        assert_eq!(units.to_string(), format!("123457{}", "0".repeat(18)));

        let units = near.to_minimal_units(1.1).unwrap();
        assert_eq!(units.to_string(), format!("1100000{}", "0".repeat(18)));

        let units = near.to_minimal_units(0.0000004).unwrap();
        assert!(units.is_zero());
    }

    #[test]
    fn test_rejects_unrepresentable_floats() {
        let near = AmountConverter::NEAR;
        assert!(matches!(
            near.to_minimal_units(-1.0),
            Err(AmountError::NotRepresentable(_))
        ));
        assert!(near.to_minimal_units(f64::NAN).is_err());
        assert!(near.to_minimal_units(f64::INFINITY).is_err());
        assert_eq!(near.to_minimal_units(1e30), Err(AmountError::Overflow));
    }

    #[test]
    fn test_decimal_string_exact() {
        let near = AmountConverter::NEAR;
        assert_eq!(
            near.decimal_to_minimal_units("1").unwrap().to_string(),
            yocto("1")
        );
        assert_eq!(
            near.decimal_to_minimal_units("0.5").unwrap().to_string(),
            format!("5{}", "0".repeat(23))
        );
        assert_eq!(
            near.decimal_to_minimal_units(".25").unwrap().to_string(),
            format!("25{}", "0".repeat(22))
        );
        assert_eq!(
            near.decimal_to_minimal_units("0.12345678").unwrap(),
            near.to_minimal_units(0.12345678).unwrap()
        );
        assert_eq!(
            near.decimal_to_minimal_units("0.0000095").unwrap().to_string(),
            format!("10{}", "0".repeat(18))
        );
    }

    #[test]
    fn test_decimal_string_rejects_garbage() {
        let near = AmountConverter::NEAR;
        assert!(matches!(
            near.decimal_to_minimal_units("-1"),
            Err(AmountError::MalformedSign(_))
        ));
        assert!(matches!(
            near.decimal_to_minimal_units("1.2.3"),
            Err(AmountError::InvalidNumber(_))
        ));
        assert!(matches!(
            near.decimal_to_minimal_units("."),
            Err(AmountError::InvalidNumber(_))
        ));
        assert!(matches!(
            near.decimal_to_minimal_units("1e5"),
            Err(AmountError::InvalidNumber(_))
        ));
        assert_eq!(
            near.decimal_to_minimal_units(&"9".repeat(20)),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_small_scale_token() {
        // A 2-decimal token cannot keep 6 input decimals.
        let cents = AmountConverter::with_scale(2);
        assert_eq!(cents.to_minimal_units(12.345).unwrap().as_u128(), 1235);
        assert_eq!(
            cents.decimal_to_minimal_units("12.344").unwrap().as_u128(),
            1234
        );
    }

    // ========================================================================
    // to_decimal tests
    // ========================================================================

    #[test]
    fn test_to_decimal_examples() {
        let near = AmountConverter::NEAR;
        assert_eq!(near.to_decimal("500000000000000000000000").unwrap(), 0.5);
        assert_eq!(near.to_decimal(&yocto("1")).unwrap(), 1.0);
        assert_eq!(near.to_decimal("0").unwrap(), 0.0);
    }

    #[test]
    fn test_to_decimal_truncates() {
        let near = AmountConverter::NEAR;
        // 0.99999 NEAR truncates to 0.9999, never rounds up to 1
        let units = format!("99999{}", "0".repeat(19));
        assert_eq!(near.to_decimal_string(&units).unwrap(), "0.9999");
        assert_eq!(near.to_decimal(&units).unwrap(), 0.9999);
    }

    #[test]
    fn test_to_decimal_negative() {
        let near = AmountConverter::NEAR;
        assert_eq!(near.to_decimal(&format!("-{}", yocto("2"))).unwrap(), -2.0);
    }

    #[test]
    fn test_to_decimal_rejects_decimal_point_and_bad_signs() {
        let near = AmountConverter::NEAR;
        assert!(matches!(
            near.to_decimal("1.5"),
            Err(AmountError::DecimalPoint(_))
        ));
        for bad in ["--5", "5-", "+5", "-", "1-2"] {
            assert!(
                matches!(near.to_decimal(bad), Err(AmountError::MalformedSign(_))),
                "{} should be a malformed sign",
                bad
            );
        }
        assert!(matches!(
            near.to_decimal("12a"),
            Err(AmountError::InvalidNumber(_))
        ));
        assert!(matches!(
            near.to_decimal(""),
            Err(AmountError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_to_decimal_handles_huge_inputs() {
        // Wider than u128: the display path works on digits, not integers.
        let near = AmountConverter::NEAR;
        let units = format!("1{}", "0".repeat(60));
        assert_eq!(near.to_decimal(&units).unwrap(), 1e36);
    }

    // ========================================================================
    // MinimalUnits tests
    // ========================================================================

    #[test]
    fn test_minimal_units_parse() {
        assert_eq!("42".parse::<MinimalUnits>().unwrap().as_u128(), 42);
        assert!(matches!(
            "1.5".parse::<MinimalUnits>(),
            Err(AmountError::DecimalPoint(_))
        ));
        assert!(matches!(
            "-1".parse::<MinimalUnits>(),
            Err(AmountError::MalformedSign(_))
        ));
        assert!(matches!(
            "abc".parse::<MinimalUnits>(),
            Err(AmountError::InvalidNumber(_))
        ));
        assert_eq!(
            "1".repeat(40).parse::<MinimalUnits>(),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn test_minimal_units_serde_as_string() {
        let units = MinimalUnits::new(10u128.pow(24));
        let json = serde_json::to_string(&units).unwrap();
        assert_eq!(json, format!("\"{}\"", yocto("1")));
        let back: MinimalUnits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, units);
        assert!(serde_json::from_str::<MinimalUnits>("\"0.1\"").is_err());
    }
}
