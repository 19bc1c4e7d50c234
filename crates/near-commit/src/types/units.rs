//! NEAR token amount and gas unit types.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::amount::{AmountConverter, MinimalUnits};
use crate::error::AmountError;

const YOCTO_PER_NEAR: u128 = 1_000_000_000_000_000_000_000_000;

/// Decimal NEAR strings keep every digit the yocto scale can hold.
const EXACT_NEAR: AmountConverter = AmountConverter {
    max_input_decimals: 24,
    ..AmountConverter::NEAR
};

/// An amount of NEAR, stored as yoctoNEAR.
///
/// # Parsing
///
/// Explicit units are required:
///
/// ```
/// use near_commit::NearToken;
///
/// let a: NearToken = "5 NEAR".parse().unwrap();
/// let b: NearToken = "1.5 NEAR".parse().unwrap();
/// let c: NearToken = "1 yocto".parse().unwrap();
/// assert_eq!(c, NearToken::ONE_YOCTO);
///
/// // A bare number is ambiguous
/// assert!("5".parse::<NearToken>().is_err());
/// # let _ = (a, b);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NearToken(u128);

impl NearToken {
    pub const ZERO: Self = Self(0);
    pub const ONE_YOCTO: Self = Self(1);
    pub const ONE_NEAR: Self = Self(YOCTO_PER_NEAR);

    /// Short alias for [`from_near`](Self::from_near).
    pub const fn near(near: u128) -> Self {
        Self::from_near(near)
    }

    /// Short alias for [`from_yoctonear`](Self::from_yoctonear).
    pub const fn yocto(yocto: u128) -> Self {
        Self(yocto)
    }

    /// Whole NEAR. Panics on overflow, like integer arithmetic.
    pub const fn from_near(near: u128) -> Self {
        Self(near * YOCTO_PER_NEAR)
    }

    pub const fn from_yoctonear(yocto: u128) -> Self {
        Self(yocto)
    }

    /// Parse a decimal NEAR string such as `"0.25"` exactly.
    pub fn from_near_decimal(s: &str) -> Result<Self, AmountError> {
        EXACT_NEAR.decimal_to_minimal_units(s).map(Self::from)
    }

    pub const fn as_yoctonear(&self) -> u128 {
        self.0
    }

    /// Whole NEAR, truncated.
    pub const fn as_near(&self) -> u128 {
        self.0 / YOCTO_PER_NEAR
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<MinimalUnits> for NearToken {
    fn from(units: MinimalUnits) -> Self {
        Self(units.as_u128())
    }
}

impl From<NearToken> for MinimalUnits {
    fn from(token: NearToken) -> Self {
        MinimalUnits::new(token.0)
    }
}

impl FromStr for NearToken {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(value) = s.strip_suffix(" NEAR").or_else(|| s.strip_suffix(" near")) {
            return Self::from_near_decimal(value);
        }

        if let Some(value) = s
            .strip_suffix(" yoctoNEAR")
            .or_else(|| s.strip_suffix(" yocto"))
        {
            return value.trim().parse::<MinimalUnits>().map(Self::from);
        }

        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(AmountError::AmbiguousAmount(s.to_string()));
        }

        Err(AmountError::InvalidNumber(s.to_string()))
    }
}

impl TryFrom<&str> for NearToken {
    type Error = AmountError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Display for NearToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let near = self.0 / YOCTO_PER_NEAR;
        let remainder = self.0 % YOCTO_PER_NEAR;

        if remainder == 0 {
            write!(f, "{} NEAR", near)
        } else {
            // Up to 5 decimal places, trailing zeros trimmed
            let decimal = format!("{:024}", remainder);
            let decimal = &decimal[..5];
            let decimal = decimal.trim_end_matches('0');
            if decimal.is_empty() {
                write!(f, "{} NEAR", near)
            } else {
                write!(f, "{}.{} NEAR", near, decimal)
            }
        }
    }
}

// JSON carries yoctoNEAR as a decimal string.
impl Serialize for NearToken {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for NearToken {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(d)?;
        Ok(Self(s.parse().map_err(serde::de::Error::custom)?))
    }
}

// ============================================================================
// Gas
// ============================================================================

const GAS_PER_TGAS: u64 = 1_000_000_000_000;

/// Gas units attached to a function call.
///
/// ```
/// use near_commit::Gas;
///
/// assert_eq!(Gas::from_tgas(30), Gas::DEFAULT);
/// assert_eq!(Gas::from_tgas(300).as_gas(), 300_000_000_000_000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Gas(u64);

impl Gas {
    pub const ZERO: Self = Self(0);
    pub const ONE_TGAS: Self = Self(GAS_PER_TGAS);

    /// Default gas for function calls (30 Tgas).
    pub const DEFAULT: Self = Self::from_tgas(30);

    /// Maximum gas a single transaction may attach (1 Pgas).
    pub const MAX: Self = Self::from_tgas(1_000);

    pub const fn from_gas(gas: u64) -> Self {
        Self(gas)
    }

    pub const fn from_tgas(tgas: u64) -> Self {
        Self(tgas * GAS_PER_TGAS)
    }

    /// Short alias for [`from_tgas`](Self::from_tgas).
    pub const fn tgas(tgas: u64) -> Self {
        Self::from_tgas(tgas)
    }

    pub const fn as_gas(&self) -> u64 {
        self.0
    }

    pub const fn as_tgas(&self) -> u64 {
        self.0 / GAS_PER_TGAS
    }
}

impl Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % GAS_PER_TGAS == 0 {
            write!(f, "{} Tgas", self.0 / GAS_PER_TGAS)
        } else {
            write!(f, "{} gas", self.0)
        }
    }
}

impl Serialize for Gas {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for Gas {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        u64::deserialize(d).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // NearToken tests
    // ========================================================================

    #[test]
    fn test_parse_units() {
        assert_eq!("5 NEAR".parse::<NearToken>().unwrap(), NearToken::from_near(5));
        assert_eq!(
            "1.5 NEAR".parse::<NearToken>().unwrap().as_yoctonear(),
            1_500_000_000_000_000_000_000_000
        );
        assert_eq!(
            "1000 yocto".parse::<NearToken>().unwrap(),
            NearToken::from_yoctonear(1000)
        );
        assert_eq!(
            "7 yoctoNEAR".parse::<NearToken>().unwrap(),
            NearToken::from_yoctonear(7)
        );
    }

    #[test]
    fn test_decimal_near_is_exact() {
        let token = NearToken::from_near_decimal("0.000000000000000000000001").unwrap();
        assert_eq!(token, NearToken::ONE_YOCTO);
    }

    #[test]
    fn test_parse_rejects_ambiguous_and_invalid() {
        assert!(matches!(
            "5".parse::<NearToken>(),
            Err(AmountError::AmbiguousAmount(_))
        ));
        assert!(matches!(
            "five NEAR".parse::<NearToken>(),
            Err(AmountError::InvalidNumber(_))
        ));
        assert!(matches!(
            "-1 NEAR".parse::<NearToken>(),
            Err(AmountError::MalformedSign(_))
        ));
        assert!(matches!(
            "1.5 yocto".parse::<NearToken>(),
            Err(AmountError::DecimalPoint(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(NearToken::ZERO.to_string(), "0 NEAR");
        assert_eq!(NearToken::from_near(5).to_string(), "5 NEAR");
        assert_eq!(
            NearToken::from_near_decimal("1.25").unwrap().to_string(),
            "1.25 NEAR"
        );
        assert_eq!(
            NearToken::from_near_decimal("0.123456789").unwrap().to_string(),
            "0.12345 NEAR"
        );
        assert_eq!(NearToken::ONE_YOCTO.to_string(), "0 NEAR");
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = NearToken::from_yoctonear(u128::MAX);
        assert!(max.checked_add(NearToken::ONE_YOCTO).is_none());
        assert!(NearToken::ZERO.checked_sub(NearToken::ONE_YOCTO).is_none());
        assert_eq!(
            NearToken::ONE_NEAR.checked_add(NearToken::ONE_NEAR),
            Some(NearToken::from_near(2))
        );
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&NearToken::ONE_NEAR).unwrap();
        assert_eq!(json, "\"1000000000000000000000000\"");
        let back: NearToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NearToken::ONE_NEAR);
    }

    // ========================================================================
    // Gas tests
    // ========================================================================

    #[test]
    fn test_gas_units() {
        assert_eq!(Gas::DEFAULT.as_tgas(), 30);
        assert_eq!(Gas::from_tgas(200).as_gas(), 200_000_000_000_000);
        assert_eq!(Gas::tgas(5).to_string(), "5 Tgas");
        assert_eq!(NearToken::near(2), NearToken::from_near(2));
        assert_eq!(Gas::from_gas(12).to_string(), "12 gas");
    }

    #[test]
    fn test_gas_serde_as_number() {
        let json = serde_json::to_string(&Gas::ONE_TGAS).unwrap();
        assert_eq!(json, "1000000000000");
        let back: Gas = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Gas::ONE_TGAS);
    }
}
