// crates/kelp-core/src/dec.rs
//
// Unsigned fixed-point decimal with 18 fractional digits.
//
// Used for commission rates and the F1 reward-per-token index entries.
// The mantissa is a u128, so a value of 1.0 is stored as 10^18. Division
// truncates toward zero; `round_u64` rounds half-up. Parsing accepts plain
// decimal strings ("0.9", "1", "0.050") with at most 18 fractional digits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::KelpError;

/// Number of fractional digits carried by a `Dec`.
pub const DECIMAL_PLACES: u32 = 18;

/// Scaling factor: 10^18.
const SCALE: u128 = 1_000_000_000_000_000_000;

/// Unsigned fixed-point decimal (18 fractional digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dec(u128);

impl Dec {
    /// The value 0.
    pub fn zero() -> Self {
        Dec(0)
    }

    /// The value 1.
    pub fn one() -> Self {
        Dec(SCALE)
    }

    /// Construct from an integer value.
    pub fn from_int(value: u64) -> Self {
        Dec(value as u128 * SCALE)
    }

    /// Construct from a raw mantissa (value * 10^18).
    pub fn from_mantissa(mantissa: u128) -> Self {
        Dec(mantissa)
    }

    /// The raw mantissa (value * 10^18).
    pub fn mantissa(&self) -> u128 {
        self.0
    }

    /// The ratio `numerator / denominator` as a decimal.
    ///
    /// Returns zero when the denominator is zero; a u64 numerator scaled by
    /// 10^18 always fits in the u128 mantissa.
    pub fn from_ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Dec::zero();
        }
        Dec(numerator as u128 * SCALE / denominator as u128)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Saturating addition.
    pub fn add(&self, other: Dec) -> Dec {
        Dec(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction (clamps at zero).
    pub fn sub(&self, other: Dec) -> Dec {
        Dec(self.0.saturating_sub(other.0))
    }

    /// Multiply by an integer amount, saturating at the representable
    /// maximum. The whole and fractional parts are multiplied separately so
    /// large index values do not overflow prematurely.
    pub fn mul_int(&self, amount: u64) -> Dec {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        let whole_part = whole
            .saturating_mul(amount as u128)
            .saturating_mul(SCALE);
        let frac_part = frac.saturating_mul(amount as u128);
        Dec(whole_part.saturating_add(frac_part))
    }

    /// Round half-up to the nearest integer, clamped to `u64::MAX`.
    pub fn round_u64(&self) -> u64 {
        let rounded = (self.0.saturating_add(SCALE / 2)) / SCALE;
        if rounded > u64::MAX as u128 {
            u64::MAX
        } else {
            rounded as u64
        }
    }
}

impl FromStr for Dec {
    type Err = KelpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KelpError::InvalidDecimal(s.to_string());

        if s.is_empty() {
            return Err(invalid());
        }

        let (whole_str, frac_str) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole_str.is_empty() && frac_str.is_empty() {
            return Err(invalid());
        }
        if frac_str.len() > DECIMAL_PLACES as usize {
            return Err(invalid());
        }

        let whole: u128 = if whole_str.is_empty() {
            0
        } else {
            whole_str.parse().map_err(|_| invalid())?
        };

        let frac: u128 = if frac_str.is_empty() {
            0
        } else {
            let parsed: u128 = frac_str.parse().map_err(|_| invalid())?;
            parsed * 10u128.pow(DECIMAL_PLACES - frac_str.len() as u32)
        };

        whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .map(Dec)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            write!(f, "{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
