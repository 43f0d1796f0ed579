// crates/kelp-core/src/token.rs
//
// $KELP token type and unit constants.
//
// The smallest unit of $KELP is the "spore". 1 KELP = 10^9 spore. All
// internal accounting uses spore to avoid floating-point precision issues
// in ledger calculations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of spore in one KELP. 1 KELP = 10^9 spore.
pub const SPORE_PER_KELP: u64 = 1_000_000_000;

/// Type alias for spore — the smallest unit of $KELP.
pub type Spore = u64;

/// A $KELP token amount.
///
/// Wraps an amount in spore (the smallest denomination).
/// All arithmetic is performed in integer spore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Kelp {
    /// Amount in spore (1 KELP = 10^9 spore).
    pub spore: u64,
}

impl Kelp {
    /// Create a Kelp amount from a whole KELP value.
    ///
    /// # Example
    /// ```
    /// use kelp_core::token::Kelp;
    /// let amount = Kelp::from_kelp(80);
    /// assert_eq!(amount.spore, 80_000_000_000);
    /// ```
    pub fn from_kelp(amount: u64) -> Self {
        Self {
            spore: amount * SPORE_PER_KELP,
        }
    }

    /// Create a Kelp amount from a spore value.
    pub fn from_spore(spore: u64) -> Self {
        Self { spore }
    }

    /// Returns zero KELP.
    pub fn zero() -> Self {
        Self { spore: 0 }
    }
}

impl Add for Kelp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            spore: self.spore + rhs.spore,
        }
    }
}

impl Sub for Kelp {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            spore: self.spore.saturating_sub(rhs.spore),
        }
    }
}

impl fmt::Display for Kelp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.spore / SPORE_PER_KELP;
        let frac = self.spore % SPORE_PER_KELP;
        if frac == 0 {
            write!(f, "{} KELP", whole)
        } else {
            // Display up to 9 decimal places, trimming trailing zeros
            let frac_str = format!("{:09}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} KELP", whole, trimmed)
        }
    }
}
