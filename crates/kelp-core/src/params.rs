// crates/kelp-core/src/params.rs
//
// Module parameters with protocol defaults.
//
// Defaults mirror mainnet values; test networks shrink the unbonding times
// to seconds via genesis overrides.

use serde::{Deserialize, Serialize};

use crate::dec::Dec;
use crate::error::KelpError;

/// Default unbonding period for staking withdrawals: 24 hours.
pub const DEFAULT_UNBONDING_STAKING_TIME: u64 = 60 * 60 * 24;

/// Default unbonding period for delegation withdrawals: 24 hours.
pub const DEFAULT_UNBONDING_DELEGATION_TIME: u64 = 60 * 60 * 24;

/// Maximum number of concurrent stakers per pool.
pub const DEFAULT_MAX_STAKERS: u64 = 50;

/// Maximum number of concurrent funders per pool.
pub const DEFAULT_MAX_FUNDERS: u64 = 50;

/// Commission assigned to stakers that never set one.
pub const DEFAULT_COMMISSION: &str = "0.9";

/// Registry module parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Seconds an unstake entry waits before release.
    #[serde(default = "default_unbonding_staking_time")]
    pub unbonding_staking_time: u64,

    /// Seconds an undelegation entry waits before release.
    #[serde(default = "default_unbonding_delegation_time")]
    pub unbonding_delegation_time: u64,

    /// Maximum number of concurrent stakers per pool.
    #[serde(default = "default_max_stakers")]
    pub max_stakers: u64,

    /// Maximum number of concurrent funders per pool.
    #[serde(default = "default_max_funders")]
    pub max_funders: u64,

    /// Default staker commission as a decimal string.
    #[serde(default = "default_commission")]
    pub default_commission: String,
}

fn default_unbonding_staking_time() -> u64 {
    DEFAULT_UNBONDING_STAKING_TIME
}

fn default_unbonding_delegation_time() -> u64 {
    DEFAULT_UNBONDING_DELEGATION_TIME
}

fn default_max_stakers() -> u64 {
    DEFAULT_MAX_STAKERS
}

fn default_max_funders() -> u64 {
    DEFAULT_MAX_FUNDERS
}

fn default_commission() -> String {
    DEFAULT_COMMISSION.to_string()
}

impl Default for Params {
    fn default() -> Self {
        Self {
            unbonding_staking_time: default_unbonding_staking_time(),
            unbonding_delegation_time: default_unbonding_delegation_time(),
            max_stakers: default_max_stakers(),
            max_funders: default_max_funders(),
            default_commission: default_commission(),
        }
    }
}

impl Params {
    /// Validate the parameter set.
    ///
    /// # Errors
    /// Returns `KelpError::InvalidState` for zero limits and
    /// `KelpError::InvalidCommission` when the default commission is not a
    /// decimal within [0, 1].
    pub fn validate(&self) -> Result<(), KelpError> {
        if self.max_stakers == 0 {
            return Err(KelpError::InvalidState(
                "max_stakers must be at least 1".to_string(),
            ));
        }
        if self.max_funders == 0 {
            return Err(KelpError::InvalidState(
                "max_funders must be at least 1".to_string(),
            ));
        }
        validate_percentage(&self.default_commission)
            .map_err(|_| KelpError::InvalidCommission(self.default_commission.clone()))?;
        Ok(())
    }
}

/// Parse a decimal string and check it lies within [0, 1].
pub fn validate_percentage(value: &str) -> Result<Dec, KelpError> {
    let parsed: Dec = value.parse()?;
    if parsed > Dec::one() {
        return Err(KelpError::InvalidDecimal(value.to_string()));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = Params::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.unbonding_staking_time, 86_400);
        assert_eq!(params.max_funders, 50);
        assert_eq!(params.default_commission, "0.9");
    }

    #[test]
    fn test_zero_limits_rejected() {
        let params = Params {
            max_stakers: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_commission_out_of_range_rejected() {
        let params = Params {
            default_commission: "1.5".to_string(),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let params: Params = serde_json::from_str(r#"{"unbonding_staking_time": 5}"#).unwrap();
        assert_eq!(params.unbonding_staking_time, 5);
        assert_eq!(params.max_stakers, DEFAULT_MAX_STAKERS);
    }
}
