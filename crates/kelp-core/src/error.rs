use thiserror::Error;

/// Protocol-wide error types for the Kelp Protocol.
///
/// Transaction callers match on message substrings (e.g. "insufficient
/// funds", "self delegation not allowed"), so the display strings here are
/// part of the module's external surface and must stay stable.
#[derive(Debug, Error)]
pub enum KelpError {
    /// Referenced pool id does not exist.
    #[error("pool with id {0} does not exist")]
    PoolNotFound(u64),

    /// A new funder at the funder cap did not outbid the lowest funder.
    #[error("minimum funding amount of {min}spore not reached")]
    FundsTooLow { min: u64 },

    /// A single defund request exceeded the funder's current amount.
    #[error("maximum defunding amount of {max}spore surpassed")]
    DefundTooHigh { max: u64 },

    /// A new staker at the staker cap did not outbid the lowest staker.
    #[error("minimum staking amount of {min}spore not reached")]
    StakeTooLow { min: u64 },

    /// A single unstake request exceeded the stake not already unbonding.
    #[error("maximum unstaking amount of {max}spore surpassed")]
    UnstakeTooHigh { max: u64 },

    /// Sender has not staked in the referenced pool.
    #[error("sender is no staker")]
    NoStaker,

    /// Sender has not funded the referenced pool.
    #[error("sender is no funder")]
    NoFunder,

    /// Commission is not a decimal in [0, 1].
    #[error("invalid commission {0}")]
    InvalidCommission(String),

    /// Delegator address equals the staker address.
    #[error("self delegation not allowed")]
    SelfDelegation,

    /// Sender has no delegation to the referenced staker.
    #[error("not a delegator")]
    NotADelegator,

    /// Undelegate amount exceeds the current delegation.
    #[error("undelegate amount is larger than current delegation")]
    NotEnoughDelegation,

    /// Requested amount exceeds the account's spendable balance.
    #[error("insufficient funds: account {account} has {available}spore but {requested}spore requested")]
    InsufficientFunds {
        account: String,
        available: u64,
        requested: u64,
    },

    /// A decimal string could not be parsed.
    #[error("invalid decimal representation: {0}")]
    InvalidDecimal(String),

    /// Internal invariant breach (ledger and aggregates disagree).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Storage layer error (RocksDB).
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl KelpError {
    /// Stable nonzero receipt code for this failure kind.
    ///
    /// Zero is reserved for success; the codes below mirror the registry's
    /// error registration order.
    pub fn code(&self) -> u32 {
        match self {
            KelpError::PoolNotFound(_) => 1100,
            KelpError::FundsTooLow { .. } => 1101,
            KelpError::DefundTooHigh { .. } => 1102,
            KelpError::StakeTooLow { .. } => 1103,
            KelpError::UnstakeTooHigh { .. } => 1104,
            KelpError::NoStaker => 1105,
            KelpError::NoFunder => 1106,
            KelpError::InvalidCommission(_) => 1107,
            KelpError::SelfDelegation => 1108,
            KelpError::NotADelegator => 1109,
            KelpError::NotEnoughDelegation => 1110,
            KelpError::InsufficientFunds { .. } => 1111,
            KelpError::InvalidDecimal(_) => 1112,
            KelpError::InvalidState(_) => 1113,
            KelpError::Storage(_) => 1114,
            KelpError::Serialization(_) => 1115,
        }
    }
}

impl From<serde_json::Error> for KelpError {
    fn from(e: serde_json::Error) -> Self {
        KelpError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_expected_substrings() {
        let err = KelpError::InsufficientFunds {
            account: "kelp1alice".to_string(),
            available: 10,
            requested: 20,
        };
        assert!(err.to_string().contains("insufficient funds"));

        assert!(KelpError::SelfDelegation
            .to_string()
            .contains("self delegation not allowed"));

        assert!(KelpError::UnstakeTooHigh { max: 20 }
            .to_string()
            .contains("maximum unstaking amount"));

        assert!(KelpError::DefundTooHigh { max: 20 }
            .to_string()
            .contains("maximum defunding amount of"));

        assert!(KelpError::PoolNotFound(7)
            .to_string()
            .contains("pool with id 7 does not exist"));
    }

    #[test]
    fn test_codes_are_nonzero_and_distinct() {
        let errs = [
            KelpError::PoolNotFound(0),
            KelpError::SelfDelegation,
            KelpError::NoStaker,
            KelpError::UnstakeTooHigh { max: 0 },
        ];
        let mut codes: Vec<u32> = errs.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
        assert!(codes.iter().all(|c| *c != 0));
    }
}
