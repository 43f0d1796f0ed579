// crates/kelp-registry/src/query.rs
//
// Read-only query accessors, mirroring the LCD/REST surface.
//
// Numeric fields are rendered as strings (the proto3-JSON convention the
// external query layer serves), empty sentinels as "", and an absent
// delegation bucket as the canonical zero literal. No accessor mutates
// state.

use serde::{Deserialize, Serialize};

use kelp_core::{BankLedger, Pool, StakerStatus};

use crate::f1::F1Distribution;
use crate::registry::Registry;
use kelp_core::KelpError;

/// A pool as served by `pool` and `pools`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolResponse {
    pub id: String,
    pub name: String,
    pub runtime: String,
    pub paused: bool,
    pub total_stake: String,
    pub total_funds: String,
    pub total_delegation: String,
    pub stakers: Vec<String>,
    pub lowest_staker: String,
    pub funders: Vec<String>,
    pub lowest_funder: String,
}

impl PoolResponse {
    fn from_pool(pool: &Pool) -> Self {
        Self {
            id: pool.id.to_string(),
            name: pool.name.clone(),
            runtime: pool.runtime.clone(),
            paused: pool.paused,
            total_stake: pool.total_stake.to_string(),
            total_funds: pool.total_funds.to_string(),
            total_delegation: pool.total_delegation.to_string(),
            stakers: pool.stakers.clone(),
            lowest_staker: pool.lowest_staker.clone(),
            funders: pool.funders.clone(),
            lowest_funder: pool.lowest_funder.clone(),
        }
    }
}

/// A staker as served by `staker` and `stakers_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerResponse {
    pub staker: String,
    pub pool_id: String,
    pub account: String,
    pub amount: String,
    pub unbonding_amount: String,
    pub total_delegation: String,
    pub commission: String,
    pub moniker: String,
    pub website: String,
    pub logo: String,
}

/// A funder as served by `funder` and `funders_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunderResponse {
    pub account: String,
    pub pool_id: String,
    pub amount: String,
}

/// A delegator as served by `delegator` and `delegators_by_pool_and_staker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorResponse {
    pub delegator: String,
    pub staker: String,
    pub delegation_amount: String,
    pub current_reward: String,
}

/// A delegation bucket as served alongside delegator listings.
///
/// When the bucket is absent (last delegator left), the canonical zero
/// literal is returned instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationPoolDataResponse {
    pub id: String,
    pub staker: String,
    pub current_rewards: String,
    pub total_delegation: String,
    pub delegator_count: String,
    pub latest_index_k: String,
    pub latest_index_was_undelegation: bool,
}

impl DelegationPoolDataResponse {
    /// The canonical zero state.
    fn zero() -> Self {
        Self {
            id: "0".to_string(),
            staker: String::new(),
            current_rewards: "0".to_string(),
            total_delegation: "0".to_string(),
            delegator_count: "0".to_string(),
            latest_index_k: "0".to_string(),
            latest_index_was_undelegation: false,
        }
    }
}

/// Combined response for `delegators_by_pool_and_staker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorsByPoolAndStakerResponse {
    pub delegators: Vec<DelegatorResponse>,
    pub pool: PoolResponse,
    pub delegation_pool_data: DelegationPoolDataResponse,
}

/// An unmatured staking unbonding entry for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingUnbondingResponse {
    pub amount: String,
    pub creation_time: String,
    pub pool: PoolResponse,
}

/// An unmatured delegation unbonding entry for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationUnbondingResponse {
    pub amount: String,
    pub creation_time: String,
    pub staker: String,
    pub pool: PoolResponse,
}

/// One delegation of an account, across pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDelegationResponse {
    pub pool: PoolResponse,
    pub staker: String,
    pub delegation_amount: String,
    pub current_reward: String,
}

/// Aggregate holdings of an account across the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAssetsResponse {
    pub balance: String,
    pub protocol_staking: String,
    pub protocol_staking_unbonding: String,
    pub protocol_delegation: String,
    pub protocol_delegation_unbonding: String,
    pub protocol_funding: String,
    pub protocol_rewards: String,
}

impl<B: BankLedger> Registry<B> {
    /// The pool with the given id.
    pub fn query_pool(&self, id: u64) -> Result<PoolResponse, KelpError> {
        Ok(PoolResponse::from_pool(self.state.pool(id)?))
    }

    /// All pools, optionally filtered by paused state.
    pub fn query_pools(&self, paused: Option<bool>) -> Vec<PoolResponse> {
        self.state
            .pools
            .values()
            .filter(|pool| paused.map_or(true, |p| pool.paused == p))
            .map(PoolResponse::from_pool)
            .collect()
    }

    /// A single staker entry, if present.
    pub fn query_staker(&self, pool_id: u64, account: &str) -> Option<StakerResponse> {
        self.state
            .staker(account, pool_id)
            .map(|_| self.staker_response(pool_id, account))
    }

    /// The pool's stakers in the order they first staked, filtered by
    /// status.
    pub fn query_stakers_list(
        &self,
        pool_id: u64,
        status: StakerStatus,
    ) -> Result<Vec<StakerResponse>, KelpError> {
        let pool = self.state.pool(pool_id)?;
        Ok(pool
            .stakers
            .clone()
            .iter()
            .filter(|account| {
                let amount = self
                    .state
                    .staker(account, pool_id)
                    .map(|s| s.amount)
                    .unwrap_or(0);
                let unbonding = self.state.unbonding_amount(pool_id, account);
                status.matches(amount, unbonding)
            })
            .map(|account| self.staker_response(pool_id, account))
            .collect())
    }

    /// A single funder entry, if present.
    pub fn query_funder(&self, pool_id: u64, account: &str) -> Option<FunderResponse> {
        self.state.funder(account, pool_id).map(|funder| FunderResponse {
            account: funder.account.clone(),
            pool_id: funder.pool_id.to_string(),
            amount: funder.amount.to_string(),
        })
    }

    /// The pool's funders in the order they first funded.
    pub fn query_funders_list(&self, pool_id: u64) -> Result<Vec<FunderResponse>, KelpError> {
        let pool = self.state.pool(pool_id)?;
        Ok(pool
            .funders
            .iter()
            .filter_map(|account| self.query_funder(pool_id, account))
            .collect())
    }

    /// A single delegator entry with its pending reward, if present.
    pub fn query_delegator(
        &self,
        pool_id: u64,
        staker: &str,
        delegator: &str,
    ) -> Option<DelegatorResponse> {
        self.state
            .delegator(pool_id, staker, delegator)
            .map(|entry| DelegatorResponse {
                delegator: entry.delegator.clone(),
                staker: entry.staker.clone(),
                delegation_amount: entry.delegation_amount.to_string(),
                current_reward: F1Distribution::pending_reward(
                    &self.state,
                    pool_id,
                    staker,
                    delegator,
                )
                .to_string(),
            })
    }

    /// All delegators of a staker, the pool, and the delegation bucket
    /// (the canonical zero literal when the bucket is absent).
    pub fn query_delegators_by_pool_and_staker(
        &self,
        pool_id: u64,
        staker: &str,
    ) -> Result<DelegatorsByPoolAndStakerResponse, KelpError> {
        let pool = PoolResponse::from_pool(self.state.pool(pool_id)?);

        let prefix = format!("{}/{}/", pool_id, staker);
        let delegators = self
            .state
            .delegators
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(_, entry)| self.query_delegator(pool_id, staker, &entry.delegator))
            .collect();

        let delegation_pool_data = match self.state.delegation_data(pool_id, staker) {
            Some(data) => DelegationPoolDataResponse {
                id: data.pool_id.to_string(),
                staker: data.staker.clone(),
                current_rewards: data.current_rewards.to_string(),
                total_delegation: data.total_delegation.to_string(),
                delegator_count: data.delegator_count.to_string(),
                latest_index_k: data.latest_index_k.to_string(),
                latest_index_was_undelegation: data.latest_index_was_undelegation,
            },
            None => DelegationPoolDataResponse::zero(),
        };

        Ok(DelegatorsByPoolAndStakerResponse {
            delegators,
            pool,
            delegation_pool_data,
        })
    }

    /// The stakers of a pool an account delegates to.
    pub fn query_stakers_by_pool_and_delegator(
        &self,
        pool_id: u64,
        delegator: &str,
    ) -> Result<Vec<StakerResponse>, KelpError> {
        let pool = self.state.pool(pool_id)?;
        Ok(pool
            .stakers
            .clone()
            .iter()
            .filter(|staker| self.state.delegator(pool_id, staker, delegator).is_some())
            .map(|staker| self.staker_response(pool_id, staker))
            .collect())
    }

    /// Unmatured staking unbonding entries of an account, in request order.
    pub fn query_account_staking_unbondings(&self, address: &str) -> Vec<StakingUnbondingResponse> {
        self.state
            .staking_queue
            .entries
            .values()
            .filter(|entry| entry.staker == address)
            .filter_map(|entry| {
                let pool = self.state.pools.get(&entry.pool_id)?;
                Some(StakingUnbondingResponse {
                    amount: entry.amount.to_string(),
                    creation_time: entry.creation_time.to_string(),
                    pool: PoolResponse::from_pool(pool),
                })
            })
            .collect()
    }

    /// Unmatured delegation unbonding entries of an account, in request
    /// order.
    pub fn query_account_delegation_unbondings(
        &self,
        address: &str,
    ) -> Vec<DelegationUnbondingResponse> {
        self.state
            .delegation_queue
            .entries
            .values()
            .filter(|entry| entry.delegator == address)
            .filter_map(|entry| {
                let pool = self.state.pools.get(&entry.pool_id)?;
                Some(DelegationUnbondingResponse {
                    amount: entry.amount.to_string(),
                    creation_time: entry.creation_time.to_string(),
                    staker: entry.staker.clone(),
                    pool: PoolResponse::from_pool(pool),
                })
            })
            .collect()
    }

    /// All stake entries of an account across pools.
    pub fn query_account_staked_list(&self, address: &str) -> Vec<StakerResponse> {
        self.state
            .stakers
            .values()
            .filter(|staker| staker.account == address)
            .map(|staker| self.staker_response(staker.pool_id, &staker.account))
            .collect()
    }

    /// All delegations of an account across pools.
    pub fn query_account_delegation_list(&self, address: &str) -> Vec<AccountDelegationResponse> {
        self.state
            .delegators
            .values()
            .filter(|entry| entry.delegator == address)
            .filter_map(|entry| {
                let pool = self.state.pools.get(&entry.pool_id)?;
                Some(AccountDelegationResponse {
                    pool: PoolResponse::from_pool(pool),
                    staker: entry.staker.clone(),
                    delegation_amount: entry.delegation_amount.to_string(),
                    current_reward: F1Distribution::pending_reward(
                        &self.state,
                        entry.pool_id,
                        &entry.staker,
                        address,
                    )
                    .to_string(),
                })
            })
            .collect()
    }

    /// All funding entries of an account across pools.
    pub fn query_account_funded_list(&self, address: &str) -> Vec<FunderResponse> {
        self.state
            .funders
            .values()
            .filter(|funder| funder.account == address)
            .map(|funder| FunderResponse {
                account: funder.account.clone(),
                pool_id: funder.pool_id.to_string(),
                amount: funder.amount.to_string(),
            })
            .collect()
    }

    /// Aggregate holdings of an account: spendable balance plus everything
    /// locked in the registry.
    pub fn query_account_assets(&self, address: &str) -> AccountAssetsResponse {
        let staking: u64 = self
            .state
            .stakers
            .values()
            .filter(|s| s.account == address)
            .map(|s| s.amount)
            .sum();
        let staking_unbonding: u64 = self
            .state
            .unbonding_stakers
            .values()
            .filter(|u| u.staker == address)
            .map(|u| u.unbonding_amount)
            .sum();
        let delegation: u64 = self
            .state
            .delegators
            .values()
            .filter(|d| d.delegator == address)
            .map(|d| d.delegation_amount)
            .sum();
        let delegation_unbonding: u64 = self
            .state
            .delegation_queue
            .entries
            .values()
            .filter(|e| e.delegator == address)
            .map(|e| e.amount)
            .sum();
        let funding: u64 = self
            .state
            .funders
            .values()
            .filter(|f| f.account == address)
            .map(|f| f.amount)
            .sum();
        let rewards: u64 = self
            .state
            .delegators
            .values()
            .filter(|d| d.delegator == address)
            .map(|d| {
                F1Distribution::pending_reward(&self.state, d.pool_id, &d.staker, &d.delegator)
            })
            .sum();

        AccountAssetsResponse {
            balance: self.bank.balance(address).to_string(),
            protocol_staking: staking.to_string(),
            protocol_staking_unbonding: staking_unbonding.to_string(),
            protocol_delegation: delegation.to_string(),
            protocol_delegation_unbonding: delegation_unbonding.to_string(),
            protocol_funding: funding.to_string(),
            protocol_rewards: rewards.to_string(),
        }
    }

    /// An account's active stake in a pool, in spore.
    pub fn query_staking_amount(&self, pool_id: u64, staker: &str) -> u64 {
        self.state
            .staker(staker, pool_id)
            .map(|s| s.amount)
            .unwrap_or(0)
    }

    /// An account's funding of a pool, in spore.
    pub fn query_funding_amount(&self, pool_id: u64, funder: &str) -> u64 {
        self.state
            .funder(funder, pool_id)
            .map(|f| f.amount)
            .unwrap_or(0)
    }

    fn staker_response(&self, pool_id: u64, account: &str) -> StakerResponse {
        let staker = self.state.staker(account, pool_id).cloned().unwrap_or_default();
        let total_delegation = self
            .state
            .delegation_data(pool_id, account)
            .map(|d| d.total_delegation)
            .unwrap_or(0);

        StakerResponse {
            staker: account.to_string(),
            pool_id: pool_id.to_string(),
            account: account.to_string(),
            amount: staker.amount.to_string(),
            unbonding_amount: self.state.unbonding_amount(pool_id, account).to_string(),
            total_delegation: total_delegation.to_string(),
            commission: staker.commission,
            moniker: staker.moniker,
            website: staker.website,
            logo: staker.logo,
        }
    }
}
