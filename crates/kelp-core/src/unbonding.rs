// crates/kelp-core/src/unbonding.rs
//
// Time-ordered unbonding queues.
//
// Each queue is an index-addressed FIFO: entries are appended at
// `high_index + 1` and released from `low_index + 1` upward once their
// unbonding period has elapsed. Because entries are appended in block
// order, the queue is ordered by creation time and the scheduler only ever
// needs to inspect the tail.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pending release of previously staked funds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingUnbondingEntry {
    /// Position in the queue.
    pub index: u64,
    /// The pool the stake is leaving.
    pub pool_id: u64,
    /// Address of the staking account.
    pub staker: String,
    /// Amount to release in spore.
    pub amount: u64,
    /// Unix time (seconds) the unstake was requested.
    pub creation_time: u64,
}

/// A pending release of previously delegated funds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationUnbondingEntry {
    /// Position in the queue.
    pub index: u64,
    /// The pool the delegation is leaving.
    pub pool_id: u64,
    /// The staker that was delegated to.
    pub staker: String,
    /// Address of the delegating account, credited on release.
    pub delegator: String,
    /// Amount to release in spore.
    pub amount: u64,
    /// Unix time (seconds) the undelegation was requested.
    pub creation_time: u64,
}

/// An index-addressed FIFO queue of unbonding entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingQueue<E> {
    /// Index of the last released entry.
    pub low_index: u64,
    /// Index of the most recently appended entry.
    pub high_index: u64,
    /// Entries by index. Released entries are removed.
    pub entries: BTreeMap<u64, E>,
}

impl<E> Default for UnbondingQueue<E> {
    fn default() -> Self {
        Self {
            low_index: 0,
            high_index: 0,
            entries: BTreeMap::new(),
        }
    }
}

impl<E> UnbondingQueue<E> {
    /// Whether every appended entry has been released.
    pub fn is_empty(&self) -> bool {
        self.low_index == self.high_index
    }

    /// Reserve the next index for an entry about to be appended.
    pub fn next_index(&mut self) -> u64 {
        self.high_index += 1;
        self.high_index
    }

    /// The entry at the tail of the queue, if any.
    pub fn front(&self) -> Option<&E> {
        self.entries.get(&(self.low_index + 1))
    }

    /// Remove and return the tail entry, advancing `low_index`.
    pub fn pop_front(&mut self) -> Option<E> {
        let entry = self.entries.remove(&(self.low_index + 1))?;
        self.low_index += 1;
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue: UnbondingQueue<StakingUnbondingEntry> = UnbondingQueue::default();
        assert!(queue.is_empty());

        for amount in [10, 20, 30] {
            let index = queue.next_index();
            queue.entries.insert(
                index,
                StakingUnbondingEntry {
                    index,
                    pool_id: 0,
                    staker: "kelp1alice".to_string(),
                    amount,
                    creation_time: 100,
                },
            );
        }

        assert!(!queue.is_empty());
        assert_eq!(queue.front().unwrap().amount, 10);
        assert_eq!(queue.pop_front().unwrap().amount, 10);
        assert_eq!(queue.pop_front().unwrap().amount, 20);
        assert_eq!(queue.pop_front().unwrap().amount, 30);
        assert!(queue.pop_front().is_none());
        assert!(queue.is_empty());
    }
}
