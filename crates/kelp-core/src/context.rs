// crates/kelp-core/src/context.rs
//
// Block execution context.
//
// Every registry operation receives the height and timestamp of the block
// it executes in; the unbonding scheduler derives maturity from the block
// time, never from the wall clock, so replays stay deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The block a transaction executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Block height.
    pub height: u64,
    /// Block timestamp.
    pub time: DateTime<Utc>,
}

impl BlockContext {
    /// Create a context for the given height and time.
    pub fn new(height: u64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }

    /// Block time as unix seconds.
    pub fn unix_secs(&self) -> u64 {
        self.time.timestamp().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unix_secs() {
        let time = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let ctx = BlockContext::new(42, time);
        assert_eq!(ctx.height, 42);
        assert_eq!(ctx.unix_secs(), 1_700_000_000);
    }
}
