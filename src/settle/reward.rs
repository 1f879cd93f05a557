//! Reward estimator
//!
//! Asks the ledger's authoritative formula for the potential reward of a
//! finished round. When that call fails or times out, a fixed fallback
//! rule applies so a round is never stranded with an unknowable reward.
//! The fallback only affects the displayed/potential amount; the actual
//! payout is decided by the ledger at claim time.

use std::time::Duration;

use tracing::warn;

use crate::settle::client::SettlementClient;

/// Minimum level at which the fallback pays anything.
pub const FALLBACK_LEVEL_THRESHOLD: u32 = 10;

/// Fallback reward for rounds at or above the threshold, in token units.
pub const FALLBACK_MIN_REWARD: u64 = 10;

/// Fallback rule: the fixed minimum for high-level rounds, zero otherwise.
pub fn fallback_estimate(level: u32) -> u64 {
    if level >= FALLBACK_LEVEL_THRESHOLD {
        FALLBACK_MIN_REWARD
    } else {
        0
    }
}

/// Estimate the potential reward for a round that ended at `level`.
///
/// Consults the ledger's formula with a timeout; any failure falls back
/// to [`fallback_estimate`]. Never errors: a failed estimate must not
/// block settlement of the round itself.
pub async fn estimate<C: SettlementClient>(client: &C, call_timeout: Duration, level: u32) -> u64 {
    match tokio::time::timeout(call_timeout, client.estimate_reward(level)).await {
        Ok(Ok(amount)) => amount,
        Ok(Err(err)) => {
            warn!(level, %err, "authoritative reward estimate failed, using fallback");
            fallback_estimate(level)
        }
        Err(_) => {
            warn!(level, "reward estimate timed out, using fallback");
            fallback_estimate(level)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_rule() {
        assert_eq!(fallback_estimate(0), 0);
        assert_eq!(fallback_estimate(9), 0);
        assert_eq!(fallback_estimate(10), FALLBACK_MIN_REWARD);
        assert_eq!(fallback_estimate(42), FALLBACK_MIN_REWARD);
    }
}
