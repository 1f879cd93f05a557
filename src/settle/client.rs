//! Settlement client boundary
//!
//! The one typed seam between the session controller and the remote
//! ledger. Adapters implementing this trait own all wire-format concerns;
//! the core never constructs encoded call data itself. The proof hash
//! computed here is the only content that crosses the seam pre-bound to a
//! player identity.

use sha2::{Digest, Sha256};

use crate::settle::error::SettleError;
use crate::settle::record::SessionId;

/// Ledger-side view of a session, as returned by `get_session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub final_score: u32,
    pub final_level: u32,
    pub final_lines: u32,
    pub reward_claimed: bool,
    pub reward_amount: u64,
}

/// Remote ledger operations consumed by the session controller.
///
/// All calls are async and may fail with any [`SettleError`] class; the
/// controller adds timeouts and retry policy on top. `claim_reward` must
/// be safe to call again after a failed attempt - double-mint protection
/// is the ledger's responsibility.
pub trait SettlementClient {
    /// Begin a round on the ledger, yielding its session id.
    async fn start_session(&self) -> Result<SessionId, SettleError>;

    /// Submit a finished round's final stats.
    async fn end_session(
        &self,
        id: SessionId,
        score: u32,
        level: u32,
        lines: u32,
        proof_hash: &str,
    ) -> Result<(), SettleError>;

    /// Request payout for a previously submitted, unclaimed session.
    async fn claim_reward(&self, id: SessionId) -> Result<(), SettleError>;

    /// Read-only lookup used to reconcile local belief with ledger truth.
    async fn get_session(&self, id: SessionId) -> Result<SessionView, SettleError>;

    /// The ledger's authoritative reward formula.
    async fn estimate_reward(&self, level: u32) -> Result<u64, SettleError>;
}

/// Content hash binding a session's final stats to the player, used by
/// the ledger to detect tampering. SHA-256 over the canonical string
/// `"{session}:{score}:{level}:{lines}:{player}"`, hex-encoded.
pub fn proof_hash(id: SessionId, score: u32, level: u32, lines: u32, player: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{id}:{score}:{level}:{lines}:{player}").as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_hash_is_stable() {
        let a = proof_hash(SessionId(7), 2450, 2, 12, "player-1");
        let b = proof_hash(SessionId(7), 2450, 2, 12, "player-1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_proof_hash_binds_every_field() {
        let base = proof_hash(SessionId(7), 2450, 2, 12, "player-1");
        assert_ne!(base, proof_hash(SessionId(8), 2450, 2, 12, "player-1"));
        assert_ne!(base, proof_hash(SessionId(7), 2451, 2, 12, "player-1"));
        assert_ne!(base, proof_hash(SessionId(7), 2450, 3, 12, "player-1"));
        assert_ne!(base, proof_hash(SessionId(7), 2450, 2, 13, "player-1"));
        assert_ne!(base, proof_hash(SessionId(7), 2450, 2, 12, "player-2"));
    }
}
