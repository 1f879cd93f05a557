//! Shared test fixtures: a scriptable mock ledger and fast controller
//! config for the settlement suites.

// Each test binary uses a different subset of the fixture.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use stackmint::settle::{
    ControllerConfig, SessionId, SessionView, SettleError, SettlementClient,
};

/// Mock reward formula: 50 tokens per level.
pub const REWARD_PER_LEVEL: u64 = 50;

#[derive(Debug, Default)]
struct LedgerSession {
    score: u32,
    level: u32,
    lines: u32,
    ended: bool,
    claimed: bool,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    sessions: HashMap<u64, LedgerSession>,
    fail_start: VecDeque<SettleError>,
    fail_end: VecDeque<SettleError>,
    fail_claim: VecDeque<SettleError>,
    fail_estimate: VecDeque<SettleError>,
    claim_calls: u32,
    minted: u64,
}

/// In-process fake of the remote ledger. Failures are scripted per
/// operation as a queue of errors consumed before the real behavior.
/// Double claims are rejected, as the real contract would.
#[derive(Debug, Default)]
pub struct MockLedger {
    inner: Mutex<Inner>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_start_failure(&self, err: SettleError) {
        self.inner.lock().unwrap().fail_start.push_back(err);
    }

    pub fn push_end_failure(&self, err: SettleError) {
        self.inner.lock().unwrap().fail_end.push_back(err);
    }

    pub fn push_claim_failure(&self, err: SettleError) {
        self.inner.lock().unwrap().fail_claim.push_back(err);
    }

    pub fn push_estimate_failure(&self, err: SettleError) {
        self.inner.lock().unwrap().fail_estimate.push_back(err);
    }

    /// Create an already-ended session directly on the ledger, as if it
    /// had been played from another device.
    pub fn seed_session(&self, score: u32, level: u32, lines: u32) -> SessionId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.sessions.insert(
            id,
            LedgerSession {
                score,
                level,
                lines,
                ended: true,
                claimed: false,
            },
        );
        SessionId(id)
    }

    /// Total tokens minted by successful claims.
    pub fn minted(&self) -> u64 {
        self.inner.lock().unwrap().minted
    }

    pub fn claim_calls(&self) -> u32 {
        self.inner.lock().unwrap().claim_calls
    }
}

impl SettlementClient for MockLedger {
    async fn start_session(&self) -> Result<SessionId, SettleError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_start.pop_front() {
            return Err(err);
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.sessions.insert(id, LedgerSession::default());
        Ok(SessionId(id))
    }

    async fn end_session(
        &self,
        id: SessionId,
        score: u32,
        level: u32,
        lines: u32,
        proof_hash: &str,
    ) -> Result<(), SettleError> {
        assert_eq!(proof_hash.len(), 64, "proof hash must be a sha-256 hex digest");
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_end.pop_front() {
            return Err(err);
        }
        let session = inner
            .sessions
            .get_mut(&id.0)
            .ok_or(SettleError::InvalidSession(id))?;
        session.score = score;
        session.level = level;
        session.lines = lines;
        session.ended = true;
        Ok(())
    }

    async fn claim_reward(&self, id: SessionId) -> Result<(), SettleError> {
        let mut inner = self.inner.lock().unwrap();
        inner.claim_calls += 1;
        if let Some(err) = inner.fail_claim.pop_front() {
            return Err(err);
        }
        let session = inner
            .sessions
            .get_mut(&id.0)
            .ok_or(SettleError::InvalidSession(id))?;
        if !session.ended {
            return Err(SettleError::LedgerRejected(
                "session has no final stats".to_string(),
            ));
        }
        if session.claimed {
            return Err(SettleError::LedgerRejected(
                "reward already claimed".to_string(),
            ));
        }
        session.claimed = true;
        let amount = session.level as u64 * REWARD_PER_LEVEL;
        inner.minted += amount;
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<SessionView, SettleError> {
        let inner = self.inner.lock().unwrap();
        let session = inner
            .sessions
            .get(&id.0)
            .ok_or(SettleError::InvalidSession(id))?;
        Ok(SessionView {
            final_score: session.score,
            final_level: session.level,
            final_lines: session.lines,
            reward_claimed: session.claimed,
            reward_amount: session.level as u64 * REWARD_PER_LEVEL,
        })
    }

    async fn estimate_reward(&self, level: u32) -> Result<u64, SettleError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = inner.fail_estimate.pop_front() {
            return Err(err);
        }
        Ok(level as u64 * REWARD_PER_LEVEL)
    }
}

/// Controller config tuned so retries and confirmation polls finish in
/// milliseconds.
pub fn fast_config() -> ControllerConfig {
    ControllerConfig {
        player: "test-player".to_string(),
        call_timeout: Duration::from_secs(1),
        retry_attempts: 2,
        retry_base_delay: Duration::from_millis(1),
        confirm_attempts: 2,
        confirm_interval: Duration::from_millis(1),
    }
}
