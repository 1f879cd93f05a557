//! Session controller - the settlement state machine
//!
//! Orchestrates the remote settlement lifecycle of each round
//! (start -> end -> claim) and keeps the durable recovery store
//! consistent with reality across crashes and reloads.
//!
//! Two rules shape everything here:
//! - gameplay is never blocked on a remote call; a failed session start
//!   just leaves the round unsettled, and
//! - durability precedes the network: a round's final stats are persisted
//!   as a Pending record before `end_session` is ever attempted, so a
//!   crash in between cannot lose the round.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::settle::client::{proof_hash, SettlementClient};
use crate::settle::error::SettleError;
use crate::settle::record::{SessionId, SessionRecord, SessionStatus};
use crate::settle::reward;
use crate::settle::store::RecoveryStore;
use crate::types::FinalStats;

/// Round lifecycle phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Starting,
    Active,
    Ended,
    Submitting,
    Claiming,
}

/// Tunables for the settlement flows.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Player identity bound into the proof hash.
    pub player: String,
    /// Per-call timeout; elapse is classified as a transient failure.
    pub call_timeout: Duration,
    /// Maximum attempts for transient submission failures.
    pub retry_attempts: u32,
    /// Backoff before the first retry; doubles per attempt.
    pub retry_base_delay: Duration,
    /// Confirmation polls before giving up on observing ledger state.
    pub confirm_attempts: u32,
    /// Delay between confirmation polls.
    pub confirm_interval: Duration,
}

impl ControllerConfig {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            ..Self::default()
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            player: "anonymous".to_string(),
            call_timeout: Duration::from_secs(10),
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(500),
            confirm_attempts: 5,
            confirm_interval: Duration::from_secs(2),
        }
    }
}

/// Settlement orchestrator. One instance per device; owns all mutation of
/// the recovery store.
pub struct SessionController<C, S> {
    client: C,
    store: S,
    config: ControllerConfig,
    phase: Phase,
    current_session: Option<SessionId>,
    in_flight: HashSet<String>,
}

impl<C: SettlementClient, S: RecoveryStore> SessionController<C, S> {
    pub fn new(client: C, store: S, config: ControllerConfig) -> Self {
        Self {
            client,
            store,
            config,
            phase: Phase::Idle,
            current_session: None,
            in_flight: HashSet::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The underlying settlement client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Ledger session id of the round in progress, if the remote start
    /// succeeded.
    pub fn current_session(&self) -> Option<SessionId> {
        self.current_session
    }

    /// Outstanding settlement work found in the store, oldest first.
    /// Called on startup to offer the "claim last game" recovery path.
    pub fn recover(&self) -> Result<Vec<SessionRecord>> {
        self.store.list_pending()
    }

    /// Begin a round on the ledger. Attempted at most once per round; a
    /// failure is tolerated and the round proceeds unsettled, so gameplay
    /// is never blocked on network latency.
    pub async fn start_round(&mut self) -> Result<Option<SessionId>> {
        if self.phase != Phase::Idle {
            bail!("a round is already in progress");
        }
        self.phase = Phase::Starting;

        let outcome = self.call(self.client.start_session()).await;
        self.phase = Phase::Active;
        match outcome {
            Ok(id) => {
                info!(%id, "remote session started");
                self.current_session = Some(id);
                Ok(Some(id))
            }
            Err(err) => {
                warn!(%err, "remote session start failed; round continues unsettled");
                self.current_session = None;
                Ok(None)
            }
        }
    }

    /// Settle a finished round: estimate the reward, persist a Pending
    /// record, then submit the final stats to the ledger.
    ///
    /// Returns the record in whatever state settlement reached; a failed
    /// submission is reported through `status`/`failure` rather than an
    /// error, because the round itself is durably recorded either way.
    /// Only store I/O failures error.
    pub async fn finish_round(&mut self, stats: FinalStats) -> Result<SessionRecord> {
        if !matches!(self.phase, Phase::Starting | Phase::Active) {
            bail!("no round in progress");
        }
        self.phase = Phase::Ended;

        let potential = reward::estimate(&self.client, self.config.call_timeout, stats.level).await;
        let record = SessionRecord::pending(self.current_session.take(), stats, potential);
        self.store.put(&record)?;
        info!(
            key = %record.key(),
            score = record.final_score,
            level = record.final_level,
            lines = record.final_lines,
            "round recorded"
        );

        self.phase = Phase::Submitting;
        let record = self.submit(record).await;
        self.phase = Phase::Idle;
        record
    }

    /// Retry settlement of a persisted record from wherever it stalled,
    /// using only persisted stats (the run state may be long gone).
    pub async fn retry(&mut self, key: &str) -> Result<SessionRecord> {
        let record = self
            .store
            .get(key)?
            .with_context(|| format!("no settlement record for {key}"))?;
        match record.status {
            SessionStatus::Pending | SessionStatus::Failed => self.submit(record).await,
            SessionStatus::Submitted => self.reconcile(key).await,
            SessionStatus::Claimable => self.claim(key).await,
            SessionStatus::Claimed => bail!("record {key} is already claimed"),
        }
    }

    /// Claim the reward of a Claimable record. On success the record is
    /// deleted from the store; on failure it is retained per the error
    /// class and the claim may be retried.
    pub async fn claim(&mut self, key: &str) -> Result<SessionRecord> {
        let mut record = self
            .store
            .get(key)?
            .with_context(|| format!("no settlement record for {key}"))?;
        if record.status != SessionStatus::Claimable {
            bail!(
                "record {key} is not claimable (status {:?})",
                record.status
            );
        }
        let id = record
            .session_id
            .context("claimable record is missing its session id")?;

        self.begin_op(key)?;
        let was_idle = self.phase == Phase::Idle;
        if was_idle {
            self.phase = Phase::Claiming;
        }

        let outcome = self.call(self.client.claim_reward(id)).await;

        self.end_op(key);
        if was_idle {
            self.phase = Phase::Idle;
        }

        match outcome {
            Ok(()) => {
                // Only now is the work no longer outstanding.
                self.store.delete(key)?;
                record.status = SessionStatus::Claimed;
                info!(%id, amount = record.potential_reward, "reward claimed");
                Ok(record)
            }
            Err(err @ (SettleError::Transient(_) | SettleError::UserRejected)) => {
                // Record stays Claimable; the user can try again.
                warn!(%id, %err, "claim attempt failed; record retained");
                Err(err.into())
            }
            Err(err) => {
                record.status = SessionStatus::Failed;
                record.failure = Some(err.to_string());
                self.store.put(&record)?;
                error!(%id, %err, "claim rejected by the ledger");
                Err(err.into())
            }
        }
    }

    /// Resubmit a Failed round under a brand-new ledger session. The path
    /// out of an InvalidSession failure: the stats are still locally known
    /// even though the ledger never saw the original session.
    pub async fn resubmit_as_fresh(&mut self, key: &str) -> Result<SessionRecord> {
        let mut record = self
            .store
            .get(key)?
            .with_context(|| format!("no settlement record for {key}"))?;
        if record.status != SessionStatus::Failed {
            bail!("only failed records can be resubmitted as fresh sessions");
        }

        let id = self
            .call(self.client.start_session())
            .await
            .context("starting a fresh session")?;

        // Re-key under the new session id.
        self.store.delete(key)?;
        record.session_id = Some(id);
        record.status = SessionStatus::Pending;
        record.failure = None;
        self.store.put(&record)?;
        info!(%id, "round resubmitted under a fresh session");

        self.submit(record).await
    }

    /// Materialize a Claimable record for a session known to the ledger
    /// but absent from the local store (e.g. after switching devices).
    /// Returns None if the session's reward was already claimed.
    pub async fn import_remote(&mut self, id: SessionId) -> Result<Option<SessionRecord>> {
        let view = self
            .call(self.client.get_session(id))
            .await
            .context("looking up remote session")?;
        if view.reward_claimed {
            return Ok(None);
        }

        let mut record = SessionRecord::pending(
            Some(id),
            FinalStats {
                score: view.final_score,
                level: view.final_level,
                lines: view.final_lines,
            },
            view.reward_amount,
        );
        record.status = SessionStatus::Claimable;
        self.store.put(&record)?;
        info!(%id, "imported unclaimed session from ledger");
        Ok(Some(record))
    }

    /// Poll the ledger until it reflects a Submitted record's stats and
    /// promote it to Claimable. For records whose submission was acked
    /// but never confirmed (e.g. a crash mid-poll).
    pub async fn reconcile(&mut self, key: &str) -> Result<SessionRecord> {
        let record = self
            .store
            .get(key)?
            .with_context(|| format!("no settlement record for {key}"))?;
        if record.status != SessionStatus::Submitted {
            bail!(
                "record {key} is not awaiting confirmation (status {:?})",
                record.status
            );
        }
        self.confirm(record).await
    }

    /// Drop a Failed record at the user's request. The only way settlement
    /// work disappears without reaching Claimed.
    pub fn discard(&mut self, key: &str) -> Result<()> {
        let record = self
            .store
            .get(key)?
            .with_context(|| format!("no settlement record for {key}"))?;
        if record.status != SessionStatus::Failed {
            bail!("only failed records can be discarded");
        }
        self.store.delete(key)?;
        info!(key, "failed settlement record discarded");
        Ok(())
    }

    /// Submit a record's final stats, retrying transient failures with
    /// exponential backoff, then poll for ledger confirmation.
    async fn submit(&mut self, mut record: SessionRecord) -> Result<SessionRecord> {
        let key = record.key();
        let Some(id) = record.session_id else {
            // The remote start never succeeded; there is no session to
            // submit to. Keep the record Failed so the fresh-session path
            // stays available.
            record.status = SessionStatus::Failed;
            record.failure = Some("round has no remote session".to_string());
            self.store.put(&record)?;
            warn!(key = %key, "cannot submit a round without a remote session");
            return Ok(record);
        };

        self.begin_op(&key)?;
        let hash = proof_hash(
            id,
            record.final_score,
            record.final_level,
            record.final_lines,
            &self.config.player,
        );

        let mut attempt = 0u32;
        let mut delay = self.config.retry_base_delay;
        let outcome = loop {
            let call = self.client.end_session(
                id,
                record.final_score,
                record.final_level,
                record.final_lines,
                &hash,
            );
            match self.call(call).await {
                Ok(()) => break Ok(()),
                Err(err) if err.is_retryable() && attempt + 1 < self.config.retry_attempts => {
                    attempt += 1;
                    warn!(%id, attempt, %err, "end_session failed, backing off");
                    sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                Err(err) => break Err(err),
            }
        };
        self.end_op(&key);

        match outcome {
            Ok(()) => {
                record.status = SessionStatus::Submitted;
                record.failure = None;
                self.store.put(&record)?;
                info!(%id, "final stats submitted");
                self.confirm(record).await
            }
            Err(SettleError::UserRejected) => {
                // Keep the record in its prior state; retry is a
                // deliberate user action, never automatic.
                warn!(%id, "user rejected the submission");
                Ok(record)
            }
            Err(err) => {
                record.status = SessionStatus::Failed;
                record.failure = Some(err.to_string());
                self.store.put(&record)?;
                error!(%id, %err, "submission failed");
                Ok(record)
            }
        }
    }

    /// Poll `get_session` until the ledger reflects the submitted stats,
    /// then promote the record to Claimable. Bounded; a record left in
    /// Submitted can be confirmed later via `retry`.
    async fn confirm(&mut self, mut record: SessionRecord) -> Result<SessionRecord> {
        let Some(id) = record.session_id else {
            return Ok(record);
        };

        for attempt in 0..self.config.confirm_attempts {
            if attempt > 0 {
                sleep(self.config.confirm_interval).await;
            }
            match self.call(self.client.get_session(id)).await {
                Ok(view)
                    if view.final_score == record.final_score
                        && view.final_lines == record.final_lines =>
                {
                    record.status = SessionStatus::Claimable;
                    // The ledger's reward figure supersedes the estimate.
                    record.potential_reward = view.reward_amount;
                    self.store.put(&record)?;
                    info!(%id, "ledger confirmed session stats");
                    return Ok(record);
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(%id, attempt, %err, "confirmation poll failed");
                }
            }
        }

        warn!(%id, "ledger confirmation not observed; record stays submitted");
        Ok(record)
    }

    /// Run a settlement call under the configured timeout, classifying
    /// elapse as a transient failure.
    async fn call<T>(
        &self,
        op: impl Future<Output = Result<T, SettleError>>,
    ) -> Result<T, SettleError> {
        match timeout(self.config.call_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(SettleError::Transient(format!(
                "call exceeded {:?}",
                self.config.call_timeout
            ))),
        }
    }

    /// At most one in-flight settlement call per record.
    fn begin_op(&mut self, key: &str) -> Result<()> {
        if !self.in_flight.insert(key.to_string()) {
            bail!("a settlement call for {key} is already in flight");
        }
        Ok(())
    }

    fn end_op(&mut self, key: &str) {
        self.in_flight.remove(key);
    }
}
