//! Session records - the durable unit of settlement work
//!
//! A record is written the moment a round ends, before any network call,
//! and survives process restarts in the recovery store until its reward is
//! claimed or the user discards it.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::types::FinalStats;

/// Identifier assigned by the remote ledger when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settlement lifecycle of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Persisted locally, final stats not yet submitted to the ledger.
    Pending,
    /// Stats submitted, ledger confirmation not yet observed.
    Submitted,
    /// Ledger holds the stats; reward awaiting a user-triggered claim.
    Claimable,
    /// Reward paid out. Terminal; the record is deleted on reaching this.
    Claimed,
    /// A settlement call failed; retained for retry or explicit discard.
    Failed,
}

impl SessionStatus {
    /// Whether the record still represents outstanding work.
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, SessionStatus::Claimed)
    }
}

/// Durable settlement record for one finished round.
///
/// `session_id` is None when the remote start failed; such rounds are
/// still persisted and can later be resubmitted under a fresh session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: Option<SessionId>,
    pub final_score: u32,
    pub final_level: u32,
    pub final_lines: u32,
    pub potential_reward: u64,
    pub status: SessionStatus,
    /// Unix timestamp in milliseconds.
    pub created_at: u64,
    /// Classified reason for the last failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl SessionRecord {
    /// Create a fresh Pending record for a finished round.
    pub fn pending(session_id: Option<SessionId>, stats: FinalStats, potential_reward: u64) -> Self {
        Self {
            session_id,
            final_score: stats.score,
            final_level: stats.level,
            final_lines: stats.lines,
            potential_reward,
            status: SessionStatus::Pending,
            created_at: now_ms(),
            failure: None,
        }
    }

    /// Store key: the ledger session id when known, else a local fallback
    /// derived from the creation time so unstarted rounds stay durable.
    pub fn key(&self) -> String {
        match self.session_id {
            Some(id) => format!("session-{id}"),
            None => format!("local-{}", self.created_at),
        }
    }

    pub fn final_stats(&self) -> FinalStats {
        FinalStats {
            score: self.final_score,
            level: self.final_level,
            lines: self.final_lines,
        }
    }
}

/// Current unix time in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
