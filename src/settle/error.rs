//! Settlement error taxonomy
//!
//! Every remote-operation failure is classified into one of these at the
//! session controller boundary. The class decides the retry policy: only
//! transient failures are ever retried automatically.

use thiserror::Error;

use crate::settle::record::SessionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettleError {
    /// Timeout or connectivity loss. Retry later from the persisted record.
    #[error("transient network failure: {0}")]
    Transient(String),

    /// The player declined to authorize the operation. Keep the record in
    /// its prior state; retry only on a deliberate user action.
    #[error("user rejected the authorization request")]
    UserRejected,

    /// The ledger does not recognize the session. Fatal for the record;
    /// the stats may be resubmitted under a fresh session.
    #[error("session {0} is unknown to the ledger")]
    InvalidSession(SessionId),

    /// The contract rejected the call (revert). Fatal; never blind-retried.
    #[error("ledger rejected the call: {0}")]
    LedgerRejected(String),
}

impl SettleError {
    /// Whether an automatic retry may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SettleError::Transient(_))
    }

    /// Whether the failure permanently invalidates the attempted call.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SettleError::InvalidSession(_) | SettleError::LedgerRejected(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(SettleError::Transient("timeout".into()).is_retryable());
        assert!(!SettleError::UserRejected.is_retryable());
        assert!(!SettleError::InvalidSession(SessionId(1)).is_retryable());
        assert!(!SettleError::LedgerRejected("already claimed".into()).is_retryable());
    }

    #[test]
    fn test_fatal_classes() {
        assert!(SettleError::InvalidSession(SessionId(1)).is_fatal());
        assert!(SettleError::LedgerRejected("revert".into()).is_fatal());
        assert!(!SettleError::Transient("timeout".into()).is_fatal());
        assert!(!SettleError::UserRejected.is_fatal());
    }
}
