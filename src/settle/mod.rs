//! Settlement module - bridges local gameplay and the remote ledger
//!
//! Local rounds finish instantly; settling them against the ledger is
//! slow and failure-prone. Everything in here exists to make that gap
//! safe: a durable store of outstanding work, a typed client boundary,
//! an error taxonomy with per-class retry policy, and the controller
//! state machine tying them together.

pub mod client;
pub mod controller;
pub mod error;
pub mod record;
pub mod reward;
pub mod store;

// Re-export commonly used types
pub use client::{proof_hash, SessionView, SettlementClient};
pub use controller::{ControllerConfig, Phase, SessionController};
pub use error::SettleError;
pub use record::{SessionId, SessionRecord, SessionStatus};
pub use store::{JsonFileStore, MemoryStore, RecoveryStore};
