//! stackmint - block-stacking minigame with on-ledger session settlement
//!
//! The crate splits into two decoupled halves:
//!
//! - [`core`]: the pure, synchronous game simulation. A round's
//!   [`core::RunState`] is ephemeral; losing it mid-game loses nothing
//!   durable.
//! - [`settle`]: the async settlement side. The moment a round ends its
//!   final stats become a durable [`settle::SessionRecord`], and the
//!   [`settle::SessionController`] walks it through the remote ledger's
//!   start/end/claim lifecycle, surviving crashes via the recovery store.

pub mod core;
pub mod settle;
pub mod types;
