//! Core module - pure game simulation with no external dependencies
//!
//! This module contains all the game rules and per-round state. It has
//! zero dependencies on networking, persistence, or the settlement side.

pub mod board;
pub mod pieces;
pub mod rng;
pub mod run_state;

// Re-export commonly used types
pub use board::Board;
pub use pieces::{Piece, Shape};
pub use rng::{PieceGen, SimpleRng};
pub use run_state::RunState;
