//! RNG module - uniform random piece generation
//!
//! Each draw is an independent uniform pick over the 7 tetromino kinds.
//! The production generator seeds itself from the system clock: the
//! sequence is infinite, non-restartable, and makes no reproducibility
//! guarantee. Tests seed explicitly for determinism.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::Piece;
use crate::types::{PieceKind, PIECE_KINDS};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }
}

/// Infinite stream of spawn-ready pieces.
#[derive(Debug, Clone)]
pub struct PieceGen {
    rng: SimpleRng,
}

impl PieceGen {
    /// Create a generator seeded from the system clock.
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(1);
        Self::with_seed(nanos)
    }

    /// Create a generator with an explicit seed (deterministic, for tests).
    pub fn with_seed(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Draw the next piece kind uniformly at random.
    pub fn next_kind(&mut self) -> PieceKind {
        PIECE_KINDS[self.rng.next_range(PIECE_KINDS.len() as u32) as usize]
    }

    /// Draw the next piece at its spawn anchor.
    pub fn next(&mut self) -> Piece {
        Piece::spawn(self.next_kind())
    }
}

impl Default for PieceGen {
    fn default() -> Self {
        Self::new()
    }
}
