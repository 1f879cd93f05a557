//! Run state module - the per-round simulation state machine
//!
//! Owns the board, the active and preview pieces, and the score/level/line
//! counters. Driven by player commands plus a periodic gravity tick whose
//! period shrinks as the level rises. All operations are pure and local:
//! nothing in here can fail at runtime, and the terminal game-over event
//! hands the final stats to the settlement side.

use crate::core::{Board, Piece, PieceGen};
use crate::types::{
    FinalStats, GameAction, BASE_DROP_MS, DROP_FLOOR_MS, DROP_STEP_MS, LINES_PER_LEVEL,
    LINE_VALUE, LOCK_BONUS,
};

/// Complete state of one round
#[derive(Debug, Clone)]
pub struct RunState {
    board: Board,
    active: Option<Piece>,
    next: Piece,
    gen: PieceGen,
    score: u32,
    level: u32,
    lines: u32,
    running: bool,
    drop_timer_ms: u32,
}

impl RunState {
    /// Start a round with the given piece generator.
    pub fn new(mut gen: PieceGen) -> Self {
        let active = gen.next();
        let next = gen.next();
        Self {
            board: Board::new(),
            active: Some(active),
            next,
            gen,
            score: 0,
            level: 1,
            lines: 0,
            running: true,
            drop_timer_ms: 0,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<Piece> {
        self.active
    }

    /// Preview of the next piece.
    pub fn next_piece(&self) -> Piece {
        self.next
    }

    /// Terminal stats for the settlement side.
    pub fn final_stats(&self) -> FinalStats {
        FinalStats {
            score: self.score,
            level: self.level,
            lines: self.lines,
        }
    }

    /// Current gravity period: `max(100, 1000 - (level-1)*100)` ms.
    pub fn drop_interval_ms(&self) -> u32 {
        BASE_DROP_MS
            .saturating_sub(self.level.saturating_sub(1) * DROP_STEP_MS)
            .max(DROP_FLOOR_MS)
    }

    /// Apply a player command.
    ///
    /// Returns the final stats when the command ends the round (only a
    /// soft drop can, by locking the last piece).
    pub fn apply(&mut self, action: GameAction) -> Option<FinalStats> {
        if !self.running {
            return None;
        }
        match action {
            GameAction::MoveLeft => {
                self.try_shift(-1);
                None
            }
            GameAction::MoveRight => {
                self.try_shift(1);
                None
            }
            GameAction::Rotate => {
                self.try_rotate();
                None
            }
            GameAction::SoftDrop => {
                self.drop_timer_ms = 0;
                self.step_down()
            }
        }
    }

    /// Advance the gravity timer by `elapsed_ms`, applying auto-drops as
    /// the period elapses. Returns final stats if the round ended.
    pub fn tick(&mut self, elapsed_ms: u32) -> Option<FinalStats> {
        if !self.running {
            return None;
        }
        self.drop_timer_ms += elapsed_ms;
        while self.drop_timer_ms >= self.drop_interval_ms() {
            self.drop_timer_ms -= self.drop_interval_ms();
            if let Some(stats) = self.step_down() {
                return Some(stats);
            }
        }
        None
    }

    /// Try to shift the active piece horizontally.
    fn try_shift(&mut self, dx: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let moved = active.moved(dx, 0);
        if moved.fits(&self.board) {
            self.active = Some(moved);
            true
        } else {
            false
        }
    }

    /// Try to rotate the active piece in place.
    /// Rejected (no-op) if the rotated shape collides at the current anchor.
    fn try_rotate(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };
        let rotated = active.rotated();
        if rotated.fits(&self.board) {
            self.active = Some(rotated);
            true
        } else {
            false
        }
    }

    /// Move the active piece down one row, locking it if blocked.
    fn step_down(&mut self) -> Option<FinalStats> {
        let Some(active) = self.active else {
            return None;
        };
        let moved = active.moved(0, 1);
        if moved.fits(&self.board) {
            self.active = Some(moved);
            None
        } else {
            self.lock_active()
        }
    }

    /// Merge the active piece into the board, clear lines, score, and
    /// spawn the next piece. Returns final stats on game over.
    fn lock_active(&mut self) -> Option<FinalStats> {
        let Some(active) = self.active.take() else {
            return None;
        };

        self.board
            .merge(&active.shape.offsets(), active.x, active.y, active.kind);

        let cleared = self.board.clear_full_rows().len() as u32;

        // Score with the level in effect at lock time; the new level (if
        // any) applies from the next lock and tick onward.
        self.score += cleared * LINE_VALUE * self.level + LOCK_BONUS;
        self.lines += cleared;
        self.level = self.lines / LINES_PER_LEVEL + 1;

        // Spawn: the queued preview first, then one fresh draw. If neither
        // fits at its spawn anchor the round is over.
        let queued = self.next;
        if queued.fits(&self.board) {
            self.active = Some(queued);
            self.next = self.gen.next();
            return None;
        }
        let fresh = self.gen.next();
        if fresh.fits(&self.board) {
            self.active = Some(fresh);
            self.next = self.gen.next();
            return None;
        }

        self.running = false;
        Some(self.final_stats())
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub fn set_active(&mut self, piece: Piece) {
        self.active = Some(piece);
    }
}
