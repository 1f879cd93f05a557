//! Core types shared across the crate
//! This module contains pure data types with no external dependencies

/// Board dimensions
pub const BOARD_WIDTH: u8 = 10;
pub const BOARD_HEIGHT: u8 = 20;

/// Gravity timing (in milliseconds)
///
/// The auto-drop period is `BASE_DROP_MS - (level - 1) * DROP_STEP_MS`,
/// clamped at `DROP_FLOOR_MS`.
pub const BASE_DROP_MS: u32 = 1000;
pub const DROP_STEP_MS: u32 = 100;
pub const DROP_FLOOR_MS: u32 = 100;

/// Scoring: every lock is worth `LOCK_BONUS`, plus
/// `lines * LINE_VALUE * level` when lines are cleared.
pub const LINE_VALUE: u32 = 100;
pub const LOCK_BONUS: u32 = 10;

/// Level advances every `LINES_PER_LEVEL` total lines cleared.
pub const LINES_PER_LEVEL: u32 = 10;

/// Tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

/// All seven kinds, in draw-table order.
pub const PIECE_KINDS: [PieceKind; 7] = [
    PieceKind::I,
    PieceKind::O,
    PieceKind::T,
    PieceKind::S,
    PieceKind::Z,
    PieceKind::J,
    PieceKind::L,
];

impl PieceKind {
    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// Player commands accepted by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
}

/// Cell on the board (None = empty, Some = filled with piece kind)
pub type Cell = Option<PieceKind>;

/// Terminal stats of a finished round.
///
/// Copied out of the run state at game over; everything the settlement
/// side needs survives in here even after the run state is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalStats {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}
