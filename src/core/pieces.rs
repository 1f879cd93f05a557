//! Pieces module - tetromino shape matrices and rotation
//!
//! Each piece is a small 2-D boolean matrix plus an anchor at the top-left
//! of its bounding box. Rotation is transpose-and-reverse (90 degrees
//! clockwise) of the matrix; there is no wall-kick offset search, so a
//! rotation that collides at the current anchor is simply rejected by the
//! simulator.

use arrayvec::ArrayVec;

use crate::core::Board;
use crate::types::{PieceKind, BOARD_WIDTH};

/// Maximum side length of a shape matrix (the I piece).
const MAX_DIM: usize = 4;

/// Shape matrix of a piece, up to 4x4 with explicit dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [[bool; MAX_DIM]; MAX_DIM],
}

impl Shape {
    const fn from_rows<const R: usize, const C: usize>(rows: [[bool; C]; R]) -> Self {
        let mut cells = [[false; MAX_DIM]; MAX_DIM];
        let mut y = 0;
        while y < R {
            let mut x = 0;
            while x < C {
                cells[y][x] = rows[y][x];
                x += 1;
            }
            y += 1;
        }
        Self {
            rows: R as u8,
            cols: C as u8,
            cells,
        }
    }

    /// Canonical (spawn) shape for a piece kind
    pub fn of(kind: PieceKind) -> Self {
        match kind {
            PieceKind::I => I_SHAPE,
            PieceKind::O => O_SHAPE,
            PieceKind::T => T_SHAPE,
            PieceKind::S => S_SHAPE,
            PieceKind::Z => Z_SHAPE,
            PieceKind::J => J_SHAPE,
            PieceKind::L => L_SHAPE,
        }
    }

    /// Matrix height in rows
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Matrix width in columns
    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Whether the matrix cell at (x, y) is filled.
    /// Out-of-matrix coordinates are empty.
    pub fn filled(&self, x: u8, y: u8) -> bool {
        if y >= self.rows || x >= self.cols {
            return false;
        }
        self.cells[y as usize][x as usize]
    }

    /// Offsets of the filled cells relative to the anchor.
    /// Every tetromino has exactly 4.
    pub fn offsets(&self) -> ArrayVec<(i8, i8), 4> {
        let mut out = ArrayVec::new();
        for y in 0..self.rows {
            for x in 0..self.cols {
                if self.cells[y as usize][x as usize] {
                    out.push((x as i8, y as i8));
                }
            }
        }
        out
    }

    /// Rotate 90 degrees clockwise: transpose then reverse each row.
    /// An R x C matrix becomes C x R.
    pub fn rotated(&self) -> Self {
        let mut cells = [[false; MAX_DIM]; MAX_DIM];
        for y in 0..self.rows as usize {
            for x in 0..self.cols as usize {
                if self.cells[y][x] {
                    cells[x][self.rows as usize - 1 - y] = true;
                }
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }
}

const I_SHAPE: Shape = Shape::from_rows([[true, true, true, true]]);
const O_SHAPE: Shape = Shape::from_rows([[true, true], [true, true]]);
const T_SHAPE: Shape = Shape::from_rows([[true, true, true], [false, true, false]]);
const S_SHAPE: Shape = Shape::from_rows([[false, true, true], [true, true, false]]);
const Z_SHAPE: Shape = Shape::from_rows([[true, true, false], [false, true, true]]);
const J_SHAPE: Shape = Shape::from_rows([[true, false, false], [true, true, true]]);
const L_SHAPE: Shape = Shape::from_rows([[false, false, true], [true, true, true]]);

/// Active falling piece: kind, current shape matrix, and anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Create a piece at its spawn anchor: horizontally centered, top row.
    pub fn spawn(kind: PieceKind) -> Self {
        let shape = Shape::of(kind);
        let x = ((BOARD_WIDTH - shape.cols()) / 2) as i8;
        Self { kind, shape, x, y: 0 }
    }

    /// Check that every filled cell maps to an open board cell.
    pub fn fits(&self, board: &Board) -> bool {
        self.shape
            .offsets()
            .iter()
            .all(|&(dx, dy)| board.is_open(self.x + dx, self.y + dy))
    }

    /// The piece translated by (dx, dy).
    pub fn moved(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// The piece rotated clockwise at the same anchor.
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated(),
            ..*self
        }
    }
}
