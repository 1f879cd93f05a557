//! Piece tests - shape matrices, rotation, spawn anchoring

use stackmint::core::{Board, Piece, Shape};
use stackmint::types::{PieceKind, BOARD_WIDTH, PIECE_KINDS};

#[test]
fn test_seven_canonical_shapes() {
    for kind in PIECE_KINDS {
        let shape = Shape::of(kind);
        assert_eq!(shape.offsets().len(), 4, "{:?} must have 4 cells", kind);
        assert!(shape.rows() <= 4 && shape.cols() <= 4);
    }
}

#[test]
fn test_spawn_horizontally_centered_top_row() {
    for kind in PIECE_KINDS {
        let piece = Piece::spawn(kind);
        assert_eq!(piece.y, 0, "{:?} spawns on the top row", kind);

        let width = piece.shape.cols();
        assert_eq!(
            piece.x,
            ((BOARD_WIDTH - width) / 2) as i8,
            "{:?} spawns centered",
            kind
        );
    }
}

#[test]
fn test_spawned_pieces_fit_empty_board() {
    let board = Board::new();
    for kind in PIECE_KINDS {
        assert!(Piece::spawn(kind).fits(&board), "{:?}", kind);
    }
}

#[test]
fn test_rotation_preserves_cell_count() {
    for kind in PIECE_KINDS {
        let mut shape = Shape::of(kind);
        for _ in 0..4 {
            shape = shape.rotated();
            assert_eq!(shape.offsets().len(), 4, "{:?}", kind);
        }
    }
}

#[test]
fn test_full_turn_restores_shape() {
    for kind in PIECE_KINDS {
        let shape = Shape::of(kind);
        assert_eq!(shape.rotated().rotated().rotated().rotated(), shape);
    }
}

#[test]
fn test_i_piece_rotation() {
    let horizontal = Shape::of(PieceKind::I);
    assert_eq!((horizontal.rows(), horizontal.cols()), (1, 4));

    let vertical = horizontal.rotated();
    assert_eq!((vertical.rows(), vertical.cols()), (4, 1));
    for y in 0..4 {
        assert!(vertical.filled(0, y));
    }
}

#[test]
fn test_fits_respects_walls() {
    let board = Board::new();

    // An I piece at the right edge: x=6 covers columns 6..=9, x=7 pokes out.
    let piece = Piece {
        x: 6,
        ..Piece::spawn(PieceKind::I)
    };
    assert!(piece.fits(&board));
    assert!(!piece.moved(1, 0).fits(&board));
}

#[test]
fn test_fits_allows_rows_above_board() {
    let board = Board::new();
    let piece = Piece {
        y: -2,
        shape: Shape::of(PieceKind::I).rotated(),
        ..Piece::spawn(PieceKind::I)
    };
    // Vertical I with two cells above the board still fits.
    assert!(piece.fits(&board));
}

#[test]
fn test_fits_respects_occupancy() {
    let mut board = Board::new();
    let piece = Piece::spawn(PieceKind::O);
    assert!(piece.fits(&board));

    board.set(piece.x, 0, Some(PieceKind::L));
    assert!(!piece.fits(&board));
}
