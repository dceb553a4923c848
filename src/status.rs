//! Game-status classification shared by the search's draw detection and by
//! front-end callers.

use crate::moves::attacks::Attacks;
use crate::moves::generate::{in_check, legal_moves};
use crate::moves::types::MoveList;
use crate::piece;
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    Checkmate,
    Stalemate,
    DrawFiftyMove,
    DrawThreefold,
    DrawInsufficient,
}

impl GameStatus {
    #[inline]
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameStatus::Stalemate
                | GameStatus::DrawFiftyMove
                | GameStatus::DrawThreefold
                | GameStatus::DrawInsufficient
        )
    }
}

/// Neither side retains mating material: bare kings, a lone minor, one
/// minor each, or two knights against a bare king.
pub fn insufficient_material(position: &Position) -> bool {
    let heavy = position.pieces(piece::WHITE, piece::PAWN)
        | position.pieces(piece::BLACK, piece::PAWN)
        | position.pieces(piece::WHITE, piece::ROOK)
        | position.pieces(piece::BLACK, piece::ROOK)
        | position.pieces(piece::WHITE, piece::QUEEN)
        | position.pieces(piece::BLACK, piece::QUEEN);
    if heavy != 0 {
        return false;
    }

    let white_knights = position.pieces(piece::WHITE, piece::KNIGHT).count_ones();
    let black_knights = position.pieces(piece::BLACK, piece::KNIGHT).count_ones();
    let white_minors =
        white_knights + position.pieces(piece::WHITE, piece::BISHOP).count_ones();
    let black_minors =
        black_knights + position.pieces(piece::BLACK, piece::BISHOP).count_ones();

    match white_minors + black_minors {
        0 | 1 => true,
        2 => {
            // Two knights cannot force mate; neither can minor versus minor.
            white_knights == 2 || black_knights == 2 || (white_minors == 1 && black_minors == 1)
        }
        _ => false,
    }
}

/// Classify the position for the side to move. Draw rules come before the
/// move-based outcomes; the fifty-move and threefold draws use the
/// claimable thresholds.
pub fn position_status(position: &mut Position, attacks: &mut Attacks) -> GameStatus {
    if position.fifty_moves_clock >= 100 {
        return GameStatus::DrawFiftyMove;
    }
    if insufficient_material(position) {
        return GameStatus::DrawInsufficient;
    }
    if position.has_repeated(3) {
        return GameStatus::DrawThreefold;
    }

    let mut list = MoveList::new();
    if legal_moves(position, attacks, &mut list) == 0 {
        if in_check(position, attacks, position.side_to_move) {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    } else {
        GameStatus::InPlay
    }
}
