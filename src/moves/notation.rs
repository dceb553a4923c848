//! Textual move formats: coordinate notation in and out, SAN out.

use crate::moves::attacks::Attacks;
use crate::moves::generate::{in_check, legal_moves};
use crate::moves::types::{Move, MoveList};
use crate::piece;
use crate::position::Position;
use crate::square::Square;

/// Resolve coordinate notation (`e2e4`, `e7e8q`) against the legal moves of
/// `position`. Returns [`Move::NONE`] when the text does not name a legal
/// move; callers must reject the sentinel.
pub fn coordinate_to_move(position: &mut Position, attacks: &mut Attacks, text: &str) -> Move {
    if text.len() < 4 || text.len() > 5 {
        return Move::NONE;
    }
    let Ok(from) = text[0..2].parse::<Square>() else {
        return Move::NONE;
    };
    let Ok(to) = text[2..4].parse::<Square>() else {
        return Move::NONE;
    };
    let promotion = match text.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(piece::QUEEN),
        Some(b'r') => Some(piece::ROOK),
        Some(b'b') => Some(piece::BISHOP),
        Some(b'n') => Some(piece::KNIGHT),
        Some(_) => return Move::NONE,
    };

    let mut list = MoveList::new();
    legal_moves(position, attacks, &mut list);
    for &mv in list.iter() {
        if mv.from() != from || mv.to() != to {
            continue;
        }
        if mv.is_promotion() {
            if promotion == Some(piece::kind(mv.promotion())) {
                return mv;
            }
        } else if promotion.is_none() {
            return mv;
        }
    }
    Move::NONE
}

/// Standard algebraic notation for a legal move of `position`.
///
/// Disambiguates by file, then rank, then the full square; pawn captures
/// always name the from-file; `+`/`#` are appended from the post-move
/// position. The position comes back untouched.
pub fn san(position: &mut Position, attacks: &mut Attacks, mv: Move) -> String {
    let mut out = String::new();

    if mv.is_castle() {
        out.push_str(if mv.to().file() == 6 { "O-O" } else { "O-O-O" });
    } else {
        let kind = piece::kind(mv.piece());
        if let Some(letter) = piece::san_letter(kind) {
            if kind != piece::KING {
                out.push(letter);
                out.push_str(&disambiguation(position, attacks, mv));
            } else {
                out.push(letter);
            }
            if mv.is_capture() {
                out.push('x');
            }
        } else {
            // Pawn: captures name the origin file.
            if mv.is_capture() {
                out.push((b'a' + mv.from().file()) as char);
                out.push('x');
            }
        }
        out.push_str(&mv.to().to_string());
        if mv.is_promotion() {
            out.push('=');
            if let Some(letter) = piece::san_letter(piece::kind(mv.promotion())) {
                out.push(letter);
            }
        }
    }

    position.make(mv);
    let replies = {
        let mut list = MoveList::new();
        legal_moves(position, attacks, &mut list)
    };
    let gives_check = in_check(position, attacks, position.side_to_move);
    position.unmake(mv);

    if gives_check {
        out.push(if replies == 0 { '#' } else { '+' });
    }
    out
}

/// Origin qualifier when several pieces of the same kind reach the same
/// target square.
fn disambiguation(position: &mut Position, attacks: &mut Attacks, mv: Move) -> String {
    let mut list = MoveList::new();
    legal_moves(position, attacks, &mut list);

    let mut same_file = false;
    let mut same_rank = false;
    let mut rivals = false;
    for &other in list.iter() {
        if other == mv
            || other.piece() != mv.piece()
            || other.to() != mv.to()
            || other.from() == mv.from()
        {
            continue;
        }
        rivals = true;
        if other.from().file() == mv.from().file() {
            same_file = true;
        }
        if other.from().rank() == mv.from().rank() {
            same_rank = true;
        }
    }

    if !rivals {
        String::new()
    } else if !same_file {
        ((b'a' + mv.from().file()) as char).to_string()
    } else if !same_rank {
        ((b'0' + mv.from().rank()) as char).to_string()
    } else {
        mv.from().to_string()
    }
}
