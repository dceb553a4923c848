//! Zobrist hashing material.
//!
//! One 64-bit random word per (piece id, square), per castling right, per
//! en-passant file and one for the side to move. The en-passant word is
//! indexed by file only and is XORed whenever an en-passant square is
//! recorded, whether or not a capturing pawn actually exists; two positions
//! that differ only in that dead right therefore hash apart. That mirrors
//! the incremental update in `position::make` exactly, which is all key
//! parity requires.

use crate::piece;
use crate::position::Position;
use crate::random::Xorshift;
use once_cell::sync::OnceCell;

/// Fixed seed so keys reproduce across runs and platforms.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    /// `[piece id][square]`; the colour-only ids 0 and 1 stay zero, no piece
    /// ever carries them.
    pub piece_square: [[u64; 64]; piece::MAX],
    pub castle_kingside: [u64; 2],
    pub castle_queenside: [u64; 2],
    /// Indexed by file a–h.
    pub en_passant: [u64; 8],
    /// XORed in when Black is to move.
    pub colour: u64,
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(generate_keys)
}

fn generate_keys() -> ZobristKeys {
    let mut rng = Xorshift::new(ZOBRIST_SEED);

    let mut keys = ZobristKeys {
        piece_square: [[0u64; 64]; piece::MAX],
        castle_kingside: [0u64; 2],
        castle_queenside: [0u64; 2],
        en_passant: [0u64; 8],
        colour: 0,
    };

    for id in 2..piece::MAX {
        for sq in 0..64 {
            keys.piece_square[id][sq] = rng.next_u64();
        }
    }
    for colour in 0..2 {
        keys.castle_kingside[colour] = rng.next_u64();
        keys.castle_queenside[colour] = rng.next_u64();
    }
    for file in 0..8 {
        keys.en_passant[file] = rng.next_u64();
    }
    keys.colour = rng.next_u64();

    keys
}

/// Full recomputation from board state. The incremental key must match this
/// after every make/unmake.
pub fn compute_key(position: &Position) -> u64 {
    let keys = zobrist_keys();
    let mut key = 0u64;

    for sq in 0..64 {
        let piece = position.square[sq];
        if piece != piece::EMPTY {
            key ^= keys.piece_square[piece as usize][sq];
        }
    }
    if let Some(ep) = position.en_passant_square {
        key ^= keys.en_passant[ep.file() as usize];
    }
    for colour in 0..2 {
        if position.castle_kingside[colour] > 0 {
            key ^= keys.castle_kingside[colour];
        }
        if position.castle_queenside[colour] > 0 {
            key ^= keys.castle_queenside[colour];
        }
    }
    if position.side_to_move == piece::BLACK {
        key ^= keys.colour;
    }

    key
}
