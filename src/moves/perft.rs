//! Perft: exhaustive legal-move enumeration, the move generator's ground
//! truth.

use crate::moves::attacks::Attacks;
use crate::moves::generate::{in_check, legal_moves};
use crate::moves::types::{Move, MoveList};
use crate::position::Position;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounters {
    pub nodes: u64,
    pub captures: u64,
    pub en_passants: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounters {
    pub fn add(&mut self, other: &PerftCounters) {
        self.nodes += other.nodes;
        self.captures += other.captures;
        self.en_passants += other.en_passants;
        self.castles += other.castles;
        self.promotions += other.promotions;
        self.checks += other.checks;
        self.checkmates += other.checkmates;
    }
}

/// Leaf count to `depth`.
#[instrument(skip(position, attacks), fields(fen = %position))]
pub fn perft(position: &mut Position, attacks: &mut Attacks, depth: u32) -> u64 {
    let nodes = count_nodes(position, attacks, depth);
    debug!(depth, nodes, "perft finished");
    nodes
}

fn count_nodes(position: &mut Position, attacks: &mut Attacks, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut list = MoveList::new();
    legal_moves(position, attacks, &mut list);
    if depth == 1 {
        return list.len() as u64;
    }
    let mut nodes = 0;
    for &mv in list.iter() {
        position.make(mv);
        nodes += count_nodes(position, attacks, depth - 1);
        position.unmake(mv);
    }
    nodes
}

/// Leaf counts with a per-kind breakdown at the horizon.
pub fn perft_counters(position: &mut Position, attacks: &mut Attacks, depth: u32) -> PerftCounters {
    let mut counters = PerftCounters::default();
    if depth == 0 {
        counters.nodes = 1;
        return counters;
    }
    let mut list = MoveList::new();
    legal_moves(position, attacks, &mut list);
    for &mv in list.iter() {
        position.make(mv);
        if depth == 1 {
            counters.nodes += 1;
            if mv.is_capture() {
                counters.captures += 1;
            }
            if mv.is_en_passant() {
                counters.en_passants += 1;
            }
            if mv.is_castle() {
                counters.castles += 1;
            }
            if mv.is_promotion() {
                counters.promotions += 1;
            }
            if in_check(position, attacks, position.side_to_move) {
                counters.checks += 1;
                let mut replies = MoveList::new();
                if legal_moves(position, attacks, &mut replies) == 0 {
                    counters.checkmates += 1;
                }
            }
        } else {
            let child = perft_counters(position, attacks, depth - 1);
            counters.add(&child);
        }
        position.unmake(mv);
    }
    counters
}

/// Root split: one (move, subtree leaf count) row per legal move.
#[instrument(skip(position, attacks))]
pub fn perft_divide(
    position: &mut Position,
    attacks: &mut Attacks,
    depth: u32,
) -> Vec<(Move, u64)> {
    let mut list = MoveList::new();
    legal_moves(position, attacks, &mut list);
    let mut rows = Vec::with_capacity(list.len());
    for &mv in list.iter() {
        position.make(mv);
        let nodes = count_nodes(position, attacks, depth.saturating_sub(1));
        position.unmake(mv);
        debug!(mv = %mv, nodes, "divide row");
        rows.push((mv, nodes));
    }
    rows
}
