//! The search kernel.
//!
//! Iterative deepening over a principal variation search: aspiration window
//! on the first root move, zero-window probes on the rest, with quiescence
//! at the frontier. Interior nodes use transposition cutoffs, null-move and
//! mate-distance pruning, check and single-reply extensions, late-move
//! reductions past the tactical prefix, futility pruning at shallow depth
//! and killer/hash move ordering. Time management allocates a slice of the
//! clock up front and can extend it for aspiration researches and for a
//! worsening root value.
//!
//! The search state machine is Idle -> Running -> (Aborting) -> Idle. An
//! external `stop` flips an atomic flag that the recursion polls once per
//! thousand nodes; inner frames then unwind returning +INFINITY, which the
//! root loop discards in favour of the last completed value.

use crate::moves::attacks::Attacks;
use crate::moves::generate::{in_check, is_attacked, legal_moves, quiescence_moves};
use crate::moves::types::{Move, MoveList, MOVES_LIMIT};
use crate::piece;
use crate::position::Position;
use crate::search::eval::evaluate;
use crate::search::ordering;
use crate::search::see::StaticExchange;
use crate::search::tt::{Bound, TranspositionTable};
use crate::search::{CHECKMATE, DEPTH_LIMIT, DRAW_VALUE, INFINITY, NEAR_CHECKMATE, PLY_LIMIT};
use crate::status::insufficient_material;
use crate::bits::{north_fill, south_fill, FILE_A, FILE_H};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering as Memory};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const ASPIRATION_WINDOW: i32 = 17;
const NULL_MOVE_REDUCTION: i32 = 3;
const NULL_MOVE_DEEP_DEPTH: i32 = 7;
const LATE_MOVE_REDUCTION: i32 = 2;
const FUTILITY_MARGINS: [i32; 6] = [0, 104, 125, 250, 271, 375];
/// Abort and clock polling cadence, in nodes.
const NODE_RESOLUTION: u64 = 1000;

/// Root value drop, in centipawns, that buys one loss-extension step.
const LOSS_STEP: i32 = 40;
/// Extra time per loss step, as a share of the base allocation.
const LOSS_EXTENSION: [f64; 5] = [0.0, 0.25, 0.33, 0.5, 1.0];
/// Elapsed share of the allocation past which an aspiration research earns
/// more time.
const RESEARCH_THRESHOLD: f64 = 0.5;
const RESEARCH_EXTENSION: f64 = 0.8;
/// Elapsed share past which a new iteration is not started.
const EARLY_STOP_SHARE: f64 = 0.7;
/// Move latency absorbed by the GUI and transport, in seconds.
const EXPECTED_LATENCY: f64 = 0.05;

pub const DEFAULT_TT_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct Clock {
    pub time_left: Duration,
    pub increment: Duration,
}

/// What bounds a search: a fixed depth, a fixed time per move, or a game
/// clock the engine budgets on its own.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub depth: i32,
    pub move_time: Option<Duration>,
    pub clock: Option<Clock>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            depth: DEPTH_LIMIT,
            move_time: None,
            clock: None,
        }
    }
}

impl Limits {
    pub fn depth(depth: i32) -> Self {
        Limits {
            depth,
            ..Limits::default()
        }
    }

    pub fn move_time(duration: Duration) -> Self {
        Limits {
            move_time: Some(duration),
            ..Limits::default()
        }
    }

    pub fn clock(time_left: Duration, increment: Duration) -> Self {
        Limits {
            clock: Some(Clock {
                time_left,
                increment,
            }),
            ..Limits::default()
        }
    }
}

/// One completed iteration at the root.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub depth: i32,
    pub value: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum State {
    Idle = 0,
    Running = 1,
    Aborting = 2,
}

/// A cloneable handle that can interrupt a running search from another
/// thread.
#[derive(Clone)]
pub struct StopHandle {
    abort: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.state.compare_exchange(
            State::Running as u8,
            State::Aborting as u8,
            Memory::Relaxed,
            Memory::Relaxed,
        );
        self.abort.store(true, Memory::Relaxed);
    }
}

pub struct Engine {
    name: String,
    tt: TranspositionTable,
    attacks: Attacks,
    killers: [[Move; 2]; PLY_LIMIT],
    pv_table: Box<[[Move; PLY_LIMIT]; PLY_LIMIT]>,
    pv_length: [usize; PLY_LIMIT],
    limits: Limits,
    reports: Vec<SearchReport>,

    abort: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    stopped: bool,

    nodes: u64,
    /// Value of the previous completed iteration; aspiration centre.
    root_alpha: i32,
    /// Best value of the iteration in progress; watched for collapses.
    final_alpha: i32,

    start: Instant,
    time_limit: Option<f64>,
    time_extension: f64,
    extension_ceiling: f64,
}

impl Engine {
    pub fn new(tt_bytes: usize) -> Self {
        Engine {
            name: format!("Meridian {}", env!("CARGO_PKG_VERSION")),
            tt: TranspositionTable::new(tt_bytes),
            attacks: Attacks::new(),
            killers: [[Move::NONE; 2]; PLY_LIMIT],
            pv_table: Box::new([[Move::NONE; PLY_LIMIT]; PLY_LIMIT]),
            pv_length: [0; PLY_LIMIT],
            limits: Limits::default(),
            reports: Vec::new(),
            abort: Arc::new(AtomicBool::new(false)),
            state: Arc::new(AtomicU8::new(State::Idle as u8)),
            stopped: false,
            nodes: 0,
            root_alpha: 0,
            final_alpha: 0,
            start: Instant::now(),
            time_limit: None,
            time_extension: 0.0,
            extension_ceiling: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Iteration reports of the last `get_move` call, shallowest first.
    pub fn reports(&self) -> &[SearchReport] {
        &self.reports
    }

    /// Draw offers are taken once the root value sits at or below the draw
    /// score.
    pub fn accepts_draw(&self) -> bool {
        self.final_alpha <= DRAW_VALUE
    }

    /// Request the running search to unwind; idempotent, callable from any
    /// thread through [`StopHandle`].
    pub fn stop(&self) {
        StopHandle {
            abort: Arc::clone(&self.abort),
            state: Arc::clone(&self.state),
        }
        .stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            abort: Arc::clone(&self.abort),
            state: Arc::clone(&self.state),
        }
    }

    /// Forget everything learned: hash table, killers and the root values.
    pub fn reset(&mut self) {
        self.tt.clear();
        self.killers = [[Move::NONE; 2]; PLY_LIMIT];
        self.root_alpha = 0;
        self.final_alpha = 0;
    }

    /// Search `position` within the configured limits and return the best
    /// move found. The position is searched in place through make/unmake
    /// and comes back bit-identical; a stopped search still returns the
    /// best move seen so far.
    pub fn get_move(&mut self, position: &mut Position) -> Move {
        self.state.store(State::Running as u8, Memory::Relaxed);
        self.abort.store(false, Memory::Relaxed);
        self.stopped = false;
        self.nodes = 0;
        self.reports.clear();
        self.pv_length = [0; PLY_LIMIT];
        self.start = Instant::now();
        self.allocate_time(position);

        let best = self.deepen(position);

        self.state.store(State::Idle as u8, Memory::Relaxed);
        best
    }

    fn allocate_time(&mut self, position: &Position) {
        self.time_extension = 0.0;
        self.extension_ceiling = 0.0;
        self.time_limit = if let Some(move_time) = self.limits.move_time {
            Some(move_time.as_secs_f64())
        } else if let Some(clock) = self.limits.clock {
            let time_left = clock.time_left.as_secs_f64();
            let increment = clock.increment.as_secs_f64();
            let divisor = (100.0 - 0.5 * position.half_moves as f64).max(40.0);
            let limit = (time_left - increment) / divisor + increment - EXPECTED_LATENCY;
            self.extension_ceiling = 0.3 * (time_left - increment).max(0.0);
            Some(limit.max(0.01))
        } else {
            None
        };
    }

    #[inline]
    fn aborted(&self) -> bool {
        self.stopped || self.abort.load(Memory::Relaxed)
    }

    /// Clock and abort poll, entered once per [`NODE_RESOLUTION`] nodes.
    fn checkpoint(&mut self) {
        if self.stopped {
            return;
        }
        if self.abort.load(Memory::Relaxed) {
            self.stopped = true;
            return;
        }
        let Some(limit) = self.time_limit else {
            return;
        };

        // A collapsing root value buys extra thinking time.
        if self.root_alpha > -INFINITY && self.final_alpha > -INFINITY {
            let loss = self.root_alpha - self.final_alpha;
            if loss >= LOSS_STEP {
                let step = ((loss / LOSS_STEP) as usize).min(LOSS_EXTENSION.len() - 1);
                let extension =
                    (LOSS_EXTENSION[step] * limit).min(self.extension_ceiling);
                self.time_extension = self.time_extension.max(extension);
            }
        }

        if self.start.elapsed().as_secs_f64() > limit + self.time_extension {
            self.stopped = true;
        }
    }

    fn grant_research_extension(&mut self) {
        let Some(limit) = self.time_limit else {
            return;
        };
        if self.start.elapsed().as_secs_f64() >= RESEARCH_THRESHOLD * limit {
            let extension = (RESEARCH_EXTENSION * limit).min(self.extension_ceiling);
            self.time_extension = self.time_extension.max(extension);
        }
    }

    /// Iterative deepening over the root move list.
    fn deepen(&mut self, position: &mut Position) -> Move {
        let mut moves = MoveList::new();
        legal_moves(position, &mut self.attacks, &mut moves);
        if moves.is_empty() {
            return Move::NONE;
        }
        // With a game clock a forced move is played instantly.
        if moves.len() == 1 && self.limits.clock.is_some() {
            return moves[0];
        }

        self.root_alpha = -INFINITY;
        let depth_limit = self.limits.depth.clamp(1, DEPTH_LIMIT);
        let mut root_pv: Vec<Move> = Vec::new();

        'deepening: for depth in 1..=depth_limit {
            let mut alpha = -INFINITY;

            for index in 0..moves.len() {
                let mv = moves[index];
                position.make(mv);
                let value = if index == 0 {
                    self.search_first_root_move(position, depth, alpha)
                } else {
                    let probe =
                        -self.alpha_beta(position, depth - 1, 1, -(alpha + 1), -alpha, true);
                    if probe > alpha && !self.aborted() {
                        -self.alpha_beta(position, depth - 1, 1, -INFINITY, -alpha, true)
                    } else {
                        probe
                    }
                };
                position.unmake(mv);

                if self.aborted() {
                    break 'deepening;
                }
                if value > alpha {
                    alpha = value;
                    self.final_alpha = alpha;
                    // Stable promotion to the front of the root list.
                    moves[..=index].rotate_right(1);
                    root_pv = self.collect_pv(mv);
                }
            }

            self.root_alpha = alpha;
            self.final_alpha = alpha;

            let elapsed = self.start.elapsed();
            let report = SearchReport {
                depth,
                value: alpha,
                nodes: self.nodes,
                elapsed,
                pv: root_pv.clone(),
            };
            debug!(
                depth,
                value = alpha,
                nodes = self.nodes,
                elapsed_ms = elapsed.as_millis() as u64,
                pv = %join_pv(&report.pv),
                "iteration complete"
            );
            self.reports.push(report);

            if alpha >= NEAR_CHECKMATE {
                break;
            }
            if let Some(limit) = self.time_limit
                && self.time_extension == 0.0
                && elapsed.as_secs_f64() / limit > EARLY_STOP_SHARE
            {
                break;
            }
        }

        moves[0]
    }

    /// First root move: aspiration window around the previous iteration,
    /// full-window research (with a possible time extension) when the
    /// result lands outside it.
    fn search_first_root_move(&mut self, position: &mut Position, depth: i32, alpha: i32) -> i32 {
        debug_assert_eq!(alpha, -INFINITY);
        if self.root_alpha == -INFINITY {
            return -self.alpha_beta(position, depth - 1, 1, -INFINITY, INFINITY, true);
        }
        let low = self.root_alpha - ASPIRATION_WINDOW;
        let high = self.root_alpha + ASPIRATION_WINDOW;
        let value = -self.alpha_beta(position, depth - 1, 1, -high, -low, true);
        if (value <= low || value >= high) && !self.aborted() {
            self.grant_research_extension();
            return -self.alpha_beta(position, depth - 1, 1, -INFINITY, INFINITY, true);
        }
        value
    }

    fn collect_pv(&mut self, first: Move) -> Vec<Move> {
        let mut pv = vec![first];
        pv.extend_from_slice(&self.pv_table[1][..self.pv_length[1]]);
        pv
    }

    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        position: &mut Position,
        depth: i32,
        ply: usize,
        mut alpha: i32,
        mut beta: i32,
        null_allowed: bool,
    ) -> i32 {
        self.pv_length[ply] = 0;
        self.nodes += 1;
        if self.nodes % NODE_RESOLUTION == 0 {
            self.checkpoint();
        }
        if self.aborted() {
            return INFINITY;
        }
        if ply >= PLY_LIMIT - 1 {
            return evaluate(position, &mut self.attacks);
        }

        let us = position.side_to_move;
        let in_check_now = in_check(position, &mut self.attacks, us);

        if depth <= 0 && !in_check_now {
            return self.quiescence(position, ply, alpha, beta);
        }

        // Draw detection: fifty moves, dead material, repetition. Past the
        // first couple of plies a single repetition already scores as the
        // draw it can be steered into.
        let repetitions = if ply >= 3 { 2 } else { 3 };
        if position.fifty_moves_clock >= 100
            || insufficient_material(position)
            || position.has_repeated(repetitions)
        {
            return draw_value(ply);
        }

        // Mate-distance pruning.
        alpha = alpha.max(-(CHECKMATE - ply as i32));
        beta = beta.min(CHECKMATE - ply as i32 - 1);
        if alpha >= beta {
            return alpha;
        }

        let mut hash_move = Move::NONE;
        if let Some((mv, value, stored_depth, bound)) = self.tt.probe(position.key, ply as i32) {
            hash_move = mv;
            if stored_depth >= depth {
                match bound {
                    Bound::Exact => return value,
                    Bound::Alpha if value >= beta => return value,
                    Bound::Beta if value <= alpha => return value,
                    _ => {}
                }
            }
        }

        // Null move: hand over the turn; if even that fails high, prune.
        if null_allowed && !in_check_now && depth >= 2 && position.has_pieces(us) {
            let reduction =
                NULL_MOVE_REDUCTION + (depth >= NULL_MOVE_DEEP_DEPTH) as i32;
            position.make_null();
            let value = -self.alpha_beta(
                position,
                depth - 1 - reduction,
                ply + 1,
                -beta,
                -beta + 1,
                false,
            );
            position.unmake_null();
            if self.aborted() {
                return INFINITY;
            }
            if value >= beta {
                return value;
            }
        }

        let mut moves = MoveList::new();
        let count = legal_moves(position, &mut self.attacks, &mut moves);
        if count == 0 {
            return if in_check_now {
                -(CHECKMATE - ply as i32)
            } else {
                draw_value(ply)
            };
        }

        // Check and single-reply extensions.
        let depth = depth + (in_check_now || count == 1) as i32;

        let mut scores = [0f64; MOVES_LIMIT];
        ordering::score_moves(&moves, &mut scores[..count], self.killers[ply], hash_move);
        ordering::sort_moves(&mut moves[..], &mut scores[..count]);
        let irreducible = ordering::irreducible_moves(&scores[..count]);

        let prevention = passed_pawn_prevention(position, us);
        let futile_depth = (depth as usize) < FUTILITY_MARGINS.len() && !in_check_now;
        let static_value = if futile_depth {
            evaluate(position, &mut self.attacks)
        } else {
            0
        };

        let mut best_move = Move::NONE;
        let mut bound = Bound::Beta;

        for index in 0..count {
            let mv = moves[index];
            position.make(mv);

            let causes_check = in_check(position, &mut self.attacks, position.side_to_move);
            let dangerous = in_check_now
                || causes_check
                || alpha < -NEAR_CHECKMATE
                || dangerous_pawn_advance(mv, prevention);

            // Futility: a quiet move that cannot lift a hopeless static
            // value over alpha is skipped outright.
            if futile_depth
                && !dangerous
                && static_value + FUTILITY_MARGINS[depth as usize] + piece::value(mv.captured())
                    <= alpha
            {
                position.unmake(mv);
                continue;
            }

            let value = if index == 0 {
                -self.alpha_beta(position, depth - 1, ply + 1, -beta, -alpha, true)
            } else {
                let reduced = index >= irreducible && !dangerous;
                let probe = if reduced {
                    -self.alpha_beta(
                        position,
                        depth - 1 - LATE_MOVE_REDUCTION,
                        ply + 1,
                        -(alpha + 1),
                        -alpha,
                        true,
                    )
                } else {
                    -self.alpha_beta(position, depth - 1, ply + 1, -(alpha + 1), -alpha, true)
                };
                if probe > alpha && !self.aborted() {
                    -self.alpha_beta(position, depth - 1, ply + 1, -beta, -alpha, true)
                } else {
                    probe
                }
            };

            position.unmake(mv);
            if self.aborted() {
                return INFINITY;
            }

            if value >= beta {
                self.tt
                    .store(position.key, mv, depth, Bound::Alpha, value, ply as i32);
                // Only reducible cutoffs become killers, the same test LMR
                // eligibility uses above.
                if index >= irreducible && !dangerous {
                    self.killers[ply][1] = self.killers[ply][0];
                    self.killers[ply][0] = mv;
                }
                return value;
            }
            if value > alpha {
                alpha = value;
                best_move = mv;
                bound = Bound::Exact;

                self.pv_table[ply][0] = mv;
                let child_length = self.pv_length[ply + 1];
                for i in 0..child_length {
                    self.pv_table[ply][i + 1] = self.pv_table[ply + 1][i];
                }
                self.pv_length[ply] = child_length + 1;
            }
        }

        self.tt
            .store(position.key, best_move, depth, bound, alpha, ply as i32);
        alpha
    }

    fn quiescence(&mut self, position: &mut Position, ply: usize, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;
        if self.nodes % NODE_RESOLUTION == 0 {
            self.checkpoint();
        }
        if self.aborted() {
            return INFINITY;
        }
        if ply >= PLY_LIMIT - 1 {
            return evaluate(position, &mut self.attacks);
        }

        let stand_pat = evaluate(position, &mut self.attacks);
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut hash_move = Move::NONE;
        if let Some((mv, value, _, bound)) = self.tt.probe(position.key, ply as i32) {
            match bound {
                Bound::Exact => return value,
                Bound::Alpha if value >= beta => return value,
                Bound::Beta if value <= alpha => return value,
                _ => {}
            }
            if mv.is_capture() {
                hash_move = mv;
            }
        }

        let mut moves = MoveList::new();
        let count = quiescence_moves(position, &mut self.attacks, &mut moves);
        if count == 0 {
            return alpha;
        }

        let mut scores = [0f64; MOVES_LIMIT];
        ordering::score_moves(&moves, &mut scores[..count], [Move::NONE; 2], hash_move);
        ordering::sort_moves(&mut moves[..], &mut scores[..count]);

        let us = position.side_to_move;
        let mut best_move = Move::NONE;
        let mut bound = Bound::Beta;

        for index in 0..count {
            let mv = moves[index];
            // Exchanges that lose material cannot improve a quiet search.
            if position.see(&mut self.attacks, mv) < 0 {
                continue;
            }
            position.make(mv);
            // The set is pseudo-legal; reject moves that expose the king.
            let king = position.king_square(us);
            if is_attacked(position, &mut self.attacks, king, position.side_to_move) {
                position.unmake(mv);
                continue;
            }
            let value = -self.quiescence(position, ply + 1, -beta, -alpha);
            position.unmake(mv);
            if self.aborted() {
                return INFINITY;
            }
            if value >= beta {
                self.tt
                    .store(position.key, mv, 0, Bound::Alpha, value, ply as i32);
                return value;
            }
            if value > alpha {
                alpha = value;
                best_move = mv;
                bound = Bound::Exact;
            }
        }

        self.tt
            .store(position.key, best_move, 0, bound, alpha, ply as i32);
        alpha
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(DEFAULT_TT_BYTES)
    }
}

/// Draw scores alternate sign with the ply so the root player always reads
/// [`DRAW_VALUE`].
#[inline]
const fn draw_value(ply: usize) -> i32 {
    if ply % 2 == 0 { DRAW_VALUE } else { -DRAW_VALUE }
}

/// Squares on which an advance of a side-to-move pawn can still be stopped:
/// the enemy pawns' forward fill towards that side plus its attack span. A
/// pawn push landing outside the mask is on its way to promotion.
fn passed_pawn_prevention(position: &Position, us: u8) -> u64 {
    let enemy_pawns = position.pieces(piece::opponent(us), piece::PAWN);
    if us == piece::WHITE {
        // Black pawns advance towards rank 1 (growing indices).
        let fill = south_fill(enemy_pawns);
        fill | ((fill & !FILE_H) << 9) | ((fill & !FILE_A) << 7)
    } else {
        let fill = north_fill(enemy_pawns);
        fill | ((fill & !FILE_H) >> 7) | ((fill & !FILE_A) >> 9)
    }
}

#[inline]
fn dangerous_pawn_advance(mv: Move, prevention: u64) -> bool {
    piece::kind(mv.piece()) == piece::PAWN
        && !mv.is_capture()
        && mv.to().bit() & prevention == 0
}

fn join_pv(pv: &[Move]) -> String {
    pv.iter()
        .map(|mv| mv.to_coordinate())
        .collect::<Vec<_>>()
        .join(" ")
}
