use meridian::moves::attacks::Attacks;
use meridian::moves::generate::{in_check, legal_moves};
use meridian::moves::notation::{coordinate_to_move, san};
use meridian::moves::types::MoveList;
use meridian::piece;
use meridian::position::Position;
use meridian::search::{Engine, Limits, DRAW_VALUE};
use meridian::status::{position_status, GameStatus};
use std::time::Duration;

fn engine(depth: i32) -> Engine {
    let mut engine = Engine::new(4 * 1024 * 1024);
    engine.set_limits(Limits::depth(depth));
    engine
}

#[test]
fn finds_the_back_rank_mate_in_one() {
    let mut position = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
    let mut attacks = Attacks::new();
    let before = position.clone();

    let mut engine = engine(4);
    let best = engine.get_move(&mut position);
    assert_eq!(position, before, "the position must come back untouched");
    assert_eq!(best.to_coordinate(), "a1a8");
    assert_eq!(san(&mut position, &mut attacks, best), "Ra8#");

    position.make(best);
    let mut list = MoveList::new();
    assert_eq!(legal_moves(&mut position, &mut attacks, &mut list), 0);
    assert!(in_check(&position, &mut attacks, piece::BLACK));
}

#[test]
fn finds_a_mate_in_two() {
    // Two-rook ladder: Ra7 confines the king, Rb8 delivers.
    let mut position = Position::from_fen("7k/8/8/8/8/8/R7/1R4K1 w - - 0 1").unwrap();
    let mut engine = engine(6);
    let best = engine.get_move(&mut position);
    let report = engine.reports().last().unwrap().clone();
    assert!(
        report.value >= meridian::search::NEAR_CHECKMATE,
        "a forced mate must be scored as mate, got {}",
        report.value
    );
    assert!(best.is_some());
}

#[test]
fn prefers_winning_the_hanging_queen() {
    // Black queen on d5 is free to the e4 pawn.
    let mut position =
        Position::from_fen("rnb1kbnr/ppp1pppp/8/3q4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();
    let mut engine = engine(5);
    let best = engine.get_move(&mut position);
    assert_eq!(best.to_coordinate(), "e4d5");
}

#[test]
fn shuffle_repetition_is_detected_and_survivable() {
    let mut position = Position::new();
    let mut attacks = Attacks::new();
    for text in [
        "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
    ] {
        let mv = coordinate_to_move(&mut position, &mut attacks, text);
        assert!(mv.is_some());
        position.make(mv);
    }
    assert!(position.has_repeated(3));
    assert_eq!(
        position_status(&mut position, &mut attacks),
        GameStatus::DrawThreefold
    );

    // The search still produces a legal move from the drawn position.
    let mut engine = engine(4);
    let best = engine.get_move(&mut position);
    assert!(best.is_some());
}

#[test]
fn repeating_when_lost_scores_as_the_draw_value() {
    // Down a queen, White can only shuffle the king; the search should see
    // draw-bound or losing values, never optimism.
    let mut position = Position::from_fen("6k1/8/8/8/8/2q5/8/7K w - - 0 1").unwrap();
    let mut engine = engine(5);
    let _ = engine.get_move(&mut position);
    let value = engine.reports().last().unwrap().value;
    assert!(
        value <= DRAW_VALUE || value < -300,
        "a lost position cannot score well, got {}",
        value
    );
    if value <= DRAW_VALUE {
        assert!(engine.accepts_draw());
    }
}

#[test]
fn stop_aborts_a_deep_search_and_still_moves() {
    let mut engine = Engine::new(4 * 1024 * 1024);
    engine.set_limits(Limits::depth(64));
    let handle = engine.stop_handle();

    let worker = std::thread::spawn(move || {
        let mut position = Position::new();
        let best = engine.get_move(&mut position);
        (engine, best)
    });

    std::thread::sleep(Duration::from_millis(200));
    handle.stop();
    let (_engine, best) = worker.join().unwrap();
    assert!(best.is_some(), "an aborted search still yields a move");
}

#[test]
fn move_time_limit_is_respected() {
    let mut position = Position::new();
    let mut engine = Engine::new(4 * 1024 * 1024);
    engine.set_limits(Limits::move_time(Duration::from_millis(300)));
    let start = std::time::Instant::now();
    let best = engine.get_move(&mut position);
    assert!(best.is_some());
    assert!(
        start.elapsed() < Duration::from_secs(5),
        "the clock must cut the search off"
    );
}

#[test]
fn forced_move_returns_instantly_on_the_clock() {
    // One legal move only: the king must take the adjacent queen.
    let mut position = Position::from_fen("7k/8/8/8/8/8/6q1/7K w - - 0 1").unwrap();
    let mut engine = Engine::new(1024 * 1024);
    engine.set_limits(Limits::clock(
        Duration::from_secs(60),
        Duration::from_secs(1),
    ));
    let best = engine.get_move(&mut position);
    assert_eq!(best.to_coordinate(), "h1g2");
}

#[test]
fn reports_grow_with_depth_and_carry_a_pv() {
    let mut position = Position::new();
    let mut engine = engine(5);
    let _ = engine.get_move(&mut position);
    let reports = engine.reports();
    assert!(reports.len() >= 4);
    for pair in reports.windows(2) {
        assert!(pair[0].depth < pair[1].depth);
        assert!(pair[0].nodes <= pair[1].nodes);
    }
    assert!(!reports.last().unwrap().pv.is_empty());
}

#[test]
fn reset_clears_learned_state() {
    let mut position = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
    let mut engine = engine(4);
    let _ = engine.get_move(&mut position);
    engine.reset();
    assert!(!engine.accepts_draw());
    // And the engine still searches fine afterwards.
    let best = engine.get_move(&mut position);
    assert_eq!(best.to_coordinate(), "a1a8");
}

#[test]
fn fine_70_search_smoke() {
    // The classic KPKP zugzwang; just prove the search copes with a
    // blocked position and returns one of the three king moves.
    let mut position = Position::from_fen("8/k7/3p4/p2P1p2/P2P1P2/8/8/K7 w - - 0 1").unwrap();
    let mut engine = engine(8);
    let best = engine.get_move(&mut position);
    assert_eq!(piece::kind(best.piece()), piece::KING);
}
