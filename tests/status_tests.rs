use meridian::moves::attacks::Attacks;
use meridian::moves::notation::coordinate_to_move;
use meridian::position::Position;
use meridian::status::{insufficient_material, position_status, GameStatus};

fn status_of(fen: &str) -> GameStatus {
    let mut position = Position::from_fen(fen).unwrap();
    let mut attacks = Attacks::new();
    position_status(&mut position, &mut attacks)
}

#[test]
fn fresh_game_is_in_play() {
    assert_eq!(
        status_of("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        GameStatus::InPlay
    );
}

#[test]
fn fools_mate_is_checkmate() {
    let mut position = Position::new();
    let mut attacks = Attacks::new();
    for text in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        let mv = coordinate_to_move(&mut position, &mut attacks, text);
        assert!(mv.is_some(), "{} should be legal", text);
        position.make(mv);
    }
    assert_eq!(
        position_status(&mut position, &mut attacks),
        GameStatus::Checkmate
    );
}

#[test]
fn cornered_king_is_stalemated() {
    assert_eq!(status_of("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"), GameStatus::Stalemate);
}

#[test]
fn bare_kings_and_lone_minors_are_dead() {
    assert!(insufficient_material(
        &Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap()
    ));
    assert!(insufficient_material(
        &Position::from_fen("4k3/8/8/8/8/8/8/4KB2 w - - 0 1").unwrap()
    ));
    assert!(insufficient_material(
        &Position::from_fen("4k3/8/8/8/8/8/8/2N1KN2 w - - 0 1").unwrap()
    ));
    assert!(insufficient_material(
        &Position::from_fen("3nk3/8/8/8/8/8/8/3BK3 w - - 0 1").unwrap()
    ));
    assert_eq!(
        status_of("4k3/8/8/8/8/8/8/4KB2 w - - 0 1"),
        GameStatus::DrawInsufficient
    );
}

#[test]
fn mating_material_is_not_dead() {
    for fen in [
        "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",
        "4k3/8/8/8/8/8/8/R3K3 w - - 0 1",
        "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",
        "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1",
        "4k3/8/8/8/8/8/8/2B1KN2 w - - 0 1",
    ] {
        assert!(
            !insufficient_material(&Position::from_fen(fen).unwrap()),
            "{} can still be won",
            fen
        );
    }
}

#[test]
fn halfmove_clock_at_one_hundred_is_a_draw() {
    assert_eq!(
        status_of("4k3/8/8/8/8/8/4R3/4K3 w - - 100 80"),
        GameStatus::DrawFiftyMove
    );
    assert_eq!(
        status_of("4k3/8/8/8/8/8/4R3/4K3 w - - 99 80"),
        GameStatus::InPlay
    );
}
