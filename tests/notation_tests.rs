use meridian::moves::attacks::Attacks;
use meridian::moves::notation::{coordinate_to_move, san};
use meridian::moves::types::Move;
use meridian::position::Position;

fn san_of(fen: &str, text: &str) -> String {
    let mut position = Position::from_fen(fen).unwrap();
    let mut attacks = Attacks::new();
    let mv = coordinate_to_move(&mut position, &mut attacks, text);
    assert!(mv.is_some(), "`{}` should be legal in {}", text, fen);
    let before = position.clone();
    let rendered = san(&mut position, &mut attacks, mv);
    assert_eq!(position, before);
    rendered
}

#[test]
fn coordinate_parse_accepts_legal_and_rejects_the_rest() {
    let mut position = Position::new();
    let mut attacks = Attacks::new();

    let e4 = coordinate_to_move(&mut position, &mut attacks, "e2e4");
    assert!(e4.is_some());
    assert_eq!(e4.to_coordinate(), "e2e4");

    // Legal squares, illegal move; malformed text; bad promotion tag.
    assert!(coordinate_to_move(&mut position, &mut attacks, "e2e5").is_none());
    assert!(coordinate_to_move(&mut position, &mut attacks, "e9e4").is_none());
    assert!(coordinate_to_move(&mut position, &mut attacks, "e2").is_none());
    assert!(coordinate_to_move(&mut position, &mut attacks, "e2e4x").is_none());
    assert_eq!(
        coordinate_to_move(&mut position, &mut attacks, "zzzz"),
        Move::NONE
    );
}

#[test]
fn promotion_parse_requires_the_tag() {
    let mut position = Position::from_fen("8/4P3/8/8/8/8/8/K6k w - - 0 1").unwrap();
    let mut attacks = Attacks::new();
    assert!(coordinate_to_move(&mut position, &mut attacks, "e7e8").is_none());
    let promo = coordinate_to_move(&mut position, &mut attacks, "e7e8r");
    assert!(promo.is_promotion());
    assert_eq!(promo.to_coordinate(), "e7e8r");
}

#[test]
fn plain_piece_and_pawn_moves() {
    let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    assert_eq!(san_of(start, "e2e4"), "e4");
    assert_eq!(san_of(start, "g1f3"), "Nf3");
}

#[test]
fn pawn_captures_name_the_file() {
    let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
    assert_eq!(san_of(fen, "e4d5"), "exd5");
}

#[test]
fn file_disambiguation() {
    // Rooks on a1 and h1 both reach d1.
    let fen = "1k6/8/8/8/8/8/4K3/R6R w - - 0 1";
    assert_eq!(san_of(fen, "a1d1"), "Rad1");
    assert_eq!(san_of(fen, "h1d1"), "Rhd1");
}

#[test]
fn rank_disambiguation() {
    // Rooks on a1 and a5 both reach a3.
    let fen = "1k6/8/8/R7/8/8/4K3/R7 w - - 0 1";
    assert_eq!(san_of(fen, "a1a3"), "R1a3");
    assert_eq!(san_of(fen, "a5a3"), "R5a3");
}

#[test]
fn knight_disambiguation_by_file() {
    // Knights b1 and f3 both reach d2.
    let fen = "1k6/8/8/8/8/5N2/8/1N2K3 w - - 0 1";
    assert_eq!(san_of(fen, "b1d2"), "Nbd2");
    assert_eq!(san_of(fen, "f3d2"), "Nfd2");
}

#[test]
fn castling_notation() {
    let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
    assert_eq!(san_of(fen, "e1g1"), "O-O");
    assert_eq!(san_of(fen, "e1c1"), "O-O-O");
}

#[test]
fn promotion_check_and_mate_suffixes() {
    // Quiet promotion.
    assert_eq!(san_of("8/4P3/8/8/8/8/8/K6k w - - 0 1", "e7e8q"), "e8=Q");
    // Promotion with check along the diagonal.
    assert_eq!(san_of("8/4P3/8/8/k7/8/8/6K1 w - - 0 1", "e7e8q"), "e8=Q+");
    // Back-rank mate.
    assert_eq!(
        san_of("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", "a1a8"),
        "Ra8#"
    );
}

#[test]
fn en_passant_renders_as_a_pawn_capture() {
    assert_eq!(san_of("8/8/8/1Pp5/8/8/8/4K2k w - c6 0 1", "b5c6"), "bxc6");
}
