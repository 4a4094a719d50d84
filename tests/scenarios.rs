//! End-to-end scenarios exercising the public `Game` facade.

use zugzwang::chess::core::{Color, PieceKind, Piece, Square};
use zugzwang::chess::game::{ApplyOutcome, Game};

fn sq(algebraic: &str) -> Square {
    Square::try_from(algebraic).unwrap()
}

fn play(game: &mut Game, from: &str, to: &str) {
    match game.apply(sq(from), sq(to)) {
        Ok(ApplyOutcome::Applied(_)) => {}
        other => panic!("expected {from}{to} to apply cleanly, got {other:?}"),
    }
}

#[test]
fn fools_mate() {
    let mut game = Game::new_game();
    play(&mut game, "f2", "f3");
    play(&mut game, "e7", "e5");
    play(&mut game, "g2", "g4");
    play(&mut game, "d8", "h4");

    let status = game.status();
    assert!(status.checkmate);
    assert_eq!(game.side_to_move(), Color::White);

    game.undo().unwrap();
    assert!(!game.status().checkmate);
    assert_eq!(game.piece_at(sq("d8")), Some(Piece::new(PieceKind::Queen, Color::Black)));
    assert_eq!(game.piece_at(sq("h4")), None);
}

#[test]
fn en_passant() {
    let mut game =
        Game::load_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();
    play(&mut game, "e5", "d6");

    assert_eq!(game.piece_at(sq("d5")), None);
    assert_eq!(game.piece_at(sq("d6")), Some(Piece::new(PieceKind::Pawn, Color::White)));

    game.undo().unwrap();
    assert_eq!(game.piece_at(sq("d5")), Some(Piece::new(PieceKind::Pawn, Color::Black)));
    assert_eq!(game.side_to_move(), Color::White);
}

#[test]
fn kingside_castling() {
    let mut game = Game::load_fen(
        "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4",
    )
    .unwrap();
    assert!(game.legal_destinations(sq("e1")).contains(&sq("g1")));

    play(&mut game, "e1", "g1");
    assert_eq!(game.piece_at(sq("g1")), Some(Piece::new(PieceKind::King, Color::White)));
    assert_eq!(game.piece_at(sq("f1")), Some(Piece::new(PieceKind::Rook, Color::White)));
}

#[test]
fn promotion_to_queen() {
    let mut game = Game::load_fen("8/P7/8/8/8/8/7k/7K w - - 0 1").unwrap();
    let outcome = game.apply(sq("a7"), sq("a8")).unwrap();
    assert_eq!(outcome, ApplyOutcome::PromotionRequired);
    assert!(game.status().promotion_pending);

    let status = game.complete_promotion(PieceKind::Queen).unwrap();
    assert!(!status.promotion_pending);
    assert_eq!(game.piece_at(sq("a8")), Some(Piece::new(PieceKind::Queen, Color::White)));
    assert_eq!(game.side_to_move(), Color::Black);
}

#[test]
fn threefold_repetition() {
    let mut game = Game::new_game();
    for (from, to) in [
        ("b1", "c3"),
        ("b8", "c6"),
        ("c3", "b1"),
        ("c6", "b8"),
        ("b1", "c3"),
        ("b8", "c6"),
        ("c3", "b1"),
        ("c6", "b8"),
    ] {
        play(&mut game, from, to);
    }
    assert!(game.status().repetition);
}

#[test]
fn insufficient_material() {
    let lone_bishop = Game::load_fen("8/8/8/3k4/8/3K4/3B4/8 w - - 0 1").unwrap();
    assert!(lone_bishop.status().insufficient_material);

    let same_side_bishops = Game::load_fen("8/8/8/3k4/8/3K4/3B1B2/8 w - - 0 1").unwrap();
    assert!(!same_side_bishops.status().insufficient_material);
}
