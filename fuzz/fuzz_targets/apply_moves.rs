#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zugzwang::chess::core::{PieceKind, Square};
use zugzwang::chess::game::Game;

#[derive(Arbitrary, Debug)]
struct Step {
    from_row: u8,
    from_col: u8,
    to_row: u8,
    to_col: u8,
}

fuzz_target!(|steps: Vec<Step>| {
    let mut game = Game::new_game();
    for step in steps {
        let Some(from) = Square::try_new(i8::from(step.from_row % 8), i8::from(step.from_col % 8))
        else {
            continue;
        };
        let Some(to) = Square::try_new(i8::from(step.to_row % 8), i8::from(step.to_col % 8))
        else {
            continue;
        };
        // Arbitrary (from, to) pairs are almost always illegal; that's fine,
        // the point is that `apply` never panics either way.
        if let Ok(outcome) = game.apply(from, to) {
            if matches!(outcome, zugzwang::chess::game::ApplyOutcome::PromotionRequired) {
                let _ = game.complete_promotion(PieceKind::Queen);
            }
        }
    }
    let _ = game.status();
});
