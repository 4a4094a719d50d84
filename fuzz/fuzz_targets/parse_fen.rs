#![no_main]

use libfuzzer_sys::fuzz_target;
use zugzwang::chess::position::Position;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must never panic, and a successful parse must round-trip through
        // its own FEN serialization.
        if let Ok(position) = Position::from_fen(input) {
            let reparsed = Position::from_fen(&position.to_fen())
                .expect("a position's own FEN must parse back");
            assert_eq!(position, reparsed);
        }
    }
});
