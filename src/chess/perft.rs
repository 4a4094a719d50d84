//! Leaf-node counter used both as a correctness oracle (reference counts are
//! well known for the starting position) and as a benchmark workload.

use crate::chess::core::{PieceKind, Square};
use crate::chess::executor;
use crate::chess::movegen;
use crate::chess::position::Position;

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Counts leaf nodes of the full legal-move tree rooted at `position`, to
/// `depth` plies.
#[must_use]
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for (from, to) in legal_moves(position) {
        if movegen::is_promotion(position, from, to) {
            for &kind in &PROMOTION_KINDS {
                let mut next = position.clone();
                executor::apply_to_position(&mut next, from, to, Some(kind))
                    .expect("perft only plays moves already generated as legal");
                nodes += perft(&next, depth - 1);
            }
        } else {
            let mut next = position.clone();
            executor::apply_to_position(&mut next, from, to, None)
                .expect("perft only plays moves already generated as legal");
            nodes += perft(&next, depth - 1);
        }
    }
    nodes
}

fn legal_moves(position: &Position) -> Vec<(Square, Square)> {
    let mut moves = Vec::new();
    for (row, col) in itertools::iproduct!(0..8u8, 0..8u8) {
        let from = Square::new(row, col);
        match position.piece_at(from) {
            Some(piece) if piece.color == position.side_to_move() => {
                let destinations = movegen::legal_moves_from(position, from)
                    .expect("perft only queries positions reachable by legal moves");
                for to in destinations {
                    moves.push((from, to));
                }
            }
            _ => {}
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starting_position_matches_reference_counts() {
        let position = Position::starting();
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8_902);
    }

    #[test]
    fn starting_position_depth_four() {
        let position = Position::starting();
        assert_eq!(perft(&position, 4), 197_281);
    }
}
