//! Node-count regression test against well-known reference values for the
//! starting position.

use zugzwang::chess::perft::perft;
use zugzwang::chess::position::Position;

#[test]
fn starting_position_node_counts() {
    let position = Position::starting();
    assert_eq!(perft(&position, 1), 20);
    assert_eq!(perft(&position, 2), 400);
    assert_eq!(perft(&position, 3), 8_902);
    assert_eq!(perft(&position, 4), 197_281);
}
