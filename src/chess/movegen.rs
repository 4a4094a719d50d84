//! Pseudo-legal and legal move generation, plus attack maps for check and
//! castling-path safety.
//!
//! Legality is decided by brute-force simulation (clone the position, play
//! the candidate move on the clone, recompute the opposing attack map, see
//! whether the mover's king is in it) rather than by precomputed pins and
//! check rays. This is the simpler of the two standard approaches and is
//! fast enough here since every operation is O(64) at worst.

use anyhow::Context;
use arrayvec::ArrayVec;

use crate::chess::core::{CastlingRights, Color, PieceKind, Square};
use crate::chess::position::Position;

/// Upper bound on the number of destinations a single piece can reach from
/// one square: a queen on an otherwise empty board combines a bishop's 13
/// diagonal squares with a rook's 14 orthogonal ones.
const MAX_DESTINATIONS: usize = 27;

/// Fixed-capacity destination list, avoiding a heap allocation per call.
pub type Destinations = ArrayVec<Square, MAX_DESTINATIONS>;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
];

fn pawn_advance_row(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

fn pawn_start_row(color: Color) -> u8 {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}

fn pawn_promotion_row(color: Color) -> u8 {
    match color {
        Color::White => 0,
        Color::Black => 7,
    }
}

fn en_passant_capture_row(color: Color) -> u8 {
    match color {
        Color::White => 3,
        Color::Black => 4,
    }
}

fn home_rank_row(color: Color) -> u8 {
    match color {
        Color::White => 7,
        Color::Black => 0,
    }
}

/// A set of attacked squares, represented as a bitmap over the 64 squares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackMap(u64);

impl AttackMap {
    fn bit_index(square: Square) -> u32 {
        u32::from(square.row) * 8 + u32::from(square.col)
    }

    fn insert(&mut self, square: Square) {
        self.0 |= 1u64 << Self::bit_index(square);
    }

    #[must_use]
    pub fn contains(self, square: Square) -> bool {
        (self.0 >> Self::bit_index(square)) & 1 == 1
    }
}

/// Geometrically reachable squares for the piece on `from`, honoring
/// blocking and capture rules but not king safety. Empty if `from` is empty
/// or not owned by the side to move.
#[must_use]
pub fn pseudo_moves_from(position: &Position, from: Square) -> Destinations {
    let Some(piece) = position.piece_at(from) else {
        return Destinations::new();
    };
    if piece.color != position.side_to_move() {
        return Destinations::new();
    }
    match piece.kind {
        PieceKind::Pawn => pawn_pseudo_moves(position, from, piece.color),
        PieceKind::Knight => offset_pseudo_moves(position, from, piece.color, &KNIGHT_OFFSETS),
        PieceKind::Bishop => sliding_pseudo_moves(position, from, piece.color, &BISHOP_DIRECTIONS),
        PieceKind::Rook => sliding_pseudo_moves(position, from, piece.color, &ROOK_DIRECTIONS),
        PieceKind::Queen => sliding_pseudo_moves(position, from, piece.color, &QUEEN_DIRECTIONS),
        PieceKind::King => king_pseudo_moves(position, from, piece.color),
    }
}

/// Subset of [`pseudo_moves_from`] that does not leave the mover's own king
/// in check.
///
/// # Errors
///
/// Fails only on an internal invariant violation (see [`simulate`] and
/// [`is_in_check`]), never as a result of the position or `from` themselves.
pub fn legal_moves_from(position: &Position, from: Square) -> anyhow::Result<Destinations> {
    let Some(piece) = position.piece_at(from) else {
        return Ok(Destinations::new());
    };
    let mut legal = Destinations::new();
    for to in pseudo_moves_from(position, from) {
        let scratch = simulate(position, from, to)?;
        if !is_in_check(&scratch, piece.color)? {
            legal.push(to);
        }
    }
    Ok(legal)
}

/// Squares attacked by any piece of `color`, using the same geometry as
/// movement except pawns attack only diagonally and kings attack adjacent
/// squares unconditionally (no castling, no recursion).
#[must_use]
pub fn attacks_of(position: &Position, color: Color) -> AttackMap {
    let mut map = AttackMap::default();
    for (row, col) in itertools::iproduct!(0..8u8, 0..8u8) {
        let square = Square::new(row, col);
        let Some(piece) = position.piece_at(square) else {
            continue;
        };
        if piece.color != color {
            continue;
        }
        match piece.kind {
            PieceKind::Pawn => {
                let advance = pawn_advance_row(color);
                for delta_col in [-1i8, 1] {
                    if let Some(target) =
                        Square::try_new(i8::from(row) + advance, i8::from(col) + delta_col)
                    {
                        map.insert(target);
                    }
                }
            }
            PieceKind::Knight => offset_attacks(square, &KNIGHT_OFFSETS, &mut map),
            PieceKind::King => offset_attacks(square, &KING_OFFSETS, &mut map),
            PieceKind::Bishop => slide_attacks(position, square, &BISHOP_DIRECTIONS, &mut map),
            PieceKind::Rook => slide_attacks(position, square, &ROOK_DIRECTIONS, &mut map),
            PieceKind::Queen => slide_attacks(position, square, &QUEEN_DIRECTIONS, &mut map),
        }
    }
    map
}

/// Whether `color`'s king is attacked by the opposing side.
///
/// # Errors
///
/// Fails only on an internal invariant violation (see
/// [`Position::king_square`]).
pub fn is_in_check(position: &Position, color: Color) -> anyhow::Result<bool> {
    let king_square = position.king_square(color)?;
    Ok(attacks_of(position, color.opponent()).contains(king_square))
}

fn offset_pseudo_moves(
    position: &Position,
    from: Square,
    color: Color,
    offsets: &[(i8, i8)],
) -> Destinations {
    let mut moves = Destinations::new();
    for &(delta_row, delta_col) in offsets {
        if let Some(target) =
            Square::try_new(i8::from(from.row) + delta_row, i8::from(from.col) + delta_col)
        {
            match position.piece_at(target) {
                Some(occupant) if occupant.color == color => {}
                _ => moves.push(target),
            }
        }
    }
    moves
}

fn offset_attacks(from: Square, offsets: &[(i8, i8)], map: &mut AttackMap) {
    for &(delta_row, delta_col) in offsets {
        if let Some(target) =
            Square::try_new(i8::from(from.row) + delta_row, i8::from(from.col) + delta_col)
        {
            map.insert(target);
        }
    }
}

fn sliding_pseudo_moves(
    position: &Position,
    from: Square,
    color: Color,
    directions: &[(i8, i8)],
) -> Destinations {
    let mut moves = Destinations::new();
    for &(delta_row, delta_col) in directions {
        let mut current = from;
        loop {
            let Some(next) =
                Square::try_new(i8::from(current.row) + delta_row, i8::from(current.col) + delta_col)
            else {
                break;
            };
            match position.piece_at(next) {
                None => {
                    moves.push(next);
                    current = next;
                }
                Some(occupant) => {
                    if occupant.color != color {
                        moves.push(next);
                    }
                    break;
                }
            }
        }
    }
    moves
}

fn slide_attacks(position: &Position, from: Square, directions: &[(i8, i8)], map: &mut AttackMap) {
    for &(delta_row, delta_col) in directions {
        let mut current = from;
        loop {
            let Some(next) =
                Square::try_new(i8::from(current.row) + delta_row, i8::from(current.col) + delta_col)
            else {
                break;
            };
            map.insert(next);
            if position.piece_at(next).is_some() {
                break;
            }
            current = next;
        }
    }
}

fn pawn_pseudo_moves(position: &Position, from: Square, color: Color) -> Destinations {
    let mut moves = Destinations::new();
    let advance = pawn_advance_row(color);

    if let Some(one_step) = Square::try_new(i8::from(from.row) + advance, i8::from(from.col)) {
        if position.piece_at(one_step).is_none() {
            moves.push(one_step);
            if from.row == pawn_start_row(color) {
                if let Some(two_step) =
                    Square::try_new(i8::from(from.row) + 2 * advance, i8::from(from.col))
                {
                    if position.piece_at(two_step).is_none() {
                        moves.push(two_step);
                    }
                }
            }
        }
    }

    for delta_col in [-1i8, 1] {
        let Some(target) =
            Square::try_new(i8::from(from.row) + advance, i8::from(from.col) + delta_col)
        else {
            continue;
        };
        match position.piece_at(target) {
            Some(occupant) if occupant.color != color => moves.push(target),
            Some(_) => {}
            None => {
                if let Some(ep_file) = position.en_passant_file() {
                    if target.col == ep_file && from.row == en_passant_capture_row(color) {
                        moves.push(target);
                    }
                }
            }
        }
    }

    moves
}

fn king_pseudo_moves(position: &Position, from: Square, color: Color) -> Destinations {
    let mut moves = offset_pseudo_moves(position, from, color, &KING_OFFSETS);

    let home_row = home_rank_row(color);
    if from != Square::new(home_row, 4) {
        return moves;
    }

    let (kingside_right, queenside_right) = match color {
        Color::White => (
            CastlingRights::WHITE_KINGSIDE,
            CastlingRights::WHITE_QUEENSIDE,
        ),
        Color::Black => (
            CastlingRights::BLACK_KINGSIDE,
            CastlingRights::BLACK_QUEENSIDE,
        ),
    };
    let rights = position.castling_rights();

    if rights.contains(kingside_right)
        && position.piece_at(Square::new(home_row, 5)).is_none()
        && position.piece_at(Square::new(home_row, 6)).is_none()
    {
        let opponent_attacks = attacks_of(position, color.opponent());
        let path_safe = [4u8, 5, 6]
            .into_iter()
            .all(|col| !opponent_attacks.contains(Square::new(home_row, col)));
        if path_safe {
            moves.push(Square::new(home_row, 6));
        }
    }

    if rights.contains(queenside_right)
        && position.piece_at(Square::new(home_row, 1)).is_none()
        && position.piece_at(Square::new(home_row, 2)).is_none()
        && position.piece_at(Square::new(home_row, 3)).is_none()
    {
        let opponent_attacks = attacks_of(position, color.opponent());
        let path_safe = [4u8, 3, 2]
            .into_iter()
            .all(|col| !opponent_attacks.contains(Square::new(home_row, col)));
        if path_safe {
            moves.push(Square::new(home_row, 2));
        }
    }

    moves
}

/// Whether `from -> to` is a pawn move landing on the promotion rank.
#[must_use]
pub(crate) fn is_promotion(position: &Position, from: Square, to: Square) -> bool {
    match position.piece_at(from) {
        Some(piece) if piece.kind == PieceKind::Pawn => to.row == pawn_promotion_row(piece.color),
        _ => false,
    }
}

/// Plays `from -> to` on a clone of `position`, handling en passant and
/// castling board mutation, but none of the executor's bookkeeping (flags,
/// Move record, hash). Used only to test king safety.
///
/// # Errors
///
/// Fails if `from` holds no piece. Every caller in this module only invokes
/// `simulate` with a `from` already known to hold the mover's piece, so this
/// is an internal invariant violation rather than a user-facing condition.
pub(crate) fn simulate(position: &Position, from: Square, to: Square) -> anyhow::Result<Position> {
    let mut scratch = position.clone();
    let moving = scratch
        .piece_at(from)
        .with_context(|| format!("simulate called with no piece on {from}"))?;

    let is_en_passant =
        moving.kind == PieceKind::Pawn && from.col != to.col && scratch.piece_at(to).is_none();
    if is_en_passant {
        scratch.set_piece(Square::new(from.row, to.col), None);
    }

    if moving.kind == PieceKind::King && (i8::from(to.col) - i8::from(from.col)).abs() == 2 {
        let row = from.row;
        if to.col == 6 {
            let rook = scratch.take_piece(Square::new(row, 7));
            scratch.set_piece(Square::new(row, 5), rook);
        } else {
            let rook = scratch.take_piece(Square::new(row, 0));
            scratch.set_piece(Square::new(row, 3), rook);
        }
    }

    let moved = scratch.take_piece(from);
    scratch.set_piece(to, moved);
    Ok(scratch)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves_for_white() {
        let position = Position::starting();
        let mut total = 0;
        for row in 0..8u8 {
            for col in 0..8u8 {
                total += legal_moves_from(&position, Square::new(row, col)).unwrap().len();
            }
        }
        assert_eq!(total, 20);
    }

    #[test]
    fn legal_moves_are_a_subset_of_pseudo_moves() {
        let position = Position::from_fen(
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4",
        )
        .unwrap();
        for row in 0..8u8 {
            for col in 0..8u8 {
                let square = Square::new(row, col);
                let pseudo: std::collections::HashSet<_> =
                    pseudo_moves_from(&position, square).into_iter().collect();
                for legal in legal_moves_from(&position, square).unwrap() {
                    assert!(pseudo.contains(&legal));
                }
            }
        }
    }

    #[test]
    fn castling_available_when_path_clear_and_safe() {
        let position = Position::from_fen(
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4",
        )
        .unwrap();
        let destinations = legal_moves_from(&position, Square::try_from("e1").unwrap()).unwrap();
        assert!(destinations.contains(&Square::try_from("g1").unwrap()));
    }

    #[test]
    fn king_cannot_castle_through_check() {
        // Black rook on f8 attacks f1, blocking kingside castling but not
        // the queenside path.
        let position = Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let destinations = legal_moves_from(&position, Square::try_from("e1").unwrap()).unwrap();
        assert!(destinations.contains(&Square::try_from("c1").unwrap()));
        assert!(!destinations.contains(&Square::try_from("g1").unwrap()));
    }

    #[test]
    fn pinned_bishop_has_no_legal_moves() {
        // White king on e1, white bishop on e2 pinned by black rook on e8.
        // A bishop moves only diagonally, so every pseudo-move would step
        // off the e-file and expose the king.
        let position = Position::from_fen("4r3/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let destinations = legal_moves_from(&position, Square::try_from("e2").unwrap()).unwrap();
        assert!(destinations.is_empty());
    }

    #[test]
    fn en_passant_capture_is_generated() {
        let position = Position::from_fen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        )
        .unwrap();
        let destinations = legal_moves_from(&position, Square::try_from("e5").unwrap()).unwrap();
        assert!(destinations.contains(&Square::try_from("d6").unwrap()));
    }
}
