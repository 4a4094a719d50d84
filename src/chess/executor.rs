//! Board-level mechanics of applying and reversing a single move. Assumes
//! legality has already been checked by [`crate::chess::movegen`]; the
//! higher-level bookkeeping (undo/redo stacks, repetition history,
//! promotion suspension) lives in [`crate::chess::game`].

use anyhow::Context;

use crate::chess::core::{Color, Piece, PieceKind, Square};
use crate::chess::moves::Move;
use crate::chess::position::Position;

/// Plays `from -> to` on `position`, mutating it in place, and returns the
/// [`Move`] record needed to reverse it. `promotion` must be `Some` iff the
/// move is a completed promotion.
///
/// # Errors
///
/// Fails if `from` holds no piece. Every caller already checked `from ->
/// to` is legal before calling this, so this is an internal invariant
/// violation rather than a user-facing condition.
pub(crate) fn apply_to_position(
    position: &mut Position,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
) -> anyhow::Result<Move> {
    let moving = position
        .piece_at(from)
        .with_context(|| format!("apply_to_position called with no piece on {from}"))?;
    let mover_color = moving.color;

    let is_en_passant =
        moving.kind == PieceKind::Pawn && from.col != to.col && position.piece_at(to).is_none();
    let captured = if is_en_passant {
        Some(PieceKind::Pawn)
    } else {
        position.piece_at(to).map(|piece| piece.kind)
    };
    let is_castle =
        moving.kind == PieceKind::King && (i8::from(to.col) - i8::from(from.col)).abs() == 2;

    let prior_castling_rights = position.castling_rights();
    let prior_en_passant_file = position.en_passant_file();
    let prior_halfmove_clock = position.halfmove_clock();

    let resets_clock = moving.kind == PieceKind::Pawn || captured.is_some();
    position.set_halfmove_clock(if resets_clock {
        0
    } else {
        prior_halfmove_clock + 1
    });

    position.update_castling_rights_after_move(from, moving);
    if let Some(captured_kind) = captured {
        if captured_kind == PieceKind::Rook && !is_en_passant {
            position.revoke_castling_right_if_rook_captured(to);
        }
    }

    if is_en_passant {
        position.set_piece(Square::new(from.row, to.col), None);
    }
    if is_castle {
        let row = from.row;
        if to.col == 6 {
            let rook = position.take_piece(Square::new(row, 7));
            position.set_piece(Square::new(row, 5), rook);
        } else {
            let rook = position.take_piece(Square::new(row, 0));
            position.set_piece(Square::new(row, 3), rook);
        }
    }

    position.set_piece(from, None);
    let placed = promotion.map_or(Some(moving), |kind| Some(Piece::new(kind, mover_color)));
    position.set_piece(to, placed);

    let new_en_passant_file = if moving.kind == PieceKind::Pawn
        && (i8::from(to.row) - i8::from(from.row)).abs() == 2
    {
        Some(from.col)
    } else {
        None
    };
    position.set_en_passant_file(new_en_passant_file);

    if mover_color == Color::Black {
        position.increment_fullmove_number();
    }
    position.flip_side_to_move();

    Ok(Move {
        from,
        to,
        piece_kind: moving.kind,
        piece_color: mover_color,
        captured,
        promotion,
        is_en_passant,
        is_castle,
        prior_castling_rights,
        prior_en_passant_file,
        prior_halfmove_clock,
    })
}

/// Reverses `record` on `position`, mutating it in place to exactly the
/// pre-move state described by the record.
pub(crate) fn undo_on_position(position: &mut Position, record: &Move) {
    let moving_piece = Piece::new(record.piece_kind, record.piece_color);
    position.set_piece(record.from, Some(moving_piece));
    position.set_piece(record.to, None);

    if let Some(captured_kind) = record.captured {
        let captured_color = record.piece_color.opponent();
        let captured_square = if record.is_en_passant {
            Square::new(record.from.row, record.to.col)
        } else {
            record.to
        };
        position.set_piece(captured_square, Some(Piece::new(captured_kind, captured_color)));
    }

    if record.is_castle {
        let row = record.from.row;
        if record.to.col == 6 {
            let rook = position.take_piece(Square::new(row, 5));
            position.set_piece(Square::new(row, 7), rook);
        } else {
            let rook = position.take_piece(Square::new(row, 3));
            position.set_piece(Square::new(row, 0), rook);
        }
    }

    position.set_castling_rights(record.prior_castling_rights);
    position.set_en_passant_file(record.prior_en_passant_file);
    position.set_halfmove_clock(record.prior_halfmove_clock);
    if record.piece_color == Color::Black {
        position.decrement_fullmove_number();
    }
    position.flip_side_to_move();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn apply_then_undo_restores_the_position() {
        let before = Position::starting();
        let mut after = before.clone();
        let record = apply_to_position(
            &mut after,
            Square::try_from("e2").unwrap(),
            Square::try_from("e4").unwrap(),
            None,
        )
        .unwrap();
        assert_ne!(before, after);
        undo_on_position(&mut after, &record);
        assert_eq!(before, after);
    }

    #[test]
    fn en_passant_removes_the_captured_pawn() {
        let mut position = Position::from_fen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
        )
        .unwrap();
        let before = position.clone();
        let record = apply_to_position(
            &mut position,
            Square::try_from("e5").unwrap(),
            Square::try_from("d6").unwrap(),
            None,
        )
        .unwrap();
        assert!(record.is_en_passant);
        assert_eq!(position.piece_at(Square::try_from("d5").unwrap()), None);
        assert_eq!(
            position.piece_at(Square::try_from("d6").unwrap()),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
        undo_on_position(&mut position, &record);
        assert_eq!(position, before);
    }

    #[test]
    fn castling_relocates_the_rook() {
        let mut position = Position::from_fen(
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4",
        )
        .unwrap();
        let before = position.clone();
        let record = apply_to_position(
            &mut position,
            Square::try_from("e1").unwrap(),
            Square::try_from("g1").unwrap(),
            None,
        )
        .unwrap();
        assert!(record.is_castle);
        assert_eq!(
            position.piece_at(Square::try_from("f1").unwrap()),
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
        assert_eq!(position.piece_at(Square::try_from("h1").unwrap()), None);
        undo_on_position(&mut position, &record);
        assert_eq!(position, before);
    }

    #[test]
    fn capturing_a_rook_revokes_the_matching_right() {
        let mut position =
            Position::from_fen("r3k3/8/8/8/8/8/8/R3K2R w KQq - 0 1").unwrap();
        apply_to_position(
            &mut position,
            Square::try_from("a1").unwrap(),
            Square::try_from("a8").unwrap(),
            None,
        )
        .unwrap();
        assert!(!position.castling_rights().contains(
            crate::chess::core::CastlingRights::BLACK_QUEENSIDE
        ));
    }
}
