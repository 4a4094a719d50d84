//! The reversible [`Move`] record produced by the executor and consumed by
//! undo/redo (see [`crate::chess::executor`]).

use std::fmt;

use crate::chess::core::{CastlingRights, Color, PieceKind, Square};

/// A single applied move, holding every datum needed to reverse it without
/// re-deriving state: the move itself, plus the pre-move scalars it would
/// otherwise be impossible to recover (castling rights, en-passant file,
/// halfmove clock).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece_kind: PieceKind,
    pub piece_color: Color,
    /// `None` if the move was not a capture; for en passant this is always
    /// `Some(PieceKind::Pawn)`.
    pub captured: Option<PieceKind>,
    /// `Some` only when this move is a (completed) promotion.
    pub promotion: Option<PieceKind>,
    pub is_en_passant: bool,
    pub is_castle: bool,
    pub prior_castling_rights: CastlingRights,
    pub prior_en_passant_file: Option<u8>,
    pub prior_halfmove_clock: u32,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion_char(promotion))?;
        }
        Ok(())
    }
}

fn promotion_char(kind: PieceKind) -> char {
    match kind {
        PieceKind::Queen => 'q',
        PieceKind::Rook => 'r',
        PieceKind::Bishop => 'b',
        PieceKind::Knight => 'n',
        PieceKind::King | PieceKind::Pawn => unreachable!("not a promotable piece kind"),
    }
}
