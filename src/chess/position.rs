//! Provides the fully-specified [Chess Position] implementation: the 8x8
//! board plus every rule-relevant flag (side to move, castling rights,
//! en-passant file, halfmove clock, fullmove number), together with its FEN
//! codec.
//!
//! [Chess Position]: https://www.chessprogramming.org/Chess_Position

use std::fmt;

use anyhow::bail;

use crate::chess::core::{CastlingRights, Color, Piece, PieceKind, Square, BOARD_SIZE};
use crate::chess::error::FenError;

/// The single source of truth for an in-progress game: the board and all
/// rule-relevant flags. Does not itself hold history; see
/// [`crate::chess::game::Game`] for the full facade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: [[Option<Piece>; 8]; 8],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant_file: Option<u8>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    /// The standard chess starting position.
    #[must_use]
    pub fn starting() -> Self {
        Self::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .expect("starting FEN is well-formed")
    }

    /// Parses a FEN string into a validated [`Position`]. Never mutates
    /// anything on failure: the caller's existing state is left untouched.
    pub fn from_fen(input: &str) -> Result<Self, FenError> {
        let mut fields = input.split(' ');

        let placement = fields
            .next()
            .ok_or(FenError::MissingField("piece placement"))?;
        let board = parse_placement(placement)?;

        let side_str = fields.next().ok_or(FenError::MissingField("side to move"))?;
        let side_to_move = match side_str {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::BadColor(side_str.to_string())),
        };

        let castling_str = fields
            .next()
            .ok_or(FenError::MissingField("castling rights"))?;
        let castling = parse_castling(castling_str)?;

        let ep_str = fields
            .next()
            .ok_or(FenError::MissingField("en passant target"))?;
        let en_passant_file = parse_en_passant(ep_str, side_to_move)?;

        let halfmove_str = fields
            .next()
            .ok_or(FenError::MissingField("halfmove clock"))?;
        let halfmove_clock: u32 = halfmove_str.parse().map_err(|_| FenError::BadNumber {
            field: "halfmove clock",
            value: halfmove_str.to_string(),
        })?;

        let fullmove_str = fields
            .next()
            .ok_or(FenError::MissingField("fullmove number"))?;
        let fullmove_number: u32 = fullmove_str.parse().map_err(|_| FenError::BadNumber {
            field: "fullmove number",
            value: fullmove_str.to_string(),
        })?;
        if fullmove_number == 0 {
            return Err(FenError::BadNumber {
                field: "fullmove number",
                value: fullmove_str.to_string(),
            });
        }

        if fields.next().is_some() {
            return Err(FenError::TrailingData);
        }

        let position = Self {
            board,
            side_to_move,
            castling,
            en_passant_file,
            halfmove_clock,
            fullmove_number,
        };
        position.validate()?;
        Ok(position)
    }

    /// Emits the canonical FEN for this position.
    #[must_use]
    pub fn to_fen(&self) -> String {
        self.to_string()
    }

    fn validate(&self) -> Result<(), FenError> {
        let white_kings = self.count(Color::White, PieceKind::King);
        let black_kings = self.count(Color::Black, PieceKind::King);
        if white_kings != 1 || black_kings != 1 {
            return Err(FenError::InvalidPosition(format!(
                "expected exactly one king per side, found {white_kings} white and \
                 {black_kings} black"
            )));
        }
        for col in 0..8usize {
            let back_rank_pawn = matches!(self.board[0][col], Some(p) if p.kind == PieceKind::Pawn)
                || matches!(self.board[7][col], Some(p) if p.kind == PieceKind::Pawn);
            if back_rank_pawn {
                return Err(FenError::InvalidPosition(
                    "pawns cannot occupy the back ranks".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn count(&self, color: Color, kind: PieceKind) -> u32 {
        self.board
            .iter()
            .flatten()
            .filter(|cell| matches!(cell, Some(piece) if piece.color == color && piece.kind == kind))
            .count() as u32
    }

    /// The piece on `square`, if any.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.row as usize][square.col as usize]
    }

    pub(crate) fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.board[square.row as usize][square.col as usize] = piece;
    }

    pub(crate) fn take_piece(&mut self, square: Square) -> Option<Piece> {
        let piece = self.piece_at(square);
        self.set_piece(square, None);
        piece
    }

    /// The square holding `color`'s king.
    ///
    /// # Errors
    ///
    /// Fails if no king of `color` is on the board. `validate()` already
    /// rejects any FEN lacking one, so this only fires if some other bug
    /// let a king be removed from the board; it is an invariant violation,
    /// not a user-facing condition.
    pub fn king_square(&self, color: Color) -> anyhow::Result<Square> {
        for (row, col) in itertools::iproduct!(0..8u8, 0..8u8) {
            let square = Square::new(row, col);
            if let Some(piece) = self.piece_at(square) {
                if piece.color == color && piece.kind == PieceKind::King {
                    return Ok(square);
                }
            }
        }
        bail!("no {color:?} king on the board")
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub(crate) fn flip_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub(crate) fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.castling = rights;
    }

    #[must_use]
    pub fn en_passant_file(&self) -> Option<u8> {
        self.en_passant_file
    }

    pub(crate) fn set_en_passant_file(&mut self, file: Option<u8>) {
        self.en_passant_file = file;
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub(crate) fn set_halfmove_clock(&mut self, clock: u32) {
        self.halfmove_clock = clock;
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub(crate) fn increment_fullmove_number(&mut self) {
        self.fullmove_number += 1;
    }

    pub(crate) fn decrement_fullmove_number(&mut self) {
        self.fullmove_number = self.fullmove_number.saturating_sub(1);
    }

    pub(crate) fn update_castling_rights_after_move(&mut self, from: Square, moving: Piece) {
        match (moving.kind, moving.color) {
            (PieceKind::King, Color::White) => {
                self.castling
                    .remove(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
            }
            (PieceKind::King, Color::Black) => {
                self.castling
                    .remove(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
            }
            (PieceKind::Rook, Color::White) => {
                if from == Square::new(7, 0) {
                    self.castling.remove(CastlingRights::WHITE_QUEENSIDE);
                } else if from == Square::new(7, 7) {
                    self.castling.remove(CastlingRights::WHITE_KINGSIDE);
                }
            }
            (PieceKind::Rook, Color::Black) => {
                if from == Square::new(0, 0) {
                    self.castling.remove(CastlingRights::BLACK_QUEENSIDE);
                } else if from == Square::new(0, 7) {
                    self.castling.remove(CastlingRights::BLACK_KINGSIDE);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn revoke_castling_right_if_rook_captured(&mut self, square: Square) {
        if square == Square::new(7, 0) {
            self.castling.remove(CastlingRights::WHITE_QUEENSIDE);
        } else if square == Square::new(7, 7) {
            self.castling.remove(CastlingRights::WHITE_KINGSIDE);
        } else if square == Square::new(0, 0) {
            self.castling.remove(CastlingRights::BLACK_QUEENSIDE);
        } else if square == Square::new(0, 7) {
            self.castling.remove(CastlingRights::BLACK_KINGSIDE);
        }
    }
}

impl TryFrom<&str> for Position {
    type Error = FenError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_fen(value)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8usize {
            let mut empty_run = 0u32;
            for col in 0..8usize {
                match self.board[row][col] {
                    Some(piece) => {
                        if empty_run > 0 {
                            write!(f, "{empty_run}")?;
                            empty_run = 0;
                        }
                        write!(f, "{}", piece_to_char(piece))?;
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                write!(f, "{empty_run}")?;
            }
            if row != 7 {
                write!(f, "/")?;
            }
        }
        write!(f, " {} {} ", self.side_to_move, self.castling)?;
        match self.en_passant_file {
            Some(file) => {
                let rank_char = if self.side_to_move == Color::White {
                    '6'
                } else {
                    '3'
                };
                write!(f, "{}{rank_char}", (b'a' + file) as char)?;
            }
            None => write!(f, "-")?,
        }
        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

fn piece_to_char(piece: Piece) -> char {
    let lower = match piece.kind {
        PieceKind::King => 'k',
        PieceKind::Queen => 'q',
        PieceKind::Rook => 'r',
        PieceKind::Bishop => 'b',
        PieceKind::Knight => 'n',
        PieceKind::Pawn => 'p',
    };
    if piece.color == Color::White {
        lower.to_ascii_uppercase()
    } else {
        lower
    }
}

fn piece_from_char(ch: char) -> Option<(PieceKind, Color)> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    let kind = match ch.to_ascii_lowercase() {
        'k' => PieceKind::King,
        'q' => PieceKind::Queen,
        'r' => PieceKind::Rook,
        'b' => PieceKind::Bishop,
        'n' => PieceKind::Knight,
        'p' => PieceKind::Pawn,
        _ => return None,
    };
    Some((kind, color))
}

fn parse_placement(placement: &str) -> Result<[[Option<Piece>; 8]; 8], FenError> {
    let mut board: [[Option<Piece>; 8]; 8] = [[None; 8]; 8];
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != usize::from(BOARD_SIZE) {
        return Err(FenError::BadRankCount(ranks.len()));
    }
    for (row, rank_str) in ranks.iter().enumerate() {
        let mut col = 0usize;
        for ch in rank_str.chars() {
            if col >= 8 {
                return Err(FenError::BadRank((*rank_str).to_string()));
            }
            if let Some(digit) = ch.to_digit(10) {
                if digit == 0 {
                    return Err(FenError::BadRank((*rank_str).to_string()));
                }
                col += digit as usize;
                continue;
            }
            let (kind, color) =
                piece_from_char(ch).ok_or(FenError::UnknownCharacter(ch))?;
            if col >= 8 {
                return Err(FenError::BadRank((*rank_str).to_string()));
            }
            board[row][col] = Some(Piece::new(kind, color));
            col += 1;
        }
        if col != 8 {
            return Err(FenError::BadRank((*rank_str).to_string()));
        }
    }
    Ok(board)
}

fn parse_castling(s: &str) -> Result<CastlingRights, FenError> {
    if s == "-" {
        return Ok(CastlingRights::empty());
    }
    let mut rights = CastlingRights::empty();
    let mut chars = s.chars().peekable();
    for (letter, flag) in [
        ('K', CastlingRights::WHITE_KINGSIDE),
        ('Q', CastlingRights::WHITE_QUEENSIDE),
        ('k', CastlingRights::BLACK_KINGSIDE),
        ('q', CastlingRights::BLACK_QUEENSIDE),
    ] {
        if chars.peek() == Some(&letter) {
            rights |= flag;
            let _ = chars.next();
        }
    }
    if s.is_empty() || chars.next().is_some() {
        return Err(FenError::BadCastling(s.to_string()));
    }
    Ok(rights)
}

fn parse_en_passant(s: &str, side_to_move: Color) -> Result<Option<u8>, FenError> {
    if s == "-" {
        return Ok(None);
    }
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(FenError::BadEnPassant(s.to_string()));
    }
    let file = bytes[0];
    if !(b'a'..=b'h').contains(&file) {
        return Err(FenError::BadEnPassant(s.to_string()));
    }
    let rank = bytes[1];
    let expected_rank = match side_to_move {
        Color::White => b'6',
        Color::Black => b'3',
    };
    if rank != expected_rank {
        return Err(FenError::BadEnPassant(s.to_string()));
    }
    Ok(Some(file - b'a'))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn starting_position_round_trips() {
        let position = Position::starting();
        assert_eq!(position.to_fen(), STARTING_FEN);
    }

    #[test]
    fn piece_placement_orientation() {
        let position = Position::starting();
        assert_eq!(
            position.piece_at(Square::new(0, 0)),
            Some(Piece::new(PieceKind::Rook, Color::Black))
        );
        assert_eq!(
            position.piece_at(Square::new(7, 4)),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(position.piece_at(Square::new(4, 4)), None);
    }

    #[test]
    fn rejects_malformed_rank_count() {
        let err = Position::from_fen("8/8/8/8/8/8/8 w KQkq - 0 1").unwrap_err();
        assert_eq!(err, FenError::BadRankCount(7));
    }

    #[test]
    fn rejects_rank_not_summing_to_eight() {
        let err =
            Position::from_fen("pppppppp/8/8/8/8/8/8/pppppp w KQkq - 0 1").unwrap_err();
        assert!(matches!(err, FenError::BadRank(_)));
    }

    #[test]
    fn rejects_missing_king() {
        let err = Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert!(matches!(err, FenError::InvalidPosition(_)));
    }

    #[test]
    fn rejects_pawn_on_back_rank() {
        let err =
            Position::from_fen("Pnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap_err();
        assert!(matches!(err, FenError::InvalidPosition(_)));
    }

    #[test]
    fn rejects_unknown_castling_letter() {
        let err =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkqx - 0 1")
                .unwrap_err();
        assert!(matches!(err, FenError::BadCastling(_)));
    }

    #[test]
    fn en_passant_target_must_match_side_to_move() {
        // d6 is only a legal en-passant target when White is to move.
        let err = Position::from_fen(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR b KQkq d6 0 3",
        )
        .unwrap_err();
        assert!(matches!(err, FenError::BadEnPassant(_)));
    }

    #[test]
    fn display_matches_well_known_fen() {
        let position = Position::from_fen(
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4",
        )
        .unwrap();
        assert_eq!(
            position.to_fen(),
            "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4"
        );
    }
}
