//! Board primitives shared by every other module in [`crate::chess`]: colors,
//! piece kinds, squares, and castling rights.

use std::fmt;

use anyhow::bail;
use bitflags::bitflags;

/// Width (and height) of a standard chessboard.
pub const BOARD_SIZE: u8 = 8;

/// One of the two sides playing the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::White => "w",
            Self::Black => "b",
        })
    }
}

impl TryFrom<&str> for Color {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("invalid color: {value}"),
        }
    }
}

/// Kind of chess piece, independent of color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Whether this kind is a legal promotion target (Queen, Rook, Bishop or
    /// Knight).
    #[must_use]
    pub const fn is_promotable(self) -> bool {
        !matches!(self, Self::King | Self::Pawn)
    }
}

/// A colored piece occupying a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    #[must_use]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }
}

/// A board square addressed as (row, col), both in `0..8`. Row 0 is the top
/// rank (Black's back rank in the initial position); row 7 is the bottom
/// rank (White's back rank). Col 0 is the a-file; col 7 is the h-file. This
/// orientation is used throughout the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    /// Builds a square from in-bounds coordinates.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) if `row` or `col` is outside `0..8`.
    #[must_use]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE && col < BOARD_SIZE, "square out of bounds");
        Self { row, col }
    }

    /// Builds a square from possibly out-of-bounds signed coordinates,
    /// returning `None` if either falls outside the board.
    #[must_use]
    pub fn try_new(row: i8, col: i8) -> Option<Self> {
        let size = i8::try_from(BOARD_SIZE).unwrap();
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Self {
                row: u8::try_from(row).unwrap(),
                col: u8::try_from(col).unwrap(),
            })
        } else {
            None
        }
    }

    /// The algebraic file letter (`'a'..='h'`).
    #[must_use]
    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    /// The algebraic rank digit (`1..=8`).
    #[must_use]
    pub fn rank_digit(self) -> u8 {
        BOARD_SIZE - self.row
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_digit())
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        let bytes = value.as_bytes();
        if bytes.len() != 2 {
            bail!("invalid square: {value}");
        }
        let file = bytes[0];
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            bail!("invalid square: {value}");
        }
        let col = file - b'a';
        let row = BOARD_SIZE - (rank - b'0');
        Ok(Self::new(row, col))
    }
}

bitflags! {
    /// The four castling rights, independent of one another.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CastlingRights: u8 {
        const WHITE_KINGSIDE = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        if self.contains(Self::WHITE_KINGSIDE) {
            f.write_str("K")?;
        }
        if self.contains(Self::WHITE_QUEENSIDE) {
            f.write_str("Q")?;
        }
        if self.contains(Self::BLACK_KINGSIDE) {
            f.write_str("k")?;
        }
        if self.contains(Self::BLACK_QUEENSIDE) {
            f.write_str("q")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn square_round_trips_through_algebraic_notation() {
        for algebraic in ["a1", "h8", "e4", "d1", "a8"] {
            let square = Square::try_from(algebraic).unwrap();
            assert_eq!(square.to_string(), algebraic);
        }
    }

    #[test]
    fn square_orientation_matches_spec() {
        // e1 is White's king home square: row 7, col 4.
        assert_eq!(Square::try_from("e1").unwrap(), Square::new(7, 4));
        // e8 is Black's king home square: row 0, col 4.
        assert_eq!(Square::try_from("e8").unwrap(), Square::new(0, 4));
    }

    #[test]
    fn castling_rights_display_order_is_kqkq() {
        let rights = CastlingRights::BLACK_QUEENSIDE | CastlingRights::WHITE_KINGSIDE;
        assert_eq!(rights.to_string(), "Kq");
        assert_eq!(CastlingRights::empty().to_string(), "-");
    }

    #[test]
    fn color_opponent_is_an_involution() {
        assert_eq!(Color::White.opponent(), Color::Black);
        assert_eq!(Color::White.opponent().opponent(), Color::White);
    }
}
