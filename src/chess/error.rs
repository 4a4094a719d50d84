//! Structured error taxonomy for the public [`crate::chess::game::Game`]
//! surface, matchable by callers rather than a single opaque string.

use thiserror::Error;

use crate::chess::core::Square;

/// Failure parsing a FEN string into a [`crate::chess::position::Position`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 8 ranks in piece placement, got {0}")]
    BadRankCount(usize),
    #[error("rank '{0}' does not describe exactly 8 squares")]
    BadRank(String),
    #[error("unknown character '{0}' in piece placement")]
    UnknownCharacter(char),
    #[error("missing FEN field: {0}")]
    MissingField(&'static str),
    #[error("invalid side to move: '{0}'")]
    BadColor(String),
    #[error("invalid castling rights: '{0}'")]
    BadCastling(String),
    #[error("invalid en passant target: '{0}'")]
    BadEnPassant(String),
    #[error("invalid number in field '{field}': '{value}'")]
    BadNumber { field: &'static str, value: String },
    #[error("trailing data after fullmove number")]
    TrailingData,
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

/// Failure applying, undoing, or redoing a move on a
/// [`crate::chess::game::Game`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Covers every way a requested move is rejected: the destination isn't
    /// among the source square's legal moves, the source is empty or holds
    /// the wrong color, a move was attempted while a promotion choice was
    /// still outstanding, or `complete_promotion` was called with none
    /// pending. `from`/`to` are `None` only in that last case.
    #[error("illegal move{}", describe_move(*from, *to))]
    IllegalMove {
        from: Option<Square>,
        to: Option<Square>,
    },
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error("invalid FEN: {0}")]
    Fen(#[from] FenError),
    /// An internal self-consistency check failed; this indicates a bug
    /// rather than a user-facing condition. The game refuses further
    /// mutating calls until it is reset.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

fn describe_move(from: Option<Square>, to: Option<Square>) -> String {
    match (from, to) {
        (Some(from), Some(to)) => format!(" from {from} to {to}"),
        _ => " (no promotion pending)".to_string(),
    }
}
