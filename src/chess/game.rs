//! The public facade gluing position, move generation, the executor, hashing
//! and repetition tracking into a single playable game.

use std::cell::RefCell;

use crate::chess::core::{Color, PieceKind, Piece, Square};
use crate::chess::error::GameError;
use crate::chess::executor;
use crate::chess::hash;
use crate::chess::movegen;
use crate::chess::moves::Move;
use crate::chess::position::Position;
use crate::chess::repetition::RepetitionHistory;

/// Snapshot of rule-relevant conditions after the most recent apply, undo or
/// redo. Advisory: the engine never refuses a move because of these flags,
/// it only reports them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// Whether the side to move is currently in check.
    pub in_check: bool,
    pub white_in_check: bool,
    pub black_in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub repetition: bool,
    pub fifty_move_available: bool,
    pub insufficient_material: bool,
    pub promotion_pending: bool,
}

/// Result of a successful [`Game::apply`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The move completed; the attached status reflects the position that
    /// results from it.
    Applied(Status),
    /// The move was a pawn reaching the back rank with no promotion choice
    /// given. The game is now suspended; the next call must be
    /// [`Game::complete_promotion`].
    PromotionRequired,
}

/// A single in-progress chess game: the current position plus undo/redo
/// history and repetition tracking.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    undo_stack: Vec<Move>,
    redo_stack: Vec<Move>,
    repetition: RepetitionHistory,
    pending_promotion: Option<(Square, Square)>,
    /// Set once an internal invariant check fails. `&self` query methods
    /// (`status`, `legal_destinations`) can record a violation through this
    /// without needing `&mut self`; every mutating method refuses to
    /// proceed while it is set. Cleared only by [`Game::reset_to`], which
    /// rebuilds the game from scratch.
    poisoned: RefCell<Option<String>>,
}

impl Game {
    /// A fresh game from the standard starting position.
    #[must_use]
    pub fn new_game() -> Self {
        Self::from_position(Position::starting())
    }

    /// A fresh game loaded from a FEN string.
    pub fn load_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    fn from_position(position: Position) -> Self {
        let mut repetition = RepetitionHistory::new();
        repetition.push(hash::of(&position));
        Self {
            position,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            repetition,
            pending_promotion: None,
            poisoned: RefCell::new(None),
        }
    }

    /// Fails if an earlier call recorded an internal invariant violation;
    /// every mutating method checks this before doing anything else.
    fn check_not_poisoned(&self) -> Result<(), GameError> {
        if let Some(message) = self.poisoned.borrow().clone() {
            return Err(GameError::InvariantViolation(message));
        }
        Ok(())
    }

    /// Records an internal invariant violation and converts it into the
    /// error the caller should see. Once recorded, every mutating method
    /// refuses until [`Game::reset_to`] is called.
    fn poison(&self, err: anyhow::Error) -> GameError {
        let message = err.to_string();
        *self.poisoned.borrow_mut() = Some(message.clone());
        GameError::InvariantViolation(message)
    }

    /// Degrades a fallible internal computation to `T::default()` on
    /// failure, recording the failure as a poison so that subsequent
    /// mutating calls refuse. Used by `&self` query methods that can't
    /// propagate a `Result` without breaking their documented signature.
    fn checked<T: Default>(&self, result: anyhow::Result<T>) -> T {
        result.unwrap_or_else(|err| {
            let _ = self.poison(err);
            T::default()
        })
    }

    /// Discards all history and replaces the current game with the one
    /// described by `fen`.
    pub fn reset_to(&mut self, fen: &str) -> Result<(), GameError> {
        *self = Self::from_position(Position::from_fen(fen)?);
        Ok(())
    }

    /// The current position serialized as FEN.
    #[must_use]
    pub fn save_fen(&self) -> String {
        self.position.to_fen()
    }

    /// The piece on `square`, if any.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.piece_at(square)
    }

    /// The side to move in the current position.
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Rule-relevant flags for the current position.
    #[must_use]
    pub fn status(&self) -> Status {
        self.compute_status()
    }

    /// Legal destinations from `square`. Empty while a promotion is pending,
    /// since no other move may be played until it resolves.
    #[must_use]
    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        if self.pending_promotion.is_some() {
            return Vec::new();
        }
        self.checked(movegen::legal_moves_from(&self.position, square)).into_iter().collect()
    }

    /// The `(from, to)` of the most recently applied move, if any.
    #[must_use]
    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.undo_stack.last().map(|record| (record.from, record.to))
    }

    /// Number of moves available to undo.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of moves available to redo.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Number of positions recorded for repetition detection.
    #[must_use]
    pub fn repetition_history_len(&self) -> usize {
        self.repetition.len()
    }

    /// Attempts to play `from -> to`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if `to` is not among
    /// `legal_destinations(from)`, if a promotion choice is still
    /// outstanding from a previous call, or if an earlier call poisoned the
    /// game with [`GameError::InvariantViolation`].
    pub fn apply(&mut self, from: Square, to: Square) -> Result<ApplyOutcome, GameError> {
        self.check_not_poisoned()?;
        if self.pending_promotion.is_some() {
            return Err(GameError::IllegalMove { from: Some(from), to: Some(to) });
        }
        let legal = movegen::legal_moves_from(&self.position, from).map_err(|err| self.poison(err))?;
        if !legal.contains(&to) {
            return Err(GameError::IllegalMove { from: Some(from), to: Some(to) });
        }
        if movegen::is_promotion(&self.position, from, to) {
            self.pending_promotion = Some((from, to));
            return Ok(ApplyOutcome::PromotionRequired);
        }
        Ok(ApplyOutcome::Applied(self.commit(from, to, None)?))
    }

    /// Resolves a pending promotion with the chosen piece kind.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IllegalMove`] if no promotion is outstanding or
    /// if `kind` is not a legal promotion target (Queen, Rook, Bishop or
    /// Knight), or [`GameError::InvariantViolation`] if an earlier call
    /// poisoned the game.
    pub fn complete_promotion(&mut self, kind: PieceKind) -> Result<Status, GameError> {
        self.check_not_poisoned()?;
        let (from, to) =
            self.pending_promotion.ok_or(GameError::IllegalMove { from: None, to: None })?;
        if !kind.is_promotable() {
            return Err(GameError::IllegalMove { from: Some(from), to: Some(to) });
        }
        self.pending_promotion = None;
        self.commit(from, to, Some(kind))
    }

    fn commit(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<Status, GameError> {
        let record = executor::apply_to_position(&mut self.position, from, to, promotion)
            .map_err(|err| self.poison(err))?;
        if self.position.halfmove_clock() == 0 {
            self.repetition.clear();
        }
        self.repetition.push(hash::of(&self.position));
        self.undo_stack.push(record);
        self.redo_stack.clear();
        Ok(self.compute_status())
    }

    /// Reverses the most recently applied move.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NothingToUndo`] if the undo stack is empty, or
    /// [`GameError::InvariantViolation`] if an earlier call poisoned the
    /// game.
    pub fn undo(&mut self) -> Result<Status, GameError> {
        self.check_not_poisoned()?;
        let record = self.undo_stack.pop().ok_or(GameError::NothingToUndo)?;
        let _ = self.repetition.pop();
        executor::undo_on_position(&mut self.position, &record);
        self.redo_stack.push(record);
        Ok(self.compute_status())
    }

    /// Reapplies the most recently undone move.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NothingToRedo`] if the redo stack is empty, or
    /// [`GameError::InvariantViolation`] if an earlier call poisoned the
    /// game.
    pub fn redo(&mut self) -> Result<Status, GameError> {
        self.check_not_poisoned()?;
        let record = self.redo_stack.pop().ok_or(GameError::NothingToRedo)?;
        executor::apply_to_position(&mut self.position, record.from, record.to, record.promotion)
            .map_err(|err| self.poison(err))?;
        if self.position.halfmove_clock() == 0 {
            self.repetition.clear();
        }
        self.repetition.push(hash::of(&self.position));
        self.undo_stack.push(record);
        Ok(self.compute_status())
    }

    fn compute_status(&self) -> Status {
        let side = self.position.side_to_move();
        let white_in_check = self.checked(movegen::is_in_check(&self.position, Color::White));
        let black_in_check = self.checked(movegen::is_in_check(&self.position, Color::Black));
        let in_check = match side {
            Color::White => white_in_check,
            Color::Black => black_in_check,
        };
        let has_move = self.checked(has_any_legal_move(&self.position));
        let current_hash = hash::of(&self.position);
        Status {
            in_check,
            white_in_check,
            black_in_check,
            checkmate: in_check && !has_move,
            stalemate: !in_check && !has_move,
            repetition: self.position.halfmove_clock() > 0
                && self.repetition.is_threefold(current_hash),
            fifty_move_available: self.position.halfmove_clock() >= 100,
            insufficient_material: is_insufficient_material(&self.position),
            promotion_pending: self.pending_promotion.is_some(),
        }
    }
}

fn has_any_legal_move(position: &Position) -> anyhow::Result<bool> {
    for (row, col) in itertools::iproduct!(0..8u8, 0..8u8) {
        let square = Square::new(row, col);
        match position.piece_at(square) {
            Some(piece) if piece.color == position.side_to_move() => {
                if !movegen::legal_moves_from(position, square)?.is_empty() {
                    return Ok(true);
                }
            }
            _ => {}
        }
    }
    Ok(false)
}

fn is_insufficient_material(position: &Position) -> bool {
    let mut pieces = Vec::new();
    for (row, col) in itertools::iproduct!(0..8u8, 0..8u8) {
        let square = Square::new(row, col);
        if let Some(piece) = position.piece_at(square) {
            if piece.kind != PieceKind::King {
                pieces.push((square, piece));
            }
        }
    }
    match pieces.as_slice() {
        [] => true,
        [(_, piece)] => matches!(piece.kind, PieceKind::Bishop | PieceKind::Knight),
        [(square_a, a), (square_b, b)] => {
            a.kind == PieceKind::Bishop
                && b.kind == PieceKind::Bishop
                && a.color != b.color
                && square_color(*square_a) == square_color(*square_b)
        }
        _ => false,
    }
}

fn square_color(square: Square) -> bool {
    (square.row + square.col) % 2 == 0
}
