/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::board::{square::SQUARE_INVALID, Color, Move, MoveList, Piece, Position, Square};

/// A callback invoked at the entry of every search frame, with the running
/// node count. Request cancellation from inside it through a clone of
/// [`Game::stop_signal`].
pub(crate) type Callback = Box<dyn FnMut(u32)>;

/// A chess engine instance: one position plus the search bookkeeping.
///
/// All operations mutate the engine in place; searches restore the position
/// on every path except a successful [`Game::play`]. A single instance
/// supports one search at a time.
///
/// # Example
/// ```
/// # use minnow::{Game, Move};
/// let mut game = Game::new();
/// assert!(game.play(Move::from_uci("e2e4").unwrap()));
/// let reply = game.best_move(10_000, 4);
/// assert!(reply.is_some());
/// ```
pub struct Game {
    pub(crate) position: Position,

    /// Requested move during `play`/`find-best`; `0x80` is the wildcard.
    pub(crate) target_from: u8,
    pub(crate) target_to: u8,

    /// Nodes visited by the current search.
    pub(crate) nodes: u32,

    /// Node allowance for iterative deepening at the root.
    pub(crate) node_max: u32,

    /// Depth ceiling for iterative deepening at the root.
    pub(crate) depth_max: u32,

    /// Cooperative cancellation flag, shared with hosts and callbacks.
    pub(crate) stop: Arc<AtomicBool>,

    /// Periodic host callback, if one is installed.
    pub(crate) callback: Option<Callback>,
}

impl Game {
    /// Creates an engine holding the standard initial position.
    pub fn new() -> Self {
        Self {
            position: Position::new(),
            target_from: SQUARE_INVALID,
            target_to: SQUARE_INVALID,
            nodes: 0,
            node_max: 0,
            depth_max: 0,
            stop: Arc::default(),
            callback: None,
        }
    }

    /// Resets the engine to the standard initial position.
    ///
    /// Unlike loading the starting position from a string, this leaves every
    /// piece virgin, so castling rights and double pawn pushes are intact.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.position = Position::new();
    }

    /// Loads a position from a FEN-style string. See [`Position::from_fen`]
    /// for the (permissive) format.
    #[inline(always)]
    pub fn set_position(&mut self, fen: &str) {
        self.position = Position::from_fen(fen);
    }

    /// Exports the current position as a FEN-style string.
    #[inline(always)]
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// The current [`Position`].
    #[inline(always)]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the piece at `square`, or `None` if empty or off the board.
    #[inline(always)]
    pub fn piece(&self, square: Square) -> Option<Piece> {
        self.position.piece(square)
    }

    /// The [`Color`] whose turn it is.
    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// Nodes visited by the most recent search.
    #[inline(always)]
    pub fn nodes(&self) -> u32 {
        self.nodes
    }

    /// Enumerates the side to move's moves into a [`MoveList`].
    ///
    /// Convenience wrapper around [`Game::valid_moves`]; a position cannot
    /// out-grow the list's capacity.
    pub fn moves(&mut self) -> MoveList {
        let mut buffer = [Move::INVALID; crate::MAX_MOVES];
        let count = self.valid_moves(&mut buffer).min(crate::MAX_MOVES);
        buffer[..count].iter().copied().collect()
    }

    /// Returns `true` if `color`'s king is currently attacked.
    #[inline(always)]
    pub fn in_check(&self, color: Color) -> bool {
        self.position.in_check(color)
    }

    /// Returns `true` if `color` is checkmated: in check with no move that
    /// escapes it. The engine state is unchanged on return.
    pub fn is_checkmate(&mut self, color: Color) -> bool {
        if !self.position.in_check(color) {
            return false;
        }

        self.has_no_legal_move(color)
    }

    /// Returns `true` if `color` is stalemated: not in check, but without
    /// any move that does not expose the king. The engine state is unchanged
    /// on return.
    pub fn is_stalemate(&mut self, color: Color) -> bool {
        if self.position.in_check(color) {
            return false;
        }

        self.has_no_legal_move(color)
    }

    /// Trial-plays every enumerated move for `color` and reports whether
    /// none of them leaves the king safe.
    ///
    /// Playing commits on success, so each trial snapshots the position and
    /// restores it afterwards; the pre-call state is restored before
    /// returning.
    fn has_no_legal_move(&mut self, color: Color) -> bool {
        let saved = self.position;
        self.position.side = color.mask();

        let moves = self.moves();

        let mut escaped = false;
        for mv in moves {
            let trial = self.position;
            if self.play(mv) && !self.position.in_check(color) {
                escaped = true;
            }
            self.position = trial;
            if escaped {
                break;
            }
        }

        self.position = saved;
        !escaped
    }

    /// Installs the periodic search callback, replacing any previous one.
    ///
    /// The callback runs at the entry of every search frame and receives the
    /// running node count. To abort the search from inside it, capture a
    /// clone of [`Game::stop_signal`] and set it.
    #[inline(always)]
    pub fn set_callback(&mut self, callback: impl FnMut(u32) + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Removes the periodic search callback.
    #[inline(always)]
    pub fn clear_callback(&mut self) {
        self.callback = None;
    }

    /// The shared cancellation flag. Setting it to `true` makes a running
    /// search unwind at its next frame boundary; starting a new search
    /// clears it.
    #[inline(always)]
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Requests that the current search stop.
    #[inline(always)]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Default for Game {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_check_is_not_mate() {
        let mut game = Game::new();
        game.set_position("4k3/4R3/8/8/8/8/8/4K3 b - - 0 1");

        assert!(game.in_check(Color::Black));
        assert!(!game.is_checkmate(Color::Black));
        assert!(!game.is_stalemate(Color::Black));
    }

    #[test]
    fn queen_contact_check_is_escapable() {
        let mut game = Game::new();
        game.set_position("4k3/4Q3/8/8/8/8/8/4K3 b - - 0 1");

        assert!(game.in_check(Color::Black));
        // The undefended queen can be captured
        assert!(!game.is_checkmate(Color::Black));
    }

    #[test]
    fn protected_queen_mates() {
        let mut game = Game::new();
        game.set_position("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1");

        assert!(game.in_check(Color::Black));
        assert!(game.is_checkmate(Color::Black));
        assert!(!game.is_stalemate(Color::Black));
    }

    #[test]
    fn cornered_king_is_stalemated() {
        let mut game = Game::new();
        game.set_position("k7/P7/1K6/8/8/8/8/8 b - - 0 1");

        assert!(!game.in_check(Color::Black));
        assert!(game.is_stalemate(Color::Black));
        assert!(!game.is_checkmate(Color::Black));
    }

    #[test]
    fn open_positions_are_neither() {
        let mut game = Game::new();
        assert!(!game.is_checkmate(Color::White));
        assert!(!game.is_stalemate(Color::White));
        assert!(!game.is_checkmate(Color::Black));
        assert!(!game.is_stalemate(Color::Black));
    }

    #[test]
    fn probes_restore_the_state() {
        let mut game = Game::new();
        game.set_position("4k3/4Q3/8/8/8/8/8/4K3 b - - 0 1");
        let before = *game.position();

        game.is_checkmate(Color::Black);
        assert_eq!(*game.position(), before);

        game.is_stalemate(Color::Black);
        assert_eq!(*game.position(), before);

        // Probing the side not on move restores the side as well
        game.is_checkmate(Color::White);
        assert_eq!(*game.position(), before);
    }

    #[test]
    fn callback_fires_during_search() {
        use std::{cell::Cell, rc::Rc};

        let mut game = Game::new();
        let calls = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&calls);
        game.set_callback(move |_| counter.set(counter.get() + 1));

        game.best_move(1_000, 4);
        assert!(calls.get() > 0);

        game.clear_callback();
        calls.set(0);
        game.best_move(1_000, 4);
        assert_eq!(calls.get(), 0);
    }
}
