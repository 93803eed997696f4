/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Colors, piece kinds, and the piece byte encoding.
pub(crate) mod piece;

/// The board array, position setup, FEN import/export, and the check scan.
pub(crate) mod position;

/// 0x88 squares and moves.
pub(crate) mod square;

/// Static step-vector and capture-value tables.
pub(crate) mod table;

pub use piece::{Color, Piece, PieceKind};
pub use position::Position;
pub use square::{Move, MoveList, Square, MAX_MOVES};
