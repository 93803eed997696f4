/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Result};

/// Marker value for "no square".
///
/// Any value with a bit of `0x88` set is off the board; `0x80` is the
/// canonical sentinel.
pub(crate) const SQUARE_INVALID: u8 = 0x80;

/// Maximum number of moves the engine will report for a single position.
pub const MAX_MOVES: usize = 256;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_MOVES>;

/// A square on the board, encoded as `rank * 16 + file` (the 0x88 layout).
///
/// Rank 0 is the top of the board as printed (the eighth rank in algebraic
/// notation), file 0 is the leftmost file (the `a` file). The layout leaves
/// the high nibble usable as an off-board detector: a square is on the board
/// exactly when `value & 0x88 == 0`.
///
/// # Example
/// ```
/// # use minnow::Square;
/// let e4 = Square::from_uci("e4").unwrap();
/// assert_eq!(e4, Square(0x44));
/// assert_eq!(e4.to_string(), "e4");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Square(pub u8);

impl Square {
    /// The "no square" sentinel.
    pub const INVALID: Self = Self(SQUARE_INVALID);

    /// Returns `true` if this [`Square`] lies on the board.
    #[inline(always)]
    pub const fn is_valid(self) -> bool {
        self.0 & 0x88 == 0
    }

    /// File of this square, `0..8`, with 0 being the `a` file.
    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 & 0x7
    }

    /// Rank of this square, `0..8`, with 0 being the *top* rank as printed
    /// (rank `8` in algebraic notation).
    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 >> 4
    }

    /// Parses a [`Square`] from algebraic notation like `e4`.
    pub fn from_uci(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Square must be a file letter followed by a rank digit. Got {s:?}");
        };

        if !('a'..='h').contains(&file) {
            bail!("Square file must be between 'a' and 'h'. Got {file:?}");
        }
        if !('1'..='8').contains(&rank) {
            bail!("Square rank must be between '1' and '8'. Got {rank:?}");
        }

        Ok(Self(16 * (b'8' - rank as u8) + (file as u8 - b'a')))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(
                f,
                "{}{}",
                (b'a' + self.file()) as char,
                (b'8' - self.rank()) as char
            )
        } else {
            write!(f, "-")
        }
    }
}

/// A move, as a pair of squares.
///
/// Promotion is implicit: a pawn reaching its last rank always becomes a
/// queen, so no promotion piece is carried.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    /// The "no move" sentinel: both squares invalid.
    pub const INVALID: Self = Self {
        from: Square::INVALID,
        to: Square::INVALID,
    };

    /// Creates a new [`Move`] from `from` to `to`.
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Returns `true` if both squares of this [`Move`] lie on the board.
    #[inline(always)]
    pub const fn is_valid(self) -> bool {
        self.from.is_valid() && self.to.is_valid()
    }

    /// Parses a [`Move`] from coordinate notation like `e2e4`.
    ///
    /// A trailing `q` is accepted and ignored, since promotion is always to
    /// a queen.
    ///
    /// # Example
    /// ```
    /// # use minnow::Move;
    /// let mv = Move::from_uci("e2e4").unwrap();
    /// assert_eq!(mv.to_string(), "e2e4");
    /// assert!(Move::from_uci("e2").is_err());
    /// ```
    pub fn from_uci(s: &str) -> Result<Self> {
        let s = s.strip_suffix(['q', 'Q']).unwrap_or(s);
        let (Some(from), Some(to), 4) = (s.get(0..2), s.get(2..4), s.len()) else {
            bail!("Move must be two squares in coordinate notation, like 'e2e4'. Got {s:?}");
        };

        Ok(Self {
            from: Square::from_uci(from)?,
            to: Square::from_uci(to)?,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}{}", self.from, self.to)
        } else {
            write!(f, "0000")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_encoding_round_trips() {
        assert_eq!(Square::from_uci("a8").unwrap(), Square(0x00));
        assert_eq!(Square::from_uci("h8").unwrap(), Square(0x07));
        assert_eq!(Square::from_uci("a1").unwrap(), Square(0x70));
        assert_eq!(Square::from_uci("h1").unwrap(), Square(0x77));
        assert_eq!(Square::from_uci("e2").unwrap(), Square(0x64));

        for raw in 0..0x78 {
            let square = Square(raw);
            if square.is_valid() {
                assert_eq!(Square::from_uci(&square.to_string()).unwrap(), square);
            }
        }
    }

    #[test]
    fn square_rejects_garbage() {
        assert!(Square::from_uci("").is_err());
        assert!(Square::from_uci("e").is_err());
        assert!(Square::from_uci("i4").is_err());
        assert!(Square::from_uci("e9").is_err());
        assert!(Square::from_uci("e44").is_err());
    }

    #[test]
    fn move_parsing() {
        let mv = Move::from_uci("e2e4").unwrap();
        assert_eq!(mv.from, Square(0x64));
        assert_eq!(mv.to, Square(0x44));

        // Promotion suffix is tolerated
        let mv = Move::from_uci("a7a8q").unwrap();
        assert_eq!(mv.to_string(), "a7a8");

        assert!(Move::from_uci("e2").is_err());
        assert!(Move::from_uci("e2e4e5").is_err());
    }

    #[test]
    fn invalid_move_displays_as_null() {
        assert_eq!(Move::INVALID.to_string(), "0000");
        assert!(!Move::INVALID.is_valid());
    }
}
