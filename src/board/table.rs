/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Static tables that parameterise move generation by piece type.

/// Material value of a captured piece, indexed by piece-type code and later
/// scaled by 37. The king's entry is negative so that capturing it drives the
/// capture value below zero, which the search treats as a decided game.
pub(crate) const CAPTURE_VALUES: [i8; 8] = [0, 2, 2, 7, -1, 8, 12, 23];

/// Start index into [`STEP_VECTORS`] per piece-type code. The iterator
/// pre-increments, so each entry points one slot *before* the piece's run.
pub(crate) const STEP_VECTOR_START: [i8; 8] = [0, 7, -1, 11, 6, 8, 3, 6];

/// Zero-terminated runs of 0x88 direction offsets.
///
/// Offsets are negated as they are read; non-pawn pieces then flip each
/// offset once more, covering both senses of a ray with a single entry.
/// Pawns read a single sense only: the downstream pawn starts at index -1
/// (offsets become +16, +15, +17) and the upstream pawn at index 7 (the
/// rook/king run doubles as its -16, -15, -17 once negated).
pub(crate) const STEP_VECTORS: [i8; 17] = [
    -16, -15, -17, 0, // downstream pawn
    1, 16, 0, // rook
    1, 16, 15, 17, 0, // king, queen
    14, 18, 31, 33, 0, // knight
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::piece::*;

    /// Walks a piece's direction run the way the move generator does.
    fn directions_of(piece_type: u8) -> Vec<i8> {
        let mut directions = Vec::new();
        let mut index = STEP_VECTOR_START[piece_type as usize];
        let mut vector = piece_type as i8;
        loop {
            vector = if piece_type > 2 && vector < 0 {
                -vector
            } else {
                index += 1;
                -STEP_VECTORS[index as usize]
            };
            if vector == 0 {
                break;
            }
            directions.push(vector);
        }
        directions
    }

    #[test]
    fn pawn_runs_are_single_sense() {
        assert_eq!(directions_of(PAWN_UPSTREAM), vec![-16, -15, -17]);
        assert_eq!(directions_of(PAWN_DOWNSTREAM), vec![16, 15, 17]);
    }

    #[test]
    fn piece_runs_cover_both_senses() {
        assert_eq!(directions_of(KNIGHT), vec![-14, 14, -18, 18, -31, 31, -33, 33]);
        assert_eq!(directions_of(ROOK), vec![-1, 1, -16, 16]);
        assert_eq!(directions_of(BISHOP), vec![-15, 15, -17, 17]);
        assert_eq!(
            directions_of(KING),
            vec![-1, 1, -16, 16, -15, 15, -17, 17]
        );
        assert_eq!(directions_of(QUEEN), directions_of(KING));
    }
}
