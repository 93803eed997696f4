/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::atomic::Ordering;

use crate::{
    board::{
        piece::PIECE_MOVED,
        square::SQUARE_INVALID,
        table::{CAPTURE_VALUES, STEP_VECTORS, STEP_VECTOR_START},
        Move, Square,
    },
    game::Game,
};

/// Score of a decided game. A search that reports this value has either
/// found its requested move or refuted the position outright.
pub const SCORE_MAX: i32 = 8000;

/// Hard ceiling on iterative-deepening depth.
pub const DEPTH_MAX: u8 = 99;

/// What a call into the search is for.
///
/// One routine serves four purposes: plain recursion, enumerating the moves
/// of the current position, locating the best move under a budget, and
/// playing one specific move. The mode decides what happens when a candidate
/// move has been evaluated.
pub(crate) enum Mode<'a> {
    /// An internal node; no reporting.
    Internal,
    /// Collect every acceptable root move into `buffer`. `count` keeps the
    /// untruncated total.
    Enumerate {
        buffer: &'a mut [Move],
        count: usize,
    },
    /// Unwind with a hit as soon as the engine's target move is reached.
    FindBest,
    /// Like `FindBest`, but leave the target move made on the board.
    Play,
}

impl Game {
    /// Recursive alpha-beta search with iterative deepening.
    ///
    /// `(alpha, beta)` is the window, `score` the running evaluation from
    /// the side to move, `en_passant` the square a pawn just skipped (doubles
    /// as the castling skip square one ply down), `depth` the minimum number
    /// of deepening passes. The side to move is read from the engine state
    /// and flipped around every recursion.
    ///
    /// Moves are generated, made, searched, and unmade in place; the board
    /// is restored on every path except a committed `Mode::Play` hit.
    pub(crate) fn search(
        &mut self,
        mut alpha: i32,
        mut beta: i32,
        score: i32,
        en_passant: u8,
        depth: u8,
        mode: &mut Mode<'_>,
    ) -> i32 {
        let searched = self.nodes;
        if let Some(callback) = self.callback.as_mut() {
            callback(searched);
        }

        // Delay bonus: shrink the window by one on the side facing the
        // static score, so mates are taken sooner and losses later
        alpha -= (alpha < score) as i32;
        beta -= (beta <= score) as i32;

        let mut iter_depth: u8 = 0;
        let mut iter_score: i32 = 0;
        let mut iter_from: u8 = 0;
        let mut iter_to: u8 = 0;

        loop {
            // Deepen while the requested depth allows, but never stop below
            // two passes. At the root with no target move pinned yet, keep
            // deepening until a budget runs out; at that point pin the best
            // move found so far and run one final pass that terminates on it.
            let proceed = {
                let deepen = iter_depth < depth;
                iter_depth = iter_depth.wrapping_add(1);
                if deepen || iter_depth < 3 {
                    true
                } else if matches!(mode, Mode::Internal) || self.target_from != SQUARE_INVALID {
                    false
                } else if self.nodes < self.node_max && u32::from(iter_depth) <= self.depth_max {
                    true
                } else {
                    self.target_from = iter_from;
                    self.target_to = iter_to & 0x77;
                    iter_depth = 3;
                    true
                }
            };
            if !proceed {
                break;
            }

            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            // Scan from the previous iteration's best square; enumeration
            // scans from the top for a stable order
            let square_start = if matches!(mode, Mode::Enumerate { .. }) {
                0
            } else {
                iter_from
            };
            let mut square_from = square_start;

            // A set high bit on the stored best target means it can be
            // replayed first as a move-ordering hint
            let mut replay_move = iter_to & SQUARE_INVALID;

            // Null move: pass the turn and probe with a zero-width window
            self.position.side ^= 0x18;
            let null_move_score = if iter_depth > 2 && beta != -SCORE_MAX {
                self.search(
                    -beta,
                    1 - beta,
                    -score,
                    SQUARE_INVALID,
                    iter_depth - 3,
                    &mut Mode::Internal,
                )
            } else {
                SCORE_MAX
            };
            self.position.side ^= 0x18;

            // A fail-high null move tightens the fallback score, unless so
            // much material is gone that zugzwang looms; otherwise fall back
            // to the static score at depth two and to a loss deeper up
            iter_score = if -null_move_score < beta || self.position.non_pawn_material > 35 {
                if iter_depth != 2 {
                    -SCORE_MAX
                } else {
                    score
                }
            } else {
                -null_move_score
            };

            self.nodes = self.nodes.wrapping_add(1);

            'scan: loop {
                let scan_piece = self.position[square_from];

                if scan_piece & self.position.side != 0 {
                    let scan_type = scan_piece & 0b111;
                    let mut vector_index = STEP_VECTOR_START[scan_type as usize];
                    let mut step_vector = scan_type as i8;

                    // Directions: negate the previous offset for the second
                    // sense of a ray, else advance to the next table entry
                    loop {
                        step_vector = if scan_type > 2 && step_vector < 0 {
                            -step_vector
                        } else {
                            vector_index += 1;
                            -STEP_VECTORS[vector_index as usize]
                        };
                        if step_vector == 0 {
                            break;
                        }

                        'replay: loop {
                            let mut square_to = square_from;
                            let mut skip_square = SQUARE_INVALID;
                            let mut rook_square = SQUARE_INVALID;
                            let mut capture_piece: u8;

                            // Walk the ray
                            loop {
                                // Sneak in the remembered best move before
                                // the regular iteration
                                square_to = if replay_move != 0 {
                                    iter_to ^ replay_move
                                } else {
                                    square_to.wrapping_add(step_vector as u8)
                                };
                                let mut capture_square = square_to;

                                if square_to & 0x88 != 0 {
                                    break;
                                }

                                // The skipped square of a castle arrives here
                                // as the en-passant target; any reply landing
                                // on or beside it refutes the castle
                                if en_passant != SQUARE_INVALID
                                    && self.position[en_passant] != 0
                                    && square_to.wrapping_sub(en_passant) < 2
                                    && en_passant.wrapping_sub(square_to) < 2
                                {
                                    iter_score = SCORE_MAX;
                                }

                                // En passant takes the pawn one rank behind
                                if scan_type < 3 && square_to == en_passant {
                                    capture_square ^= 16;
                                }

                                capture_piece = self.position[capture_square];

                                // No capturing our own, and pawns move
                                // straight only without capture, diagonally
                                // only with one
                                let straight = square_to.wrapping_sub(square_from) & 0b111 == 0;
                                if capture_piece & self.position.side != 0
                                    || (scan_type < 3 && straight != (capture_piece == 0))
                                {
                                    break;
                                }

                                let mut capture_value = 37
                                    * CAPTURE_VALUES[(capture_piece & 0b111) as usize] as i32
                                    + (capture_piece & 0xc0) as i32;

                                // The king's negative table value marks its
                                // capture: the game is decided
                                if capture_value < 0 {
                                    iter_score = SCORE_MAX;
                                    iter_depth = DEPTH_MAX - 1;
                                }

                                if iter_score >= beta && iter_depth > 1 {
                                    break 'scan;
                                }

                                // Depth one orders captures by MVV/LVA
                                let mut step_score = if iter_depth != 1 {
                                    score
                                } else {
                                    capture_value - scan_type as i32
                                };

                                // Depth two considers captures only; deeper
                                // passes evaluate everything
                                if iter_depth as i32 - (capture_piece == 0) as i32 > 1 {
                                    // Positional delta off the center table;
                                    // rooks and queens score flat
                                    step_score = if scan_type < 6 {
                                        self.position[square_from + 8] as i32
                                            - self.position[square_to + 8] as i32
                                    } else {
                                        0
                                    };

                                    // Make the move
                                    self.position[rook_square] = 0;
                                    self.position[capture_square] = 0;
                                    self.position[square_from] = 0;
                                    self.position[square_to] = scan_piece | PIECE_MOVED;

                                    // Castling drops the rook on the skipped
                                    // square
                                    if rook_square & 0x88 == 0 {
                                        self.position[skip_square] = self.position.side + 6;
                                        step_score += 50;
                                    }

                                    // Keep the king at home while material
                                    // remains
                                    if scan_type == 4 && self.position.non_pawn_material <= 30 {
                                        step_score -= 20;
                                    }

                                    if scan_type < 3 {
                                        // Doubled or isolated neighbours cost,
                                        // a friendly king directly adjacent in
                                        // file pays, and pushes gain value as
                                        // material comes off
                                        let left = square_from.wrapping_sub(2);
                                        let right = square_from.wrapping_add(2);
                                        let lonely_left = left & 0x88 != 0
                                            || self.position[left] != scan_piece;
                                        let lonely_right = right & 0x88 != 0
                                            || self.position[right] != scan_piece;
                                        let king_magnet = self.position[square_from ^ 0x10]
                                            == self.position.side + 36;
                                        step_score -= 9
                                            * (lonely_left as i32 + lonely_right as i32 - 1
                                                + king_magnet as i32)
                                            - (self.position.non_pawn_material >> 2);

                                        // Landing beyond the last rank step
                                        // means promotion: upgrade the byte in
                                        // place to a moved queen
                                        let upgrade = if square_to
                                            .wrapping_add(step_vector as u8)
                                            .wrapping_add(1)
                                            & SQUARE_INVALID
                                            != 0
                                        {
                                            647 - scan_type as i32
                                        } else {
                                            2 * ((scan_piece
                                                & square_to.wrapping_add(0x10)
                                                & 0x20) as i32)
                                        };
                                        capture_value += upgrade;
                                        self.position[square_to] =
                                            self.position[square_to].wrapping_add(upgrade as u8);
                                    }

                                    step_score += score + capture_value;
                                    let step_alpha = iter_score.max(alpha);

                                    // Late quiet moves of pieces get one ply
                                    // less, except the hinted move
                                    let mut step_depth = iter_depth
                                        - 1
                                        - (iter_depth > 5
                                            && scan_type > 2
                                            && capture_piece == 0
                                            && replay_move == 0)
                                            as u8;

                                    // In-check extension, approximated: little
                                    // material left, the null move lost the
                                    // king, and no capture unless by the king
                                    if self.position.non_pawn_material <= 30
                                        && null_move_score == SCORE_MAX
                                        && iter_depth >= 3
                                        && !(capture_piece != 0 && scan_type != 4)
                                    {
                                        step_depth = iter_depth;
                                    }

                                    // Evaluate the reply; on a fail high after
                                    // a reduction, re-search one ply deeper
                                    // until the full depth is restored
                                    let mut step_score_new;
                                    loop {
                                        self.position.side ^= 0x18;
                                        step_score_new = if matches!(mode, Mode::Enumerate { .. })
                                            || step_depth > 2
                                            || step_score > step_alpha
                                        {
                                            -self.search(
                                                -beta,
                                                -step_alpha,
                                                -step_score,
                                                skip_square,
                                                step_depth,
                                                &mut Mode::Internal,
                                            )
                                        } else {
                                            step_score
                                        };
                                        self.position.side ^= 0x18;

                                        if step_score_new <= alpha {
                                            break;
                                        }
                                        step_depth += 1;
                                        if step_depth >= iter_depth {
                                            break;
                                        }
                                    }
                                    step_score = step_score_new;

                                    if matches!(mode, Mode::Play)
                                        && step_score != -SCORE_MAX
                                        && square_from == self.target_from
                                        && square_to == self.target_to
                                    {
                                        // The requested move checks out: keep
                                        // it on the board and hand the turn
                                        // over
                                        self.position.score = -score - capture_value;
                                        self.position.en_passant = skip_square;
                                        self.position.non_pawn_material += capture_value >> 7;
                                        self.position.side ^= 0x18;
                                        return beta;
                                    }

                                    // Unmake the move
                                    self.position[rook_square] = self.position.side + 6;
                                    self.position[skip_square] = 0;
                                    self.position[square_to] = 0;
                                    self.position[square_from] = scan_piece;
                                    self.position[capture_square] = capture_piece;

                                    if matches!(mode, Mode::FindBest)
                                        && step_score != -SCORE_MAX
                                        && square_from == self.target_from
                                        && square_to == self.target_to
                                    {
                                        return beta;
                                    }

                                    if let Mode::Enumerate { buffer, count } = mode {
                                        if step_score != -SCORE_MAX
                                            && self.target_from == SQUARE_INVALID
                                            && iter_depth == 3
                                            && replay_move == 0
                                        {
                                            if *count < buffer.len() {
                                                buffer[*count] = Move::new(
                                                    Square(square_from),
                                                    Square(square_to),
                                                );
                                            }
                                            *count += 1;
                                        }
                                    }
                                }

                                if step_score > iter_score {
                                    iter_score = step_score;
                                    iter_from = square_from;
                                    // Fold "no skip square" into the high bit
                                    // so the move can be replayed next pass
                                    iter_to = square_to | (skip_square & SQUARE_INVALID);
                                }

                                if replay_move != 0 {
                                    // The hint has been tried; rerun the ray
                                    // from the top the regular way
                                    replay_move = 0;
                                    continue 'replay;
                                }

                                // A first step by a virgin piece may extend:
                                // pawns push a second square, and a lateral
                                // king step becomes a castle when the corner
                                // rook is virgin with an empty path. Anything
                                // else ends a non-slider's ray here
                                let first_step =
                                    square_from.wrapping_add(step_vector as u8) == square_to;
                                let may_extend = first_step
                                    && scan_piece & PIECE_MOVED == 0
                                    && (scan_type < 3
                                        || (scan_type == 4 && vector_index == 7 && {
                                            rook_square = square_from.wrapping_add(3)
                                                ^ ((step_vector >> 1) & 0b111) as u8;
                                            self.position[rook_square]
                                                == self.position.side + 6
                                                && self.position[rook_square ^ 1] == 0
                                                && self.position[rook_square ^ 2] == 0
                                        }));
                                if may_extend {
                                    skip_square = square_to;
                                } else {
                                    capture_piece =
                                        capture_piece.wrapping_add((scan_type < 5) as u8);
                                }

                                if capture_piece != 0 {
                                    break;
                                }
                            }

                            break 'replay;
                        }
                    }
                }

                // Next square, wrapping over the board
                square_from = square_from.wrapping_add(9) & 0x77;
                if square_from == square_start {
                    break 'scan;
                }
            }

            // No move survived and even passing keeps the king: stalemate
            // scores level. A lost king has already pushed the score to the
            // maximum instead
            if iter_score == -SCORE_MAX && null_move_score != SCORE_MAX {
                iter_score = 0;
            }
        }

        // Delayed-loss bonus, mirroring the window shrink at entry
        iter_score + (iter_score < score) as i32
    }

    /// Configures budgets and the target move, then runs the search from its
    /// root window and depth.
    fn start_search(&mut self, target: Move, depth_max: u32, node_max: u32, mode: &mut Mode<'_>) -> i32 {
        self.target_from = target.from.0;
        self.target_to = target.to.0;

        self.node_max = node_max;
        self.nodes = 0;
        self.depth_max = depth_max;

        self.stop.store(false, Ordering::Relaxed);

        let score = self.position.score;
        let en_passant = self.position.en_passant;
        self.search(-SCORE_MAX, SCORE_MAX, score, en_passant, 3, mode)
    }

    /// Enumerates the moves available to the side to move into `buffer`.
    ///
    /// Returns the total number of moves found, which may exceed
    /// `buffer.len()`; compare the two to detect truncation. The engine
    /// state is unchanged on return.
    ///
    /// Moves that lose the king outright (stepping into check, moving a
    /// pinned piece) are already culled by the shallow search backing the
    /// enumeration.
    pub fn valid_moves(&mut self, buffer: &mut [Move]) -> usize {
        let mut mode = Mode::Enumerate { buffer, count: 0 };
        self.start_search(Move::INVALID, 0, 0, &mut mode);

        match mode {
            Mode::Enumerate { count, .. } => count,
            _ => 0,
        }
    }

    /// Searches for the best move under the given budgets.
    ///
    /// The search deepens iteratively until `node_max` nodes have been
    /// visited or the deepening pass exceeds `depth_max`, then reports the
    /// move it settled on. Returns `None` if there is nothing to play (mate
    /// or stalemate) or the search was stopped before settling. The engine
    /// state is unchanged on return; budgets of zero still search two plies.
    pub fn best_move(&mut self, node_max: u32, depth_max: u32) -> Option<Move> {
        let score = self.start_search(
            Move::INVALID,
            depth_max.saturating_add(3),
            node_max,
            &mut Mode::FindBest,
        );

        (score == SCORE_MAX).then(|| Move::new(Square(self.target_from), Square(self.target_to)))
    }

    /// Plays `mv` for the side to move.
    ///
    /// Returns `true` and advances the game state if the search reaches the
    /// move and it does not lose the king outright; otherwise returns
    /// `false` with the engine state unchanged.
    pub fn play(&mut self, mv: Move) -> bool {
        self.start_search(mv, 0, 0, &mut Mode::Play) == SCORE_MAX
    }
}
