/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use minnow::{Game, Move, MAX_MOVES};

#[derive(Clone, Copy)]
struct BenchCase {
    name: &'static str,
    fen: &'static str,
}

const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const CASES: &[BenchCase] = &[
    BenchCase {
        name: "startpos",
        fen: STARTPOS_FEN,
    },
    BenchCase {
        name: "open_middlegame",
        fen: "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1",
    },
    BenchCase {
        name: "rook_endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    },
];

fn bench_move_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate");

    for case in CASES {
        let mut game = Game::new();
        game.set_position(case.fen);

        group.bench_function(case.name, |b| {
            let mut buffer = [Move::INVALID; MAX_MOVES];
            b.iter(|| black_box(game.valid_moves(&mut buffer)));
        });
    }

    group.finish();
}

fn bench_fixed_budget_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_move");
    group.sample_size(20);

    for case in CASES {
        let mut game = Game::new();
        game.set_position(case.fen);

        group.bench_function(case.name, |b| {
            b.iter(|| black_box(game.best_move(black_box(20_000), 8)));
        });
    }

    group.finish();
}

criterion_group!(search_benches, bench_move_enumeration, bench_fixed_budget_search);
criterion_main!(search_benches);
