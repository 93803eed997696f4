/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, Subcommand};

/// Parser for commands typed at the engine's console.
#[derive(Debug, Parser)]
#[command(multicall = true, rename_all = "lower", about = "Send a command to the engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: EngineCommand,
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Subcommand)]
pub enum EngineCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Set the current position. Accepts a FEN string or `startpos`.
    Position {
        #[arg(trailing_var_arg = true, num_args = 1.., required = true)]
        fen: Vec<String>,
    },

    /// Show the moves available in the current position.
    Moves,

    /// Search for the best move under the given budgets.
    Go {
        /// Node allowance for the search.
        #[arg(short, long, default_value_t = 1_000_000)]
        nodes: u32,

        /// Depth budget for iterative deepening.
        #[arg(short, long, default_value_t = 24)]
        depth: u32,
    },

    /// Apply a move, given in coordinate notation (e.g. `play e2e4`).
    Play { mv: String },

    /// Report whether the side to move is in check, mated, or stalemated.
    Status,

    /// Interrupt the current search.
    Stop,

    /// Quit the program.
    #[command(alias = "exit")]
    Quit,
}
