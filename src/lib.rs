/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation: squares, pieces, static tables, and the position.
mod board;

/// Commands understood by the engine's console, and how to parse them.
mod cli;

/// The engine's console: input handling and command dispatch.
mod engine;

/// The engine state and its public operations.
mod game;

/// Main engine logic; all search related code.
mod search;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use game::Game;
pub use search::{DEPTH_MAX, SCORE_MAX};
