/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
        Arc,
    },
};

use anyhow::{Context, Result};
use clap::Parser;
use threadpool::ThreadPool;

use crate::{Cli, EngineCommand, Game, Move};

/// The engine's console: reads commands, executes them against one [`Game`].
pub struct Engine {
    /// The engine state commands operate on.
    game: Game,

    /// Holds the thread that reads command-line input.
    pool: ThreadPool,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        let pool = ThreadPool::with_name(format!("{} input thread", env!("CARGO_PKG_NAME")), 1);

        Self {
            game: Game::new(),
            pool,
            sender,
            receiver,
        }
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender.send(command)?;
        Ok(())
    }

    /// Entrypoint of the engine.
    ///
    /// Spawns a thread that parses user input from `stdin`, then loops on
    /// the commands received, executing them in order. Searches run on this
    /// loop; the input thread flips the shared stop flag when asked to.
    pub fn run(mut self) -> Result<()> {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        let stop = self.game.stop_signal();
        self.pool.execute(move || {
            if let Err(err) = input_handler(sender, stop) {
                eprintln!("Input thread stopping after fatal error: {err:#}");
            }
        });

        while let Ok(cmd) = self.receiver.recv() {
            match cmd {
                EngineCommand::Display => println!("{}", self.game.position()),

                EngineCommand::Fen => println!("{}", self.game.to_fen()),

                EngineCommand::Position { fen } => {
                    let fen = fen.join(" ");
                    if fen.eq_ignore_ascii_case("startpos") {
                        self.game.reset();
                    } else {
                        self.game.set_position(&fen);
                    }
                }

                EngineCommand::Moves => {
                    let moves = self.game.moves();
                    println!(
                        "{}",
                        moves
                            .iter()
                            .map(|mv| mv.to_string())
                            .collect::<Vec<_>>()
                            .join(" ")
                    );
                    println!("{} moves", moves.len());
                }

                EngineCommand::Go { nodes, depth } => self.go(nodes, depth),

                EngineCommand::Play { mv } => match Move::from_uci(&mv) {
                    Ok(mv) => {
                        if self.game.play(mv) {
                            println!("{}", self.game.to_fen());
                        } else {
                            eprintln!("Illegal move: {mv}");
                        }
                    }
                    Err(err) => eprintln!("{err:#}"),
                },

                EngineCommand::Status => {
                    let side = self.game.side_to_move();
                    if self.game.is_checkmate(side) {
                        println!("{side} is checkmated");
                    } else if self.game.is_stalemate(side) {
                        println!("{side} is stalemated");
                    } else if self.game.in_check(side) {
                        println!("{side} is in check, {side} to move");
                    } else {
                        println!("{side} to move");
                    }
                }

                // The input thread handles `stop` itself; one arriving here
                // means no search was running
                EngineCommand::Stop => {}

                // Exit the loop so the engine can quit
                EngineCommand::Quit => break,
            }
        }

        Ok(())
    }

    /// Runs a best-move search, reporting progress and the final result.
    fn go(&mut self, nodes: u32, depth: u32) {
        let mut next_report = 500_000;
        self.game.set_callback(move |searched| {
            if searched >= next_report {
                println!("info nodes {searched}");
                next_report += 500_000;
            }
        });

        let best = self.game.best_move(nodes, depth);

        self.game.clear_callback();

        println!("info nodes {} total", self.game.nodes());
        match best {
            Some(mv) => println!("bestmove {mv}"),
            None => println!("bestmove 0000"),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn input_handler(sender: Sender<EngineCommand>, stop: Arc<AtomicBool>) -> Result<()> {
    let mut buffer = String::with_capacity(2048);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line of user input")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Quit)
                .context("Failed to send 'quit' command after receiving empty input")?;
            return Ok(());
        }

        // Trim whitespace and split args appropriately
        let args = shlex::split(&buffer).context("Invalid quoting")?;

        // Ignore empty lines
        if args.is_empty() {
            continue;
        }

        // Attempt to parse the user input
        let cmd = match Cli::try_parse_from(args) {
            Ok(cli) => cli.command,

            // If an invalid command was received, we want to continue running
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        // A search runs on the event loop, so a stop request cannot travel
        // through the channel; flip the shared flag directly
        if matches!(cmd, EngineCommand::Stop) {
            stop.store(true, Ordering::Relaxed);
            continue;
        }

        sender
            .send(cmd)
            .context("Failed to send command to the engine")?;
    }
}
