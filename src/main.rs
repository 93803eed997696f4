/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::Parser;
use minnow::{Cli, Engine, EngineCommand};

fn main() {
    let engine = Engine::new();

    // If a command was provided, send it and then exit
    if let Ok(cli) = Cli::try_parse_from(std::env::args_os().skip(1)) {
        let _ = engine.send_command(cli.command);
        let _ = engine.send_command(EngineCommand::Quit);
    }

    // Run the engine's main event loop
    if let Err(e) = engine.run() {
        eprintln!("{} encountered a fatal error: {e}", env!("CARGO_PKG_NAME"));
    }
}
