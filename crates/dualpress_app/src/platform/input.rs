use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use dualpress_core::Msg;
use dualpress_logging::dp_debug;

pub const HELP: &str = "Commands: stop, clear";

/// Maps a line typed on stdin to a controller message.
pub fn parse_command(line: &str) -> Option<Msg> {
    match line.trim().to_ascii_lowercase().as_str() {
        "stop" | "s" | "q" => Some(Msg::StopClicked),
        "clear" | "c" => Some(Msg::ClearLogClicked),
        _ => None,
    }
}

/// Reads commands from stdin until it closes or the inbox goes away.
pub fn spawn_command_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(msg) => {
                    if msg_tx.send(msg).is_err() {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => println!("{HELP}"),
            }
        }
        dp_debug!("Command reader finished");
    });
}
