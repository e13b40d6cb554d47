/// Console panel
///
/// Reads stdin on its own thread and forwards each line as a raw event.
/// `press <button>` acts as a virtual controller.
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use super::{ControllerButton, RawEvent};
use crate::error::CommandError;
use crate::messaging::commands::USAGE;

/// Parse one console line. Blank lines yield nothing.
pub fn parse_console_line(line: &str) -> Result<Option<RawEvent>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(rest) = line.strip_prefix("press") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            let name = rest.trim();
            if name.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "press",
                    argument: "button",
                });
            }
            let button: ControllerButton = name.parse()?;
            return Ok(Some(RawEvent::ControllerButtonUp(button)));
        }
    }

    Ok(Some(RawEvent::Console(line.parse()?)))
}

/// Spawn the stdin reader. End of input is reported as `Quit`.
pub fn spawn_console_reader(sender: Sender<RawEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            println!("{}", USAGE);
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Console read failed: {}", e);
                        break;
                    }
                };

                if line.trim() == "help" {
                    println!("{}", USAGE);
                    continue;
                }

                match parse_console_line(&line) {
                    Ok(Some(event)) => {
                        if sender.send(event).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!("{}", e);
                        println!("{}", e);
                    }
                }
            }

            tracing::debug!("Console input closed");
            let _ = sender.send(RawEvent::Quit);
        })
}
