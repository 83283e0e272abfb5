//! Application main loop
//!
//! stdin is read on a helper thread and forwarded line by line; the loop
//! waits for input no longer than the auto-advance timer allows and turns a
//! timeout into a tick.

use crate::input::{self, Input, InputError};
use crate::render::Renderer;
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::BufRead;
use std::time::Instant;
use tagger_core::{Command, Session};

fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::unbounded();

    std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
            tracing::debug!("stdin closed");
        })
        .context("Failed to start input thread")?;

    Ok(rx)
}

/// Run the session until `q` or end of input, then flush every index file
pub fn run(session: Session, renderer: Renderer) -> Result<()> {
    let lines = spawn_stdin_reader()?;
    run_with(session, renderer, lines)
}

/// The loop proper, fed from any line source
///
/// A fatal error still flushes the index files before it is returned.
fn run_with(mut session: Session, mut renderer: Renderer, lines: Receiver<String>) -> Result<()> {
    if let Err(e) = event_loop(&mut session, &mut renderer, &lines) {
        if let Err(close_err) = session.close() {
            tracing::error!("Flush after failure also failed: {}", close_err);
        }
        return Err(e);
    }

    session.close()?;
    Ok(())
}

fn event_loop(session: &mut Session, renderer: &mut Renderer, lines: &Receiver<String>) -> Result<()> {
    let view = session.view();
    renderer.response(&tagger_core::Response {
        status: vec!["Type ? for help".to_string()],
        view,
        quit: false,
    })?;

    loop {
        let received = match session.next_deadline(Instant::now()) {
            Some(wait) => lines.recv_timeout(wait),
            None => lines.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let command = match received {
            Ok(line) => match input::parse_line(&line, session.registry()) {
                Ok(Input::Command(command)) => command,
                Ok(Input::Help) => {
                    renderer.message(input::HELP)?;
                    continue;
                }
                Ok(Input::Empty) => continue,
                Err(InputError(message)) => {
                    renderer.message(&[message.as_str()])?;
                    continue;
                }
            },
            Err(RecvTimeoutError::Timeout) => Command::Tick,
            Err(RecvTimeoutError::Disconnected) => {
                tracing::info!("End of input");
                return Ok(());
            }
        };

        let response = session.dispatch(command)?;
        renderer.response(&response)?;
        if response.quit {
            return Ok(());
        }
    }
}
