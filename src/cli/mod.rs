//! Interactive shell over a [`Session`]: the presentation layer renders state
//! and invokes operations; all bookkeeping lives in the ledger.

pub mod commands;
pub mod output;

use std::io::{self, BufRead};
use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;

use crate::errors::StoreError;
use crate::session::Session;
use crate::storage::JsonStore;

const SCRIPT_MODE_ENV: &str = "POCKET_BUDGET_CLI_SCRIPT";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub enum LoopControl {
    Continue,
    Exit,
}

pub fn run_cli() -> Result<(), CliError> {
    crate::init();

    let mode = if std::env::var_os(SCRIPT_MODE_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let store = JsonStore::new_default()?;
    let mut session = Session::open(Arc::new(store));

    match mode {
        CliMode::Interactive => run_interactive(&mut session)?,
        CliMode::Script => run_script(&mut session)?,
    }

    // Drain outstanding writes before the process exits.
    session.flush();
    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<(), CliError> {
    let mut editor = DefaultEditor::new()?;
    output::info("Pocket Budget — type `help` for commands.");

    loop {
        match editor.readline("pocket> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                match commands::handle_line(session, trimmed, CliMode::Interactive) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => output::error(err),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                output::info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(session: &mut Session) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match commands::handle_line(session, trimmed, CliMode::Script) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => output::error(err),
        }
    }
    Ok(())
}
