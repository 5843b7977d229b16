//! Interactive entry form
//!
//! Reads one command per line from stdin. Failed submits and deletes are
//! reported and the loop keeps going; the ledger only changes when a
//! snapshot arrives.

use super::{CommandResult, Session};
use crate::view;
use std::io::{BufRead, Write};

const HELP: &str = "\
commands:
  add <amount> <memo...>   submit one entry
  amount <text>            set the amount field
  memo <text>              set the memo field
  submit                   submit the amount/memo fields
  del <index>              delete the entry shown at index
  list                     show all entries and the total
  total                    show the total
  help                     show this help
  quit                     leave the shell";

pub fn execute(session: &mut Session) -> CommandResult {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run(session, stdin.lock(), stdout.lock())
}

/// Drives the form loop until `quit` or end of input.
pub fn run(
    session: &mut Session,
    input: impl BufRead,
    mut output: impl Write,
) -> CommandResult {
    session.refresh();
    let rendered = view::render_ledger(session.controller.ledger(), &session.currency);
    write!(output, "{rendered}> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let (command, rest) = split_command(&line);
        let outcome = match command {
            "" => Ok(false),
            "quit" | "exit" => break,
            "help" => {
                writeln!(output, "{HELP}")?;
                Ok(false)
            }
            "list" => Ok(true),
            "total" => {
                session.refresh();
                let total = view::render_total(session.controller.ledger(), &session.currency);
                writeln!(output, "{total}")?;
                Ok(false)
            }
            "amount" => {
                session.controller.draft_mut().amount = rest.to_string();
                Ok(false)
            }
            "memo" => {
                session.controller.draft_mut().memo = rest.to_string();
                Ok(false)
            }
            "submit" => session.controller.submit().map(|_| true),
            "add" => {
                let (amount, memo) = split_command(rest);
                session.controller.submit_entry(amount, memo).map(|_| true)
            }
            "del" | "delete" => match rest.parse::<usize>() {
                Ok(index) => match session.controller.delete_at(index) {
                    Ok(Some(_)) => Ok(true),
                    Ok(None) => {
                        writeln!(output, "nothing at index {index}")?;
                        Ok(false)
                    }
                    Err(err) => Err(err),
                },
                Err(_) => {
                    writeln!(output, "error: `{rest}` is not a list index")?;
                    Ok(false)
                }
            },
            other => {
                writeln!(output, "unknown command `{other}`; type `help`")?;
                Ok(false)
            }
        };

        match outcome {
            Ok(true) => {
                session.refresh();
                let rendered = view::render_ledger(session.controller.ledger(), &session.currency);
                write!(output, "{rendered}")?;
            }
            Ok(false) => {}
            Err(err) => writeln!(output, "error: {err}")?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }

    writeln!(output)?;
    Ok(())
}

fn split_command(line: &str) -> (&str, &str) {
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (trimmed, ""),
    }
}
