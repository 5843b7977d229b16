//! List and total commands
//!
//! Usage: okozukai list [--json] | okozukai total

use super::{CommandResult, Session};
use crate::view;
use clap::Args;
use serde_json::json;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Print the ledger as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute(session: &mut Session, args: ListArgs) -> CommandResult {
    session.refresh();
    let ledger = session.controller.ledger();

    if args.json {
        let document = json!({
            "total": ledger.total(),
            "scale": session.currency.scale,
            "expenses": ledger.list(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", view::render_ledger(ledger, &session.currency));
    }
    Ok(())
}

pub fn execute_total(session: &mut Session) -> CommandResult {
    session.refresh();
    let total = view::render_total(session.controller.ledger(), &session.currency);
    println!("{total}");
    Ok(())
}
