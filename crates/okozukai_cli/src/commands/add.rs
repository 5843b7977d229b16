//! Add command
//!
//! Usage: okozukai add <AMOUNT> <MEMO>...

use super::{CommandResult, Session};
use crate::view;
use clap::Args;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Amount, e.g. `500`, `1,200` or `12.50` (with a fractional currency scale)
    #[arg(allow_hyphen_values = true)]
    pub amount: String,

    /// Memo; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub memo: Vec<String>,
}

pub fn execute(session: &mut Session, args: AddArgs) -> CommandResult {
    let memo = args.memo.join(" ");
    let id = session.controller.submit_entry(&args.amount, &memo)?;
    session.refresh();

    println!("added {id}");
    let total = view::render_total(session.controller.ledger(), &session.currency);
    println!("{total}");
    Ok(())
}
