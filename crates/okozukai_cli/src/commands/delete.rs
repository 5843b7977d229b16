//! Delete commands
//!
//! Usage: okozukai delete <INDEX> | okozukai delete-id <ID>

use super::{CommandResult, Session};
use crate::view;
use clap::Args;
use okozukai_core::ExpenseId;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Position as printed by `list` (0 = newest)
    pub index: usize,
}

#[derive(Debug, Args)]
pub struct DeleteIdArgs {
    /// Expense id as printed by `add` or `list --json`
    pub id: ExpenseId,
}

pub fn execute(session: &mut Session, args: DeleteArgs) -> CommandResult {
    match session.controller.delete_at(args.index)? {
        Some(id) => println!("deleted {id}"),
        None => println!("nothing at index {}", args.index),
    }
    session.refresh();
    let total = view::render_total(session.controller.ledger(), &session.currency);
    println!("{total}");
    Ok(())
}

pub fn execute_by_id(session: &mut Session, args: DeleteIdArgs) -> CommandResult {
    if session.controller.delete(args.id)? {
        println!("deleted {}", args.id);
    } else {
        println!("no expense with id {}", args.id);
    }
    session.refresh();
    let total = view::render_total(session.controller.ledger(), &session.currency);
    println!("{total}");
    Ok(())
}
