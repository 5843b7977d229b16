//! okozukai CLI
//!
//! Command-line front end for the pocket-money expense book.

use clap::{Parser, Subcommand};

mod commands;
mod view;

#[derive(Debug, Parser)]
#[command(name = "okozukai", version)]
#[command(about = "okozukai - pocket-money expense book", long_about = None)]
struct Cli {
    #[command(flatten)]
    session: commands::SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record one expense
    Add(commands::add::AddArgs),
    /// Show all expenses, newest first, with the running total
    List(commands::list::ListArgs),
    /// Show the running total only
    Total,
    /// Delete the expense shown at a list position
    Delete(commands::delete::DeleteArgs),
    /// Delete an expense by its id
    DeleteId(commands::delete::DeleteIdArgs),
    /// Interactive entry form on stdin
    Shell,
}

fn main() {
    let cli = Cli::parse();

    let result = commands::open_session(&cli.session).and_then(|mut session| match cli.command {
        Commands::Add(args) => commands::add::execute(&mut session, args),
        Commands::List(args) => commands::list::execute(&mut session, args),
        Commands::Total => commands::list::execute_total(&mut session),
        Commands::Delete(args) => commands::delete::execute(&mut session, args),
        Commands::DeleteId(args) => commands::delete::execute_by_id(&mut session, args),
        Commands::Shell => commands::shell::execute(&mut session),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
