mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod input;
mod intent;
mod services;
mod workflow;

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::tickets::{self, TicketArgs};
use crate::error::AppResult;

const AFTER_HELP: &str = "Ticket IDs can be passed on the command line or on stdin. \
The modification options require a list of tickets. The list options operate on the \
given tickets, or when none are given, search the server for open tickets assigned to \
you (--list) or in the project (--all). Listing your tickets is the default action.";

#[derive(Parser)]
#[command(
    name = "jiracmd",
    author,
    version,
    about = "List or modify Jira tickets.",
    after_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    args: TicketArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.args.invocation_flags().debug);

    if let Err(error) = run(cli).await {
        eprintln!("Error: {error}");
        std::process::exit(error.exit_code());
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    tickets::run(cli.args).await
}

fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={level}", env!("CARGO_CRATE_NAME"))));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
