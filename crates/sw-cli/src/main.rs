//! Stairwell CLI - apply and revert versioned DuckDB schema migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{history, migrate, new, plan, status};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Status(args) => status::execute(args, &cli.global),
        cli::Commands::Up => migrate::execute_up(&cli.global),
        cli::Commands::To(args) => migrate::execute_to(args, &cli.global),
        cli::Commands::Down(args) => migrate::execute_down(args, &cli.global),
        cli::Commands::Plan(args) => plan::execute(args, &cli.global),
        cli::Commands::History(args) => history::execute(args, &cli.global),
        cli::Commands::New(args) => new::execute(args, &cli.global),
    }
}

/// `RUST_LOG` wins over the `--verbose` default.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
