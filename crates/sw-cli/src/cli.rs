//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Stairwell - versioned, reversible schema migrations for DuckDB
#[derive(Parser, Debug)]
#[command(name = "sw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (`:memory:` for an in-memory database)
    #[arg(short, long, global = true, env = "STAIRWELL_DATABASE")]
    pub database: Option<String>,

    /// Override migrations directory
    #[arg(short, long, global = true)]
    pub migrations_dir: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the current and latest available version
    Status(StatusArgs),

    /// Migrate to the latest available version
    Up,

    /// Migrate up or down to an explicit version
    To(TargetArgs),

    /// Revert the most recent migrations
    Down(DownArgs),

    /// Show the steps a migration to VERSION would take, without running them
    Plan(TargetArgs),

    /// List applied migrations
    History(HistoryArgs),

    /// Create the next pair of migration files
    New(NewArgs),
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for commands taking a target version
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Target version (0 reverts everything)
    pub version: u32,
}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Number of versions to revert
    #[arg(short, long, default_value_t = 1)]
    pub steps: u32,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Migration name (letters, digits and underscores)
    pub name: String,

    /// Only create the up script, making the migration irreversible
    #[arg(long)]
    pub no_down: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
