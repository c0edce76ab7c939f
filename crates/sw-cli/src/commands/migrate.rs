//! Up, to, and down commands.

use anyhow::{Context, Result};
use sw_migrate::Version;

use crate::cli::{DownArgs, GlobalArgs, TargetArgs};
use crate::commands::common::{print_transition, Project};

/// Where a migrate command is heading.
enum Target {
    Latest,
    Exact(Version),
    StepsDown(u32),
}

/// Execute the up command.
pub fn execute_up(global: &GlobalArgs) -> Result<()> {
    run(global, Target::Latest)
}

/// Execute the to command.
pub fn execute_to(args: &TargetArgs, global: &GlobalArgs) -> Result<()> {
    run(global, Target::Exact(args.version))
}

/// Execute the down command.
pub fn execute_down(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    run(global, Target::StepsDown(args.steps))
}

fn run(global: &GlobalArgs, target: Target) -> Result<()> {
    let project = Project::load(global)?;
    let source = project.load_source()?;
    let mut conn = project.open_db()?;
    let mut migrator = project.migrator(&mut conn, &source);

    let version = match target {
        Target::Latest => source.latest_version(),
        Target::Exact(version) => version,
        Target::StepsDown(steps) => migrator
            .current_version()
            .context("Failed to read current version")?
            .saturating_sub(steps),
    };

    let transition = migrator
        .migrate_to_version(version)
        .with_context(|| format!("Failed to migrate to version {version}"))?;
    print_transition(&transition);
    Ok(())
}
