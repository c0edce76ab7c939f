//! Plan command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, TargetArgs};
use crate::commands::common::Project;

/// Execute the plan command
pub fn execute(args: &TargetArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let source = project.load_source()?;
    let mut conn = project.open_db()?;
    let mut migrator = project.migrator(&mut conn, &source);

    let plan = migrator
        .plan(args.version)
        .with_context(|| format!("Failed to plan migration to version {}", args.version))?;

    if plan.steps.is_empty() {
        println!("Already at version {}", plan.to);
        return Ok(());
    }

    println!(
        "Plan: {} from version {} to {}",
        plan.direction, plan.from, plan.to
    );
    for step in &plan.steps {
        println!(
            "  {:>4}  v{:03}  {}",
            step.direction.to_string(),
            step.version,
            step.name
        );
    }
    Ok(())
}
