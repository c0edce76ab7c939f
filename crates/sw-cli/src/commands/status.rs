//! Status command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::Project;

/// Execute the status command
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let source = project.load_source()?;
    let mut conn = project.open_db()?;
    let mut migrator = project.migrator(&mut conn, &source);

    let current = migrator
        .current_version()
        .context("Failed to read current version")?;
    let latest = source.latest_version();

    if args.json {
        let status = serde_json::json!({
            "current": current,
            "latest": latest,
            "pending": latest.saturating_sub(current),
            "table": migrator.table().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Current version: {current}");
    println!("Latest version:  {latest}");
    if current > latest {
        println!(
            "Database is ahead of {} ({} migration file(s) missing)",
            project.migrations_dir().display(),
            current - latest
        );
    } else if current < latest {
        println!("{} pending migration(s)", latest - current);
    } else {
        println!("Up to date");
    }
    Ok(())
}
