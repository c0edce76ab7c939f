//! History command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::Project;

/// Execute the history command
pub fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let source = project.load_source()?;
    let mut conn = project.open_db()?;
    let mut migrator = project.migrator(&mut conn, &source);

    let records = migrator
        .applied()
        .context("Failed to read applied migrations")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No migrations applied");
        return Ok(());
    }

    let name_width = records
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());
    println!("{:<7}  {:<name_width$}  APPLIED AT", "VERSION", "NAME");
    for record in &records {
        println!(
            "{:<7}  {:<name_width$}  {}",
            record.version, record.name, record.date_ran
        );
    }
    Ok(())
}
