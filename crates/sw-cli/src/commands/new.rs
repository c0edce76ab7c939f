//! New command implementation

use anyhow::{bail, Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use sw_migrate::sql_dir::migration_file_names;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::Project;

/// Execute the new command
pub fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    validate_name(&args.name)?;

    let project = Project::load(global)?;
    let dir = project.migrations_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let version = project.load_source()?.latest_version() + 1;
    let (up_name, down_name) = migration_file_names(version, &args.name);

    let up_path = dir.join(&up_name);
    create_script(&up_path, &format!("-- {} (upgrade)\n", args.name))?;
    println!("Created {}", up_path.display());

    if !args.no_down {
        let down_path = dir.join(&down_name);
        create_script(&down_path, &format!("-- {} (downgrade)\n", args.name))?;
        println!("Created {}", down_path.display());
    }
    Ok(())
}

/// Migration names become part of file names and must parse back cleanly.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Migration name must not be empty");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("Migration name '{name}' may only contain letters, digits and underscores");
    }
    Ok(())
}

fn create_script(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
