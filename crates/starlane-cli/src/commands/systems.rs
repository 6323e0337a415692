use std::path::Path;

use anyhow::{Context, Result};

use starlane_cli::output::{render_systems, OutputFormat};
use starlane_lib::{SqliteStore, SystemListing};

use crate::TravelerArgs;

/// List the visible starmap for a traveler.
pub fn handle_systems_command(db: &Path, format: OutputFormat, traveler: TravelerArgs) -> Result<()> {
    let reader = SqliteStore::new(db)
        .open()
        .with_context(|| format!("failed to open starmap database {}", db.display()))?;

    let listing = SystemListing::load(&reader, &traveler.to_traveler())
        .context("failed to load visible systems")?;

    print!("{}", render_systems(&listing, format)?);
    Ok(())
}
