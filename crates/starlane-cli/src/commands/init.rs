use std::path::Path;

use anyhow::{Context, Result};

use starlane_lib::SqliteStore;

/// Create the database file and schema. Existing rows are kept.
pub fn handle_init_command(db: &Path) -> Result<()> {
    let store = SqliteStore::initialize(db)
        .with_context(|| format!("failed to initialise {}", db.display()))?;
    println!("Starmap schema ready at {}", store.path().display());
    Ok(())
}
