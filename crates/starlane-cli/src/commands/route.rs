//! Route command handler for computing paths between endpoints.

use std::path::Path;

use anyhow::{Context, Result};

use starlane_cli::output::{render_route, OutputFormat};
use starlane_cli::terminal::ColorPalette;
use starlane_lib::{plan_route, CostConfig, Error as RouteError, RouteOptions, RouteRequest, SqliteStore};

use crate::TravelerArgs;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub from: String,
    pub to: String,
    pub traveler: TravelerArgs,
    pub avoid_slow_regions: bool,
    pub avoid_hostile: bool,
}

impl RouteCommandArgs {
    /// Convert CLI args to a library [`RouteRequest`].
    pub fn to_request(&self) -> Result<RouteRequest, RouteError> {
        Ok(
            RouteRequest::parse(&self.from, &self.to, self.traveler.to_traveler())?.with_options(
                RouteOptions {
                    avoid_slow_regions: self.avoid_slow_regions,
                    avoid_hostile: self.avoid_hostile,
                },
            ),
        )
    }
}

/// Handle the route subcommand.
pub fn handle_route_command(db: &Path, format: OutputFormat, args: &RouteCommandArgs) -> Result<()> {
    let request = args.to_request().map_err(|err| handle_route_failure(args, err))?;
    let config = CostConfig::from_env().context("invalid routing configuration")?;

    let reader = SqliteStore::new(db)
        .open()
        .with_context(|| format!("failed to open starmap database {}", db.display()))?;

    let plan = plan_route(&reader, &request, &config).map_err(|err| handle_route_failure(args, err))?;

    print!("{}", render_route(&plan, format, ColorPalette::detect())?);
    Ok(())
}

fn handle_route_failure(args: &RouteCommandArgs, err: RouteError) -> anyhow::Error {
    match err {
        RouteError::SystemNotFound { id } => anyhow::anyhow!(
            "Unknown system {id}. It does not exist or has not been discovered{}.",
            match args.traveler.faction {
                Some(faction) => format!(" by faction {faction}"),
                None => String::new(),
            }
        ),
        RouteError::Validation { field, message } if field == "faction_id" => {
            anyhow::anyhow!("{message}; pass --faction <ID> or --developer")
        }
        other => anyhow::Error::new(other),
    }
}
