use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use starlane_cli::output::OutputFormat;
use starlane_lib::Traveler;

mod commands;

#[derive(Parser, Debug)]
#[command(author, version, about = "Starlane star-map routing utilities")]
struct Cli {
    /// Path to the starmap SQLite database.
    #[arg(long, global = true, env = "STARLANE_DB", default_value = "starlane.db")]
    db: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

/// Whose view of the starmap to use.
#[derive(Args, Debug, Clone, Copy)]
pub struct TravelerArgs {
    /// Faction the traveler belongs to; limits visibility to its discoveries.
    #[arg(long = "faction", conflicts_with = "developer")]
    pub faction: Option<i64>,

    /// See every system regardless of discovery.
    #[arg(long)]
    pub developer: bool,
}

impl TravelerArgs {
    pub fn to_traveler(self) -> Traveler {
        Traveler {
            faction: self.faction,
            unrestricted: self.developer,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the cheapest route between two endpoints.
    Route {
        /// Start endpoint: `sys:<id>`, `pos:<decimal>`, or a bare system id.
        #[arg(long = "from", allow_hyphen_values = true)]
        from: String,
        /// Destination endpoint, same syntax as `--from`.
        #[arg(long = "to", allow_hyphen_values = true)]
        to: String,
        #[command(flatten)]
        traveler: TravelerArgs,
        /// Penalise hops touching regions with the slow effect.
        #[arg(long)]
        avoid_slow_regions: bool,
        /// Penalise hops touching systems owned by factions at war with the traveler.
        #[arg(long)]
        avoid_hostile: bool,
    },
    /// List the systems and wormholes visible to a traveler.
    Systems {
        #[command(flatten)]
        traveler: TravelerArgs,
    },
    /// Create an empty starmap database with the expected schema.
    InitDb,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            from,
            to,
            traveler,
            avoid_slow_regions,
            avoid_hostile,
        } => commands::route::handle_route_command(
            &cli.db,
            cli.format,
            &commands::route::RouteCommandArgs {
                from,
                to,
                traveler,
                avoid_slow_regions,
                avoid_hostile,
            },
        ),
        Command::Systems { traveler } => {
            commands::systems::handle_systems_command(&cli.db, cli.format, traveler)
        }
        Command::InitDb => commands::init::handle_init_command(&cli.db),
    }
}

/// Logs go to stderr so stdout stays parseable; `RUST_LOG` overrides the `warn` default.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
