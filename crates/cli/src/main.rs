//! Forno CLI - Database migrations and delivery tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! forno-cli migrate
//!
//! # Price a delivery without touching the database
//! forno-cli quote --from -23.5505,-46.6333 --to -23.5614,-46.6559 \
//!     --zones '[{"max_distance_km": 3, "fee": 5}, {"max_distance_km": 6, "fee": 8}]'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `quote` - Distance, fee and range verdict for one destination

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use forno_core::Coordinates;

use crate::commands::quote::ZoneTable;

mod commands;

#[derive(Parser)]
#[command(name = "forno-cli")]
#[command(author, version, about = "Forno CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Quote a delivery fee between two points
    Quote {
        /// Restaurant location as `LAT,LNG`
        #[arg(long, value_parser = commands::quote::parse_coordinates, allow_hyphen_values = true)]
        from: Coordinates,

        /// Destination as `LAT,LNG`
        #[arg(long, value_parser = commands::quote::parse_coordinates, allow_hyphen_values = true)]
        to: Coordinates,

        /// Delivery zones as a JSON array; omit for free delivery everywhere
        #[arg(long, value_parser = commands::quote::parse_zones, default_value = "[]")]
        zones: ZoneTable,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Quote { from, to, zones } => {
            let quote = commands::quote::quote(from, to, &zones.0);

            #[allow(clippy::print_stdout)]
            {
                println!("{quote}");
            }

            if !quote.in_range() {
                return Err("destination is outside every delivery zone".into());
            }
        }
    }
    Ok(())
}
