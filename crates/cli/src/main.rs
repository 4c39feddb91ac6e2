//! Barcode catalog CLI - database migrations and lookup diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Apply catalog database migrations
//! catalog-cli migrate
//!
//! # Query the barcode lookup API without touching the database
//! catalog-cli lookup 012345678905
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Barcode catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run catalog database migrations
    Migrate,
    /// Look up a barcode and print the normalized product
    Lookup {
        /// Barcode to query
        barcode: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Lookup { barcode } => commands::lookup::run(&barcode).await?,
    }
    Ok(())
}
