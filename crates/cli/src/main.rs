//! Cartkeeper CLI - Database migrations and cart maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ck-cli migrate
//!
//! # Rewrite every legacy cart in canonical form
//! ck-cli heal-carts
//!
//! # Report how many carts need healing without writing
//! ck-cli heal-carts --dry-run
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ck-cli")]
#[command(author, version, about = "Cartkeeper CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Normalize every stored cart, writing back the ones in a legacy shape
    HealCarts {
        /// Only report what would change
        #[arg(long)]
        dry_run: bool,

        /// Users loaded per batch
        #[arg(long, default_value_t = 500)]
        batch_size: i64,
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
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::HealCarts {
            dry_run,
            batch_size,
        } => {
            let report = commands::heal::heal_carts(dry_run, batch_size).await?;
            tracing::info!(
                scanned = report.scanned,
                healed = report.healed,
                skipped = report.skipped,
                dry_run,
                "Cart healing complete"
            );
        }
    }
    Ok(())
}
