//! Bien Miches CLI - session store migrations and credential checks.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! bm-cli migrate
//!
//! # Check the Shopify Storefront API credentials
//! bm-cli verify
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bm-cli")]
#[command(author, version, about = "Bien Miches CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the session store table
    Migrate,
    /// Check the Shopify Storefront API credentials
    Verify,
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
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Verify => commands::verify::shopify().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_subcommands() {
        assert!(matches!(
            Cli::try_parse_from(["bm-cli", "migrate"]).map(|cli| cli.command),
            Ok(Commands::Migrate)
        ));
        assert!(matches!(
            Cli::try_parse_from(["bm-cli", "verify"]).map(|cli| cli.command),
            Ok(Commands::Verify)
        ));
        assert!(Cli::try_parse_from(["bm-cli", "seed"]).is_err());
    }
}
