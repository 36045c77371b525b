//! `PromptForge` CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run site database migrations
//! pf-cli migrate site
//!
//! # Grant pro access without a payment
//! pf-cli account grant-pro -e user@example.com
//!
//! # Set the remaining trial credits
//! pf-cli account credits -e user@example.com -n 10
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(author, version, about = "PromptForge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run site database migrations
    Site,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Flip an account to pro without a payment (development only)
    GrantPro {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Set the remaining trial credits directly
    Credits {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// New credit count
        #[arg(short = 'n', long)]
        count: i32,
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
        Commands::Migrate { target } => match target {
            MigrateTarget::Site => commands::migrate::site().await?,
        },
        Commands::Account { action } => match action {
            AccountAction::GrantPro { email } => {
                commands::accounts::grant_pro(&email).await?;
            }
            AccountAction::Credits { email, count } => {
                commands::accounts::set_credits(&email, count).await?;
            }
        },
    }
    Ok(())
}
